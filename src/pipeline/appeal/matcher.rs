use crate::pipeline::extraction::types::{ClaimRecord, ClinicalRecord};

/// Shown when no claim in the remittance belongs to the clinical note's patient.
pub const NO_MATCHING_CLAIM_MESSAGE: &str = "No claim found matching the patient name.";

/// Positions of the claims whose patient name equals the clinical record's,
/// byte for byte.
///
/// No case folding or whitespace normalization. An empty result is a normal
/// outcome, not an error.
pub fn match_claim_indices(clinical: &ClinicalRecord, claims: &[ClaimRecord]) -> Vec<usize> {
    let matched: Vec<usize> = claims
        .iter()
        .enumerate()
        .filter(|(_, claim)| claim.patient_name == clinical.patient_name)
        .map(|(i, _)| i)
        .collect();

    tracing::info!(
        total = claims.len(),
        matched = matched.len(),
        "Claims matched to clinical note"
    );
    matched
}

/// Matching claims themselves, in source order.
pub fn match_claims<'c>(
    clinical: &ClinicalRecord,
    claims: &'c [ClaimRecord],
) -> Vec<&'c ClaimRecord> {
    match_claim_indices(clinical, claims)
        .into_iter()
        .map(|i| &claims[i])
        .collect()
}
