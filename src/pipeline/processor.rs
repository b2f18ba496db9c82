//! Batch processor: one clinical note plus one remittance advice in, one
//! `AppealBatch` out.
//!
//! Drives extract → match → generate. Claims are handled sequentially and a
//! generation failure for one claim is recorded without stopping the rest.

use std::path::{Path, PathBuf};

use serde::Serialize;
use uuid::Uuid;

use crate::config::AppealSettings;
use crate::pipeline::appeal::{
    match_claim_indices, AppealDraft, AppealOrchestrator, NO_MATCHING_CLAIM_MESSAGE,
};
use crate::pipeline::extraction::types::ClaimRecord;
use crate::pipeline::extraction::{extract_claims_with_report, extract_clinical_with_report};
use crate::pipeline::generator::TextGenerator;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised before any document reaches the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Output of one processing request.
#[derive(Debug, Clone, Serialize)]
pub struct AppealBatch {
    pub batch_id: Uuid,
    pub patient_name: String,
    pub extraction: ExtractionSummary,
    pub outcome: BatchOutcome,
}

/// What extraction found before any generation happened.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionSummary {
    /// Clinical labels that fell back to a placeholder.
    pub clinical_defaulted: Vec<&'static str>,
    pub claims_found: usize,
    pub claims_matched: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    NoMatchingClaim { message: String },
    Appeals { appeals: Vec<ClaimAppeal> },
}

/// Result for one matched claim.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimAppeal {
    pub claim: ClaimRecord,
    /// Remittance labels that fell back to a placeholder for this claim.
    pub defaulted: Vec<&'static str>,
    pub result: AppealOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AppealOutcome {
    Generated(AppealDraft),
    Failed { error: String },
}

impl BatchOutcome {
    /// Drafts that were generated, in claim order.
    pub fn drafts(&self) -> Vec<&AppealDraft> {
        match self {
            BatchOutcome::NoMatchingClaim { .. } => Vec::new(),
            BatchOutcome::Appeals { appeals } => appeals
                .iter()
                .filter_map(|a| match &a.result {
                    AppealOutcome::Generated(draft) => Some(draft),
                    AppealOutcome::Failed { .. } => None,
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Processing
// ---------------------------------------------------------------------------

/// Run the whole pipeline over two in-memory documents.
///
/// Never fails: extraction misses become placeholders, no match becomes
/// `NoMatchingClaim`, and a per-claim generation error becomes `Failed`.
pub fn process_documents<G: TextGenerator>(
    clinical_text: &str,
    remittance_text: &str,
    generator: &G,
    settings: &AppealSettings,
) -> AppealBatch {
    let batch_id = Uuid::new_v4();
    let _span = tracing::info_span!("process_documents", %batch_id).entered();

    let (clinical, clinical_report) = extract_clinical_with_report(clinical_text);
    let (claims, claim_reports): (Vec<_>, Vec<_>) =
        extract_claims_with_report(remittance_text).into_iter().unzip();
    let matched = match_claim_indices(&clinical, &claims);

    let extraction = ExtractionSummary {
        clinical_defaulted: clinical_report.defaulted.clone(),
        claims_found: claims.len(),
        claims_matched: matched.len(),
    };

    let outcome = if matched.is_empty() {
        tracing::info!(
            patient = %clinical.patient_name,
            claims = claims.len(),
            "No claim matched the clinical note"
        );
        BatchOutcome::NoMatchingClaim {
            message: NO_MATCHING_CLAIM_MESSAGE.to_string(),
        }
    } else {
        let orchestrator = AppealOrchestrator::from_settings(generator, settings);
        let appeals = matched
            .into_iter()
            .map(|i| {
                let claim = &claims[i];
                let result = match orchestrator.generate(claim, &clinical) {
                    Ok(draft) => AppealOutcome::Generated(draft),
                    Err(e) => {
                        tracing::warn!(
                            claim_number = %claim.claim_number,
                            error = %e,
                            "Appeal generation failed, continuing with next claim"
                        );
                        AppealOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                };
                ClaimAppeal {
                    claim: claim.clone(),
                    defaulted: claim_reports[i].defaulted.clone(),
                    result,
                }
            })
            .collect();
        BatchOutcome::Appeals { appeals }
    };

    AppealBatch {
        batch_id,
        patient_name: clinical.patient_name,
        extraction,
        outcome,
    }
}

/// Read both documents from disk, then [`process_documents`].
pub fn process_files<G: TextGenerator>(
    clinical_path: &Path,
    remittance_path: &Path,
    generator: &G,
    settings: &AppealSettings,
) -> Result<AppealBatch, ProcessingError> {
    let clinical_text = read_document(clinical_path)?;
    let remittance_text = read_document(remittance_path)?;
    Ok(process_documents(
        &clinical_text,
        &remittance_text,
        generator,
        settings,
    ))
}

fn read_document(path: &Path) -> Result<String, ProcessingError> {
    std::fs::read_to_string(path).map_err(|source| ProcessingError::Read {
        path: path.to_path_buf(),
        source,
    })
}
