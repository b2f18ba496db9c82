use crate::pipeline::extraction::types::{ClaimRecord, ClinicalRecord, ExamFinding, FieldMap};

/// Marker heading each block of corrective notes appended to the prompt.
pub const IMPROVEMENT_NOTES_MARKER: &str = "Improvement Notes";

/// System prompt for letter-drafting calls.
pub const APPEAL_SYSTEM_PROMPT: &str = "You are a medical billing specialist who writes \
insurance claim appeal letters on behalf of healthcare providers. Write in plain text, \
addressed to the payer's appeals department, signed by the treating provider.";

const APPEAL_GUIDELINES: &str = r#"
Write a formal insurance appeal letter for the denied claim above.

GUIDELINES:
1. Keep a professional, respectful and persuasive tone throughout.
2. Mention the patient's full name and the claim number explicitly.
3. Use precise, technical medical language appropriate for a clinical reviewer.
4. Argue the medical necessity of the procedure, citing the documented history,
   examination findings, prior results and the treatment plan as evidence.
5. Address the stated denial reason directly and request reconsideration.
6. Output only the letter text, with no commentary before or after it.
"#;

/// Build the base appeal prompt from every clinical and claim field.
pub fn build_appeal_prompt(claim: &ClaimRecord, clinical: &ClinicalRecord) -> String {
    let mut prompt = String::new();

    prompt.push_str("PATIENT\n");
    prompt.push_str(&format!("Patient: {}\n", clinical.patient_name));
    prompt.push_str(&format!("DOB: {}\n", clinical.date_of_birth));
    prompt.push_str(&format!("Date of Service: {}\n", clinical.date_of_service));
    prompt.push_str(&format!("Provider: {}\n", clinical.provider));

    prompt.push_str("\nCLAIM\n");
    prompt.push_str(&format!("Claim Number: {}\n", claim.claim_number));
    prompt.push_str(&format!("Claim Date of Service: {}\n", claim.date_of_service));
    prompt.push_str(&format!("Procedure Code: {}\n", claim.procedure_code));
    prompt.push_str(&format!("Billed Amount: ${}\n", claim.billed_amount));
    prompt.push_str(&format!("Allowed Amount: ${}\n", claim.allowed_amount));
    prompt.push_str(&format!(
        "Patient Responsibility: ${}\n",
        claim.patient_responsibility
    ));
    prompt.push_str(&format!("Paid Amount: ${}\n", claim.paid_amount));
    prompt.push_str(&format!(
        "Claim Denial Reason: {} ({})\n",
        claim.denial_description, claim.denial_code
    ));

    prompt.push_str("\nCLINICAL SUMMARY\n");
    prompt.push_str(&format!("Chief Complaint: {}\n", clinical.chief_complaint));
    prompt.push_str(&format!(
        "History of Present Illness: {}\n",
        clinical.history_of_present_illness
    ));

    prompt.push_str("\nSUPPORTING EVIDENCE\n");
    write_map(&mut prompt, "Review of Systems", &clinical.review_of_systems);
    write_map(&mut prompt, "Vital Signs", &clinical.vital_signs);
    write_exam(&mut prompt, &clinical.physical_examination);
    prompt.push_str(&format!(
        "Results (Prior to Imaging): {}\n",
        clinical.prior_imaging_results
    ));
    write_list(&mut prompt, "Orders", &clinical.orders);
    prompt.push_str(&format!("Assessment: {}\n", clinical.assessment));
    write_list(&mut prompt, "Plan", &clinical.plan);

    prompt.push_str(APPEAL_GUIDELINES);
    prompt
}

fn write_map(out: &mut String, title: &str, map: &FieldMap<String>) {
    out.push_str(&format!("{title}:\n"));
    for (key, value) in map.iter() {
        out.push_str(&format!("  - {key}: {value}\n"));
    }
}

fn write_exam(out: &mut String, exam: &FieldMap<ExamFinding>) {
    out.push_str("Physical Examination:\n");
    for (section, finding) in exam.iter() {
        match finding {
            ExamFinding::Finding(text) => {
                out.push_str(&format!("  - {section}: {text}\n"));
            }
            ExamFinding::Section(sub) => {
                out.push_str(&format!("  - {section}:\n"));
                for (key, value) in sub.iter() {
                    out.push_str(&format!("    - {key}: {value}\n"));
                }
            }
        }
    }
}

fn write_list(out: &mut String, title: &str, items: &[String]) {
    out.push_str(&format!("{title}:\n"));
    for item in items {
        out.push_str(&format!("  - {item}\n"));
    }
}

/// One block of corrective notes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NoteRound {
    after_attempt: usize,
    notes: Vec<String>,
}

/// Accumulated prompt for the refinement loop.
///
/// Immutable: [`PromptHistory::with_notes`] returns a new history whose
/// rendering extends the current one, so each attempt's prompt is a prefix
/// of every later attempt's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptHistory {
    base: String,
    rounds: Vec<NoteRound>,
}

impl PromptHistory {
    pub fn new(base: String) -> Self {
        Self {
            base,
            rounds: Vec::new(),
        }
    }

    /// History extended by the notes produced after `attempt`. No notes,
    /// no change.
    pub fn with_notes(&self, attempt: usize, notes: &[String]) -> Self {
        let mut next = self.clone();
        if !notes.is_empty() {
            next.rounds.push(NoteRound {
                after_attempt: attempt,
                notes: notes.to_vec(),
            });
        }
        next
    }

    pub fn render(&self) -> String {
        let mut out = self.base.clone();
        for round in &self.rounds {
            out.push_str(&format!(
                "\n\n{IMPROVEMENT_NOTES_MARKER} (after attempt {}):",
                round.after_attempt
            ));
            for note in &round.notes {
                out.push_str(&format!("\n- {note}"));
            }
        }
        out
    }
}
