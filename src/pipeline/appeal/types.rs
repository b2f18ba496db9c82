use chrono::{DateTime, Utc};
use serde::Serialize;

use super::feedback::TONE_THRESHOLD;

/// Checklist outcome for one candidate letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ValidationResult {
    pub contains_patient_name: bool,
    pub contains_claim_number: bool,
    /// -10..=10; 0 when the letter could not be scored.
    pub sentiment_score: i8,
    pub contains_medical_necessity: bool,
}

impl ValidationResult {
    /// True when no corrective instruction would be produced.
    pub fn passes_all(&self) -> bool {
        self.contains_patient_name
            && self.contains_claim_number
            && self.sentiment_score > TONE_THRESHOLD
            && self.contains_medical_necessity
    }
}

/// What happened in one round of the refinement loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    /// 1-based.
    pub attempt: usize,
    pub validation: ValidationResult,
    /// Instructions appended to the prompt after this attempt.
    pub instructions: Vec<String>,
}

/// Final output of the refinement loop for one claim.
///
/// `letter` and `validation` always come from the last attempt, even when
/// an earlier entry in `attempts` scored better.
#[derive(Debug, Clone, Serialize)]
pub struct AppealDraft {
    pub letter: String,
    pub validation: ValidationResult,
    pub attempts: Vec<AttemptRecord>,
    pub generated_at: DateTime<Utc>,
}
