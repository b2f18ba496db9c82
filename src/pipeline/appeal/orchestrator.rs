use chrono::Utc;

use super::feedback::synthesize_feedback;
use super::prompt::{build_appeal_prompt, PromptHistory, APPEAL_SYSTEM_PROMPT};
use super::types::{AppealDraft, AttemptRecord, ValidationResult};
use super::validation::LetterValidator;
use super::AppealError;
use crate::config::AppealSettings;
use crate::pipeline::extraction::types::{ClaimRecord, ClinicalRecord};
use crate::pipeline::generator::TextGenerator;

/// Drives the generate → validate → feedback loop for one claim.
///
/// Always runs the full attempt budget and returns the last attempt.
/// A failed scoring call only zeroes the tone score; a failed letter call
/// ends the loop with an error. A budget of 0 makes no generator calls and
/// yields an empty, unvalidated draft.
pub struct AppealOrchestrator<'a, G: TextGenerator> {
    generator: &'a G,
    max_attempts: usize,
}

/// Result of one round, plus the history for the next round.
struct RoundOutcome {
    letter: String,
    record: AttemptRecord,
    next: PromptHistory,
}

impl<'a, G: TextGenerator> AppealOrchestrator<'a, G> {
    pub fn new(generator: &'a G, max_attempts: usize) -> Self {
        if max_attempts == 0 {
            tracing::warn!("Appeal attempt budget is 0, no letter will be generated");
        }
        Self {
            generator,
            max_attempts,
        }
    }

    pub fn from_settings(generator: &'a G, settings: &AppealSettings) -> Self {
        Self::new(generator, settings.max_attempts)
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn generate(
        &self,
        claim: &ClaimRecord,
        clinical: &ClinicalRecord,
    ) -> Result<AppealDraft, AppealError> {
        let _span = tracing::info_span!(
            "generate_appeal",
            claim_number = %claim.claim_number,
            max_attempts = self.max_attempts
        )
        .entered();

        let validator = LetterValidator::new(self.generator);
        let mut history = PromptHistory::new(build_appeal_prompt(claim, clinical));
        let mut attempts = Vec::with_capacity(self.max_attempts);
        let mut letter = String::new();
        let mut validation = ValidationResult::default();

        for attempt in 1..=self.max_attempts {
            let round = self.run_round(&validator, &history, attempt, claim, clinical)?;
            letter = round.letter;
            validation = round.record.validation;
            attempts.push(round.record);
            history = round.next;
        }

        tracing::info!(
            attempts = attempts.len(),
            passed = validation.passes_all(),
            score = validation.sentiment_score,
            "Appeal letter generated"
        );

        Ok(AppealDraft {
            letter,
            validation,
            attempts,
            generated_at: Utc::now(),
        })
    }

    fn run_round(
        &self,
        validator: &LetterValidator<'_, G>,
        history: &PromptHistory,
        attempt: usize,
        claim: &ClaimRecord,
        clinical: &ClinicalRecord,
    ) -> Result<RoundOutcome, AppealError> {
        let letter = self
            .generator
            .complete(&history.render(), APPEAL_SYSTEM_PROMPT)
            .map_err(|source| {
                tracing::error!(attempt, error = %source, "Appeal letter generation failed");
                AppealError::Generation { attempt, source }
            })?;

        let validation = validator.validate(&letter, &clinical.patient_name, &claim.claim_number);
        let instructions = synthesize_feedback(&validation);

        tracing::debug!(
            attempt,
            name = validation.contains_patient_name,
            claim_number = validation.contains_claim_number,
            score = validation.sentiment_score,
            necessity = validation.contains_medical_necessity,
            instructions = instructions.len(),
            "Appeal attempt validated"
        );

        let next = history.with_notes(attempt, &instructions);
        Ok(RoundOutcome {
            letter,
            record: AttemptRecord {
                attempt,
                validation,
                instructions,
            },
            next,
        })
    }
}
