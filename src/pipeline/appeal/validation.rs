use std::sync::LazyLock;

use regex::Regex;

use super::types::ValidationResult;
use crate::pipeline::generator::TextGenerator;

/// Phrases that count as an explicit medical-necessity argument.
pub const MEDICAL_NECESSITY_PHRASES: &[&str] = &[
    "medical necessity",
    "medically necessary",
    "clinical justification",
    "required treatment",
    "essential procedure",
    "crucial intervention",
];

pub const SENTIMENT_SCORE_MIN: i8 = -10;
pub const SENTIMENT_SCORE_MAX: i8 = 10;

/// System prompt for tone-scoring calls. Kept apart from the letter-writing
/// persona so the reply stays a bare number.
pub const SCORING_SYSTEM_PROMPT: &str = "You are a strict evaluator of professional \
correspondence. You reply with one integer and nothing else.";

/// First integer-looking token in a scoring reply.
static INTEGER_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-?\d+").unwrap());

/// Build the scoring prompt sent to the generator for one letter.
pub fn build_sentiment_prompt(letter: &str) -> String {
    format!(
        "Rate the professional tone and persuasiveness of the following insurance appeal \
         letter on a scale from {SENTIMENT_SCORE_MIN} (hostile, unprofessional) to \
         {SENTIMENT_SCORE_MAX} (highly professional, persuasive and empathetic). \
         Respond with a single integer only.\n\n<letter>\n{letter}\n</letter>"
    )
}

/// Parse the first integer in `reply`, clamped to the score range.
///
/// Tokens too long for `i64` saturate toward their sign.
pub fn parse_sentiment_score(reply: &str) -> Option<i8> {
    let token = INTEGER_TOKEN.find(reply)?.as_str();
    let value = match token.parse::<i64>() {
        Ok(n) => n,
        Err(_) if token.starts_with('-') => i64::MIN,
        Err(_) => i64::MAX,
    };
    Some(value.clamp(SENTIMENT_SCORE_MIN as i64, SENTIMENT_SCORE_MAX as i64) as i8)
}

/// Case-insensitive substring test.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// True when the letter uses any medical-necessity phrase.
pub fn mentions_medical_necessity(letter: &str) -> bool {
    let lower = letter.to_lowercase();
    MEDICAL_NECESSITY_PHRASES
        .iter()
        .any(|phrase| lower.contains(phrase))
}

/// Scores candidate letters against the appeal checklist.
///
/// Structural checks are local. Tone is scored by the generator on a best
/// effort basis: a failed or unparseable scoring call yields 0.
pub struct LetterValidator<'a, G: TextGenerator> {
    generator: &'a G,
}

impl<'a, G: TextGenerator> LetterValidator<'a, G> {
    pub fn new(generator: &'a G) -> Self {
        Self { generator }
    }

    pub fn validate(
        &self,
        letter: &str,
        expected_name: &str,
        expected_claim_number: &str,
    ) -> ValidationResult {
        ValidationResult {
            contains_patient_name: contains_ignore_case(letter, expected_name),
            contains_claim_number: contains_ignore_case(letter, expected_claim_number),
            sentiment_score: self.score_sentiment(letter),
            contains_medical_necessity: mentions_medical_necessity(letter),
        }
    }

    fn score_sentiment(&self, letter: &str) -> i8 {
        let prompt = build_sentiment_prompt(letter);
        match self.generator.complete(&prompt, SCORING_SYSTEM_PROMPT) {
            Ok(reply) => parse_sentiment_score(&reply).unwrap_or_else(|| {
                tracing::warn!(
                    reply_len = reply.len(),
                    "Sentiment reply had no integer, scoring 0"
                );
                0
            }),
            Err(e) => {
                tracing::warn!(error = %e, "Sentiment scoring failed, scoring 0");
                0
            }
        }
    }
}
