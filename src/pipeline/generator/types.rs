use std::collections::VecDeque;
use std::sync::Mutex;

use super::GeneratorError;

/// Black-box text generation capability: one prompt in, plain text out.
///
/// `system` frames the call (letter drafting, tone scoring) and travels with
/// each request. Implementations block until the backend answers or fails.
/// The appeal pipeline never streams and never asks for structured output.
pub trait TextGenerator {
    fn complete(&self, prompt: &str, system: &str) -> Result<String, GeneratorError>;
}

impl<T: TextGenerator + ?Sized> TextGenerator for &T {
    fn complete(&self, prompt: &str, system: &str) -> Result<String, GeneratorError> {
        (**self).complete(prompt, system)
    }
}

/// One request seen by [`MockGenerator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub prompt: String,
    pub system: String,
}

/// Scripted generator for tests: replays queued replies in order and records
/// every request it receives.
///
/// Prompts that look like sentiment-scoring requests are answered from a
/// separate queue so tests can script letters and scores independently.
pub struct MockGenerator {
    letters: Mutex<VecDeque<Result<String, GeneratorError>>>,
    scores: Mutex<VecDeque<Result<String, GeneratorError>>>,
    fallback_letter: String,
    fallback_score: String,
    calls: Mutex<Vec<RecordedCall>>,
}

/// Marker that identifies the validator's scoring prompt.
const SCORING_PROMPT_MARKER: &str = "Rate the professional tone";

impl MockGenerator {
    /// A generator that always answers with `letter` and scores it `score`.
    pub fn new(letter: &str, score: i32) -> Self {
        Self {
            letters: Mutex::new(VecDeque::new()),
            scores: Mutex::new(VecDeque::new()),
            fallback_letter: letter.to_string(),
            fallback_score: score.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a letter reply (or failure) ahead of the fallback.
    pub fn push_letter(self, reply: Result<String, GeneratorError>) -> Self {
        lock(&self.letters).push_back(reply);
        self
    }

    /// Queue a scoring reply (or failure) ahead of the fallback.
    pub fn push_score(self, reply: Result<String, GeneratorError>) -> Self {
        lock(&self.scores).push_back(reply);
        self
    }

    /// Every request seen, in call order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Every prompt seen, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.prompt).collect()
    }

    /// Prompts that asked for a letter (scoring prompts excluded).
    pub fn letter_prompts(&self) -> Vec<String> {
        self.prompts()
            .into_iter()
            .filter(|p| !is_scoring_prompt(p))
            .collect()
    }
}

impl TextGenerator for MockGenerator {
    fn complete(&self, prompt: &str, system: &str) -> Result<String, GeneratorError> {
        lock(&self.calls).push(RecordedCall {
            prompt: prompt.to_string(),
            system: system.to_string(),
        });
        if is_scoring_prompt(prompt) {
            lock(&self.scores)
                .pop_front()
                .unwrap_or_else(|| Ok(self.fallback_score.clone()))
        } else {
            lock(&self.letters)
                .pop_front()
                .unwrap_or_else(|| Ok(self.fallback_letter.clone()))
        }
    }
}

fn is_scoring_prompt(prompt: &str) -> bool {
    prompt.contains(SCORING_PROMPT_MARKER)
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
