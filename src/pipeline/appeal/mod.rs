pub mod types;
pub mod matcher;
pub mod validation;
pub mod feedback;
pub mod prompt;
pub mod orchestrator;

pub use types::*;
pub use matcher::*;
pub use validation::*;
pub use feedback::*;
pub use prompt::*;
pub use orchestrator::*;

use thiserror::Error;

use crate::pipeline::generator::GeneratorError;

#[derive(Error, Debug)]
pub enum AppealError {
    #[error("Letter generation failed on attempt {attempt}: {source}")]
    Generation {
        attempt: usize,
        source: GeneratorError,
    },
}
