pub mod types;
pub mod ollama;

pub use types::*;
pub use ollama::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Ollama is not running at {0}")]
    OllamaConnection(String),

    #[error("Ollama returned error (status {status}): {body}")]
    OllamaError { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Generator returned an empty response")]
    EmptyResponse,
}
