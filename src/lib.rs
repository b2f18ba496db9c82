pub mod config;
pub mod pipeline;

use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use pipeline::generator::{GeneratorError, OllamaGenerator};
use pipeline::processor::{process_files, AppealBatch, ProcessingError};

/// Failures that end a command-line run.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Usage: {} <clinical-note> <remittance-advice>", config::APP_NAME)]
    Usage,

    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Generator setup failed: {0}")]
    Generator(#[from] GeneratorError),

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Paths of the two input documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inputs {
    pub clinical_note: PathBuf,
    pub remittance_advice: PathBuf,
}

/// Parse positional arguments (program name already stripped).
pub fn parse_args<I>(args: I) -> Result<Inputs, AppError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    match (args.next(), args.next(), args.next()) {
        (Some(clinical), Some(remittance), None) => Ok(Inputs {
            clinical_note: PathBuf::from(clinical),
            remittance_advice: PathBuf::from(remittance),
        }),
        _ => Err(AppError::Usage),
    }
}

pub fn run() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    match execute(std::env::args().skip(1)) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Load settings, process both documents and render the batch as JSON.
fn execute<I>(args: I) -> Result<String, AppError>
where
    I: IntoIterator<Item = String>,
{
    let inputs = parse_args(args)?;
    let settings = config::Settings::from_env()?;
    let generator = OllamaGenerator::from_settings(&settings.generator)?;
    if !generator.model_ready() {
        tracing::warn!(model = generator.model(), "Model not confirmed available, continuing");
    }

    let batch = process_files(
        &inputs.clinical_note,
        &inputs.remittance_advice,
        &generator,
        &settings.appeal,
    )?;
    render_batch(&batch)
}

/// Pretty JSON rendering of a batch, as printed by the binary.
pub fn render_batch(batch: &AppealBatch) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(batch)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn two_paths_are_accepted() {
        let inputs = parse_args(args(&["note.txt", "remit.txt"])).unwrap();
        assert_eq!(inputs.clinical_note, PathBuf::from("note.txt"));
        assert_eq!(inputs.remittance_advice, PathBuf::from("remit.txt"));
    }

    #[test]
    fn wrong_arity_is_usage_error() {
        assert!(matches!(parse_args(args(&[])), Err(AppError::Usage)));
        assert!(matches!(parse_args(args(&["one"])), Err(AppError::Usage)));
        assert!(matches!(
            parse_args(args(&["a", "b", "c"])),
            Err(AppError::Usage)
        ));
    }

    #[test]
    fn usage_message_names_the_binary() {
        assert!(AppError::Usage.to_string().contains(config::APP_NAME));
    }
}
