use serde::Serialize;
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "claimback";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of generate → validate → feedback rounds per claim.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default Ollama model tag.
pub const DEFAULT_MODEL: &str = "medgemma";

/// Default per-request timeout for generator calls, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub const ENV_OLLAMA_URL: &str = "CLAIMBACK_OLLAMA_URL";
pub const ENV_MODEL: &str = "CLAIMBACK_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "CLAIMBACK_TIMEOUT_SECS";
pub const ENV_MAX_ATTEMPTS: &str = "CLAIMBACK_MAX_ATTEMPTS";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "claimback=info,claimback_lib=info"
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Settings for the text generator backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratorSettings {
    pub base_url: String,
    pub model: String,
    pub request_timeout_secs: u64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Settings for the appeal refinement loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AppealSettings {
    pub max_attempts: usize,
}

impl Default for AppealSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// All runtime settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub generator: GeneratorSettings,
    pub appeal: AppealSettings,
}

impl Settings {
    /// Load settings from `CLAIMBACK_*` environment variables, falling back
    /// to defaults for unset ones.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(url) = non_empty(lookup(ENV_OLLAMA_URL)) {
            settings.generator.base_url = url;
        }
        if let Some(model) = non_empty(lookup(ENV_MODEL)) {
            settings.generator.model = model;
        }
        if let Some(raw) = non_empty(lookup(ENV_TIMEOUT_SECS)) {
            settings.generator.request_timeout_secs = parse_positive(ENV_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = non_empty(lookup(ENV_MAX_ATTEMPTS)) {
            settings.appeal.max_attempts = parse_positive(ENV_MAX_ATTEMPTS, &raw)? as usize;
        }

        Ok(settings)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_positive(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}
