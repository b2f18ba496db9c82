use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::types::TextGenerator;
use super::GeneratorError;
use crate::config::GeneratorSettings;

/// Ollama HTTP client for local LLM inference.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    /// Create a client pointing at an Ollama instance. Every request is
    /// bounded by `timeout_secs`.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, GeneratorError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GeneratorError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run a single non-streaming completion.
    pub fn generate(
        &self,
        model: &str,
        prompt: &str,
        system: &str,
    ) -> Result<String, GeneratorError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model,
            prompt,
            system,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GeneratorError::OllamaError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .map_err(|e| GeneratorError::ResponseParsing(e.to_string()))?;

        Ok(parsed.response)
    }

    pub fn is_model_available(&self, model: &str) -> Result<bool, GeneratorError> {
        let models = self.list_models()?;
        Ok(models.iter().any(|m| m.starts_with(model)))
    }

    pub fn list_models(&self) -> Result<Vec<String>, GeneratorError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GeneratorError::OllamaError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaTagsResponse = response
            .json()
            .map_err(|e| GeneratorError::ResponseParsing(e.to_string()))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }

    fn transport_error(&self, e: reqwest::Error) -> GeneratorError {
        if e.is_connect() {
            GeneratorError::OllamaConnection(self.base_url.clone())
        } else if e.is_timeout() {
            GeneratorError::HttpClient(format!(
                "Request timed out after {}s",
                self.timeout_secs
            ))
        } else {
            GeneratorError::HttpClient(e.to_string())
        }
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

/// `TextGenerator` backed by a local Ollama instance with a fixed model.
pub struct OllamaGenerator {
    client: OllamaClient,
    model: String,
}

impl OllamaGenerator {
    pub fn new(client: OllamaClient, model: String) -> Self {
        Self { client, model }
    }

    /// Build a generator from runtime settings.
    pub fn from_settings(settings: &GeneratorSettings) -> Result<Self, GeneratorError> {
        let client = OllamaClient::new(&settings.base_url, settings.request_timeout_secs)?;
        Ok(Self::new(client, settings.model.clone()))
    }

    /// Check that the configured model is pulled. Failures are logged and
    /// reported as `false`; generation will surface the real error later.
    pub fn model_ready(&self) -> bool {
        match self.client.is_model_available(&self.model) {
            Ok(true) => {
                tracing::info!(model = %self.model, "Ollama model confirmed");
                true
            }
            Ok(false) => {
                tracing::warn!(model = %self.model, "Ollama model not available");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, url = %self.client.base_url(), "Cannot reach Ollama");
                false
            }
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TextGenerator for OllamaGenerator {
    fn complete(&self, prompt: &str, system: &str) -> Result<String, GeneratorError> {
        let text = self.client.generate(&self.model, prompt, system)?;
        if text.trim().is_empty() {
            return Err(GeneratorError::EmptyResponse);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ollama_client_constructor() {
        let client = OllamaClient::new("http://localhost:11434", 120).unwrap();
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.timeout_secs, 120);
    }

    #[test]
    fn ollama_client_trims_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", 60).unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    #[test]
    fn generator_from_settings_keeps_model() {
        let settings = GeneratorSettings {
            base_url: "http://127.0.0.1:11434/".into(),
            model: "medgemma:4b".into(),
            request_timeout_secs: 30,
        };
        let generator = OllamaGenerator::from_settings(&settings).unwrap();
        assert_eq!(generator.model(), "medgemma:4b");
        assert_eq!(generator.client.base_url(), "http://127.0.0.1:11434");
        assert_eq!(generator.client.timeout_secs, 30);
    }

    #[test]
    fn generate_request_serializes_non_streaming() {
        let body = OllamaGenerateRequest {
            model: "m",
            prompt: "p",
            system: "s",
            stream: false,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"stream\":false"));
        assert!(json.contains("\"model\":\"m\""));
    }

    #[test]
    fn tags_response_parses_model_names() {
        let parsed: OllamaTagsResponse =
            serde_json::from_str(r#"{"models":[{"name":"medgemma:latest"},{"name":"llama3:8b"}]}"#)
                .unwrap();
        let names: Vec<String> = parsed.models.into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["medgemma:latest", "llama3:8b"]);
    }

    #[test]
    fn unreachable_host_reports_connection_error() {
        // Port 9 (discard) on localhost is not an Ollama server.
        let client = OllamaClient::new("http://127.0.0.1:9", 2).unwrap();
        let err = client.generate("m", "p", "s").unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::OllamaConnection(_) | GeneratorError::HttpClient(_)
        ));
    }
}
