//! Ollama HTTP client and wire types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::oracle::{NamingOracle, OracleError, OracleSettings};

/// Per-request timeout. Generation on a loaded local model can be slow, so
/// this is generous; connection failures surface much faster.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Ollama `/api/generate` request structure.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

/// Model options forwarded with a generate request.
#[derive(Debug, Serialize)]
struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    num_ctx: Option<u64>,
}

/// Response from `/api/generate`.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Response from `/api/tags`.
#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<ModelEntry>,
}

/// One installed model as listed by the server.
#[derive(Debug, Deserialize)]
struct ModelEntry {
    name: String,
}

/// Blocking client for a local Ollama server.
///
/// Built fresh from the current settings whenever a task starts, so a
/// host/port change simply takes effect on the next construction.
pub struct OllamaClient {
    http: reqwest::blocking::Client,
    base_url: String,
    model: String,
    num_ctx: Option<u64>,
}

impl OllamaClient {
    /// Build a client from fully populated settings.
    ///
    /// Errors with `Unconfigured` when host, port, or model is missing, so
    /// callers can prompt for configuration before starting a task.
    pub fn from_settings(settings: &OracleSettings) -> Result<Self, OracleError> {
        if !settings.is_configured() {
            return Err(OracleError::Unconfigured);
        }
        let base_url = settings.base_url().ok_or(OracleError::Unconfigured)?;
        let model = settings.model.clone().ok_or(OracleError::Unconfigured)?;
        let http =
            reqwest::blocking::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self { http, base_url, model, num_ctx: settings.num_ctx })
    }

    /// Query the server for its installed models. Only host and port need to
    /// be set; this is how a model gets picked in the first place.
    pub fn list_models(settings: &OracleSettings) -> Result<Vec<String>, OracleError> {
        let base_url = settings.base_url().ok_or(OracleError::Unconfigured)?;
        let http =
            reqwest::blocking::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        let response = http.get(format!("{base_url}/api/tags")).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::InvalidResponse(format!("HTTP {status}")));
        }
        let body = response.text()?;
        let tags: TagsResponse = serde_json::from_str(&body)
            .map_err(|err| OracleError::InvalidResponse(err.to_string()))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Run one non-streaming generation round trip and return the raw text.
    fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions { num_ctx: self.num_ctx },
        };

        let response =
            self.http.post(format!("{}/api/generate", self.base_url)).json(&request).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::InvalidResponse(format!("HTTP {status}")));
        }
        let body = response.text()?;
        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|err| OracleError::InvalidResponse(err.to_string()))?;
        Ok(parsed.response)
    }
}

impl NamingOracle for OllamaClient {
    fn function_name(&self, decompiled: &str) -> Result<String, OracleError> {
        let prompt = format!(
            "Given the following decompiled code snippet, provide a function name that \
             describes what the code is doing. The name must meet the following criteria: \
             all lowercase letters, a single word with underscores between words. Only \
             return the function name, with no other explanation or text.\n\
             Function:\n{decompiled}\n\n"
        );
        self.generate(&prompt)
    }

    fn variable_name(&self, variable: &str, decompiled: &str) -> Result<String, OracleError> {
        let prompt = format!(
            "In one word, what should the variable '{variable}' be named in the function \
             below? The name must be all lowercase letters and usable as an identifier.\n\
             Function:\n{decompiled}\n\n"
        );
        self.generate(&prompt)
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}
