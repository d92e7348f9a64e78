//! Naming oracle: the external model server that proposes names.
//!
//! The orchestrator only sees the `NamingOracle` trait; the shipped
//! implementation talks to a local Ollama server over HTTP. Suggestions come
//! back as free text and are validated by the caller, not here.

pub mod ollama;

pub use ollama::OllamaClient;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for oracle operations.
#[derive(Debug, Error)]
pub enum OracleError {
    /// Host, port, or model missing from the settings.
    #[error("Naming oracle is not configured; set host, port, and model first")]
    Unconfigured,

    /// Network-level failure talking to the model server.
    #[error("Failed to reach naming oracle: {0}")]
    Transport(String),

    /// The server answered, but not with anything we can use.
    #[error("Unexpected response from naming oracle: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        OracleError::Transport(err.to_string())
    }
}

/// Connection settings for the naming oracle.
///
/// An explicitly constructed value stored in the project config and passed by
/// reference wherever needed; nothing here is process-global. Settings are
/// read-only while a rename task is in flight.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OracleSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Context-length budget forwarded to the model (`num_ctx`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u64>,
}

impl OracleSettings {
    /// True once host, port, and model are all set.
    pub fn is_configured(&self) -> bool {
        self.host.is_some() && self.port.is_some() && self.model.is_some()
    }

    /// Base URL of the server, if host and port are set. A host without a
    /// scheme gets `http://` prepended.
    pub fn base_url(&self) -> Option<String> {
        let host = self.host.as_deref()?;
        let port = self.port?;
        if host.contains("://") {
            Some(format!("{host}:{port}"))
        } else {
            Some(format!("http://{host}:{port}"))
        }
    }
}

/// Trait implemented by naming oracles (e.g., an Ollama-served model).
///
/// Both methods return the oracle's raw suggestion text; validation (single
/// word, non-empty) is the orchestrator's job. A transport failure is an
/// error; a useless answer is not.
pub trait NamingOracle: Send + Sync {
    /// Propose a name for the function whose decompiled text is given.
    fn function_name(&self, decompiled: &str) -> Result<String, OracleError>;

    /// Propose a name for `variable` as it appears in the given function text.
    fn variable_name(&self, variable: &str, decompiled: &str) -> Result<String, OracleError>;

    /// Returns a human-readable name for the oracle, used in progress messages.
    fn name(&self) -> &'static str;
}
