use serde::{Deserialize, Serialize};

use crate::oracle::OracleSettings;

/// Database configuration: where the project database lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    /// Path to the project database file (typically relative to project root).
    pub path: String,
}

impl DbConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Serializable configuration describing a Binary Namer project.
///
/// This lives at `.namer/project.json` in the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Human-friendly project name.
    pub name: String,
    /// Optional description / notes.
    pub description: Option<String>,
    /// Schema/config version. This is about the config format, not binary version.
    pub config_version: String,
    /// Database configuration (path is typically relative to project root).
    pub db: DbConfig,
    /// Naming-oracle connection settings (host, port, model, context length).
    #[serde(default)]
    pub oracle: OracleSettings,
}

impl ProjectConfig {
    /// Create a new project configuration using the given name and db path.
    ///
    /// The oracle starts unconfigured; `set-server` / `set-model` fill it in.
    pub fn new(name: impl Into<String>, db_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            config_version: "0.1.0".to_string(),
            db: DbConfig::new(db_path),
            oracle: OracleSettings::default(),
        }
    }
}
