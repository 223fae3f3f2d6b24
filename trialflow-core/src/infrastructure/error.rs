// trialflow-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(trialflow::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / DATA (YAML) ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(trialflow::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    // --- EXPORTS (JSON) ---
    #[error("JSON Serialization Error: {0}")]
    #[diagnostic(code(trialflow::infra::json))]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration for '{subject}': {source}")]
    #[diagnostic(
        code(trialflow::infra::invalid_config),
        help("Every entity needs a non-empty 'kind' and 'data_source_ref'.")
    )]
    InvalidConfig {
        subject: String,
        #[source]
        source: validator::ValidationErrors,
    },

    #[error("Project configuration not found at '{0}'")]
    #[diagnostic(code(trialflow::infra::config_missing))]
    ConfigNotFound(String),
}
