use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid upstream '{upstream}': {reason}")]
    InvalidUpstream { upstream: String, reason: String },

    #[error("Invalid internal domain '{domain}': {reason}")]
    InvalidInternalDomain { domain: String, reason: String },

    #[error("Invalid config: {0}")]
    Validation(String),
}
