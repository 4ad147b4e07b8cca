use super::{ConfigError, InternalDomains, LoggingConfig, ResolverConfig, UpstreamConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/harddns/harddns.toml";

/// Main configuration, read once and then consumed as read-only tables.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default, rename = "upstream")]
    pub upstreams: Vec<UpstreamConfig>,

    #[serde(default)]
    pub internal_domains: InternalDomains,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upstreams.is_empty() {
            return Err(ConfigError::Validation(
                "at least one [[upstream]] is required".to_string(),
            ));
        }
        if self.resolver.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "resolver.timeout_ms must be greater than 0".to_string(),
            ));
        }
        for upstream in &self.upstreams {
            upstream.validate()?;
        }
        self.internal_domains.validate()
    }
}
