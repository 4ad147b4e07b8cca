use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Resolution policy and transport settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Also ask for AAAA records on every hop, whatever family was requested.
    #[serde(default)]
    pub query_aaaa: bool,

    /// Upper bound for each individual send or receive, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Directory of PEM CA certificates used to validate upstreams.
    #[serde(default = "default_trust_store")]
    pub trust_store: PathBuf,
}

impl ResolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            query_aaaa: false,
            timeout_ms: default_timeout_ms(),
            trust_store: default_trust_store(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_trust_store() -> PathBuf {
    PathBuf::from("/etc/ssl/certs")
}
