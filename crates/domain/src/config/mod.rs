//! Configuration module for harddns
//!
//! - `root`: main configuration, loading and validation
//! - `upstream`: DoH upstream identities and their pins
//! - `resolver`: resolution policy and transport timeouts
//! - `internal`: domain overrides resolved over plain DNS
//! - `logging`: logging settings
//! - `errors`: configuration errors

pub mod errors;
pub mod internal;
pub mod logging;
pub mod resolver;
pub mod root;
pub mod upstream;

pub use errors::ConfigError;
pub use internal::InternalDomains;
pub use logging::LoggingConfig;
pub use resolver::ResolverConfig;
pub use root::{Config, DEFAULT_CONFIG_PATH};
pub use upstream::UpstreamConfig;
