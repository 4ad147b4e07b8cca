use crate::config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Connection to {server} failed: {reason}")]
    ConnectFailed { server: String, reason: String },

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("Certificate verification failed: {0}")]
    CertificateInvalid(String),

    #[error("SSL post connection check failed. CN mismatch: {found}")]
    CommonNameMismatch { expected: String, found: String },

    #[error("Peer X509 not in pinned list")]
    PinMismatch,

    #[error("Transport timeout after {timeout_ms}ms during {operation}")]
    TransportTimeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    #[error("{operation}: peer closed connection")]
    PeerClosed { operation: &'static str },

    #[error("Transport not connected")]
    NotConnected,

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Upstream returned HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("Invalid HTTP response: {0}")]
    InvalidHttpResponse(String),

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Result buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("Unsupported address family: {0}")]
    UnsupportedFamily(i32),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DomainError {
    /// Transport and codec failures: the caller should try the whole
    /// resolution again later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DomainError::ConnectFailed { .. }
                | DomainError::Tls(_)
                | DomainError::CertificateInvalid(_)
                | DomainError::CommonNameMismatch { .. }
                | DomainError::PinMismatch
                | DomainError::TransportTimeout { .. }
                | DomainError::PeerClosed { .. }
                | DomainError::NotConnected
                | DomainError::IoError(_)
                | DomainError::HttpStatus { .. }
                | DomainError::InvalidHttpResponse(_)
                | DomainError::InvalidDnsResponse(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound(_))
    }
}

impl From<ConfigError> for DomainError {
    fn from(e: ConfigError) -> Self {
        DomainError::Config(e.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::IoError(e.to_string())
    }
}
