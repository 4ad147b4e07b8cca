use super::errors::ConfigError;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// One DoH upstream identity.
///
/// The upstream is always addressed by a literal IP: resolving its name would
/// recurse into this very resolver.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Label used in logs (e.g. "cloudflare")
    #[serde(default)]
    pub name: String,

    /// Literal IPv4 or IPv6 address
    pub ip: String,

    /// Expected subject common name of the peer certificate
    pub cn: String,

    /// HTTP Host header, also sent as TLS SNI
    pub host: String,

    /// HTTP path, e.g. "/dns-query" (RFC 8484) or "/resolve" (JSON API)
    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Wire-format RFC 8484 requests instead of the JSON API
    #[serde(default = "default_true")]
    pub rfc8484: bool,

    /// PEM files holding pinned certificates or public keys
    #[serde(default)]
    pub pinned_keys: Vec<PathBuf>,

    /// Base64 SHA-256 digests of pinned SubjectPublicKeyInfo structures,
    /// optionally prefixed with "sha256//"
    #[serde(default)]
    pub pinned_sha256: Vec<String>,
}

impl UpstreamConfig {
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.ip
        } else {
            &self.name
        }
    }

    pub fn ip_addr(&self) -> Result<IpAddr, ConfigError> {
        self.ip.parse().map_err(|_| self.invalid("ip must be a literal IPv4 or IPv6 address"))
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(SocketAddr::new(self.ip_addr()?, self.port))
    }

    pub fn sha256_pins(&self) -> Result<Vec<[u8; 32]>, ConfigError> {
        self.pinned_sha256
            .iter()
            .map(|pin| {
                let encoded = pin.strip_prefix("sha256//").unwrap_or(pin);
                let decoded = base64::engine::general_purpose::STANDARD
                    .decode(encoded.trim())
                    .map_err(|e| self.invalid(&format!("bad pin '{}': {}", pin, e)))?;
                <[u8; 32]>::try_from(decoded.as_slice())
                    .map_err(|_| self.invalid(&format!("pin '{}' is not a SHA-256 digest", pin)))
            })
            .collect()
    }

    pub fn has_pins(&self) -> bool {
        !self.pinned_keys.is_empty() || !self.pinned_sha256.is_empty()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ip_addr()?;
        if self.cn.trim().is_empty() {
            return Err(self.invalid("cn cannot be empty"));
        }
        if self.host.trim().is_empty() {
            return Err(self.invalid("host cannot be empty"));
        }
        if !self.path.starts_with('/') {
            return Err(self.invalid("path must start with '/'"));
        }
        if self.port == 0 {
            return Err(self.invalid("port cannot be 0"));
        }
        self.sha256_pins()?;
        Ok(())
    }

    fn invalid(&self, reason: &str) -> ConfigError {
        ConfigError::InvalidUpstream {
            upstream: self.label().to_string(),
            reason: reason.to_string(),
        }
    }
}

fn default_path() -> String {
    "/dns-query".to_string()
}

fn default_port() -> u16 {
    443
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream() -> UpstreamConfig {
        UpstreamConfig {
            name: "cloudflare".into(),
            ip: "1.1.1.1".into(),
            cn: "cloudflare-dns.com".into(),
            host: "cloudflare-dns.com".into(),
            path: "/dns-query".into(),
            port: 443,
            rfc8484: true,
            pinned_keys: vec![],
            pinned_sha256: vec![],
        }
    }

    #[test]
    fn test_valid_upstream() {
        assert!(upstream().validate().is_ok());
        assert_eq!(upstream().socket_addr().unwrap().port(), 443);
    }

    #[test]
    fn test_hostname_is_not_accepted_as_ip() {
        let mut cfg = upstream();
        cfg.ip = "one.one.one.one".into();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidUpstream { .. })
        ));
    }

    #[test]
    fn test_ipv6_literal() {
        let mut cfg = upstream();
        cfg.ip = "2606:4700:4700::1111".into();
        assert!(cfg.socket_addr().unwrap().is_ipv6());
    }

    #[test]
    fn test_sha256_pin_parsing() {
        let mut cfg = upstream();
        let digest = base64::engine::general_purpose::STANDARD.encode([7u8; 32]);
        cfg.pinned_sha256 = vec![format!("sha256//{}", digest), digest];
        assert_eq!(cfg.sha256_pins().unwrap(), vec![[7u8; 32], [7u8; 32]]);
        assert!(cfg.has_pins());

        cfg.pinned_sha256 = vec!["AAAA".into()];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_path_must_be_absolute() {
        let mut cfg = upstream();
        cfg.path = "dns-query".into();
        assert!(cfg.validate().is_err());
    }
}
