use super::errors::ConfigError;
use crate::dns_record::record::normalize_name;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};

/// Domains answered by a plain DNS server instead of the DoH upstream.
///
/// A rule for "home.lan" matches "home.lan" and every name below it, but
/// not "otherhome.lan". The longest matching rule wins.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct InternalDomains(pub BTreeMap<String, String>);

impl InternalDomains {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn server_for(&self, name: &str) -> Option<SocketAddr> {
        let name = normalize_name(name);
        self.0
            .iter()
            .filter(|(domain, _)| matches_domain(&name, domain))
            .max_by_key(|(domain, _)| domain.len())
            .and_then(|(_, server)| parse_server(server))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (domain, server) in &self.0 {
            if normalize_name(domain).is_empty() {
                return Err(ConfigError::InvalidInternalDomain {
                    domain: domain.clone(),
                    reason: "domain cannot be empty".to_string(),
                });
            }
            if parse_server(server).is_none() {
                return Err(ConfigError::InvalidInternalDomain {
                    domain: domain.clone(),
                    reason: format!("'{}' is not an IP address or IP:port", server),
                });
            }
        }
        Ok(())
    }
}

fn matches_domain(name: &str, domain: &str) -> bool {
    let rule = normalize_name(domain);
    name == rule || name.ends_with(&format!(".{}", rule))
}

fn parse_server(server: &str) -> Option<SocketAddr> {
    server
        .parse::<SocketAddr>()
        .ok()
        .or_else(|| server.parse::<IpAddr>().ok().map(|ip| SocketAddr::new(ip, 53)))
}
