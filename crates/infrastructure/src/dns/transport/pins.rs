//! Public keys pinned per upstream, checked on top of chain validation.

use harddns_domain::{ConfigError, UpstreamConfig};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Zero or more pinned keys, held as DER SubjectPublicKeyInfo, plus SHA-256
/// digests of SPKI structures. Two certificates carrying the same key match
/// the same pin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinnedKeySet {
    keys: Vec<Vec<u8>>,
    digests: Vec<[u8; 32]>,
}

impl PinnedKeySet {
    pub fn new(keys: Vec<Vec<u8>>, digests: Vec<[u8; 32]>) -> Self {
        Self { keys, digests }
    }

    pub fn for_upstream(upstream: &UpstreamConfig) -> Result<Self, ConfigError> {
        let mut set = Self::new(Vec::new(), upstream.sha256_pins()?);
        for path in &upstream.pinned_keys {
            let loaded = load_pem_keys(path).map_err(|reason| ConfigError::InvalidUpstream {
                upstream: upstream.label().to_string(),
                reason,
            })?;
            debug!(upstream = upstream.label(), file = %path.display(), keys = loaded.len(), "Pinned keys loaded");
            set.keys.extend(loaded);
        }
        Ok(set)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.digests.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len() + self.digests.len()
    }

    /// Whether `spki` (DER SubjectPublicKeyInfo) equals a pinned key.
    pub fn matches(&self, spki: &[u8]) -> bool {
        if self.keys.iter().any(|key| key.as_slice() == spki) {
            return true;
        }
        if self.digests.is_empty() {
            return false;
        }
        let digest: [u8; 32] = Sha256::digest(spki).into();
        self.digests.contains(&digest)
    }
}

/// Read every certificate and public key from a PEM file, keeping only the
/// SubjectPublicKeyInfo of each.
pub fn load_pem_keys(path: &Path) -> Result<Vec<Vec<u8>>, String> {
    let file = File::open(path).map_err(|e| format!("cannot open {}: {}", path.display(), e))?;
    let mut reader = BufReader::new(file);
    let mut keys = Vec::new();

    for item in rustls_pemfile::read_all(&mut reader) {
        let item = item.map_err(|e| format!("bad PEM in {}: {}", path.display(), e))?;
        match item {
            rustls_pemfile::Item::X509Certificate(cert) => {
                let (_, parsed) = x509_parser::parse_x509_certificate(cert.as_ref())
                    .map_err(|e| format!("bad certificate in {}: {}", path.display(), e))?;
                keys.push(parsed.public_key().raw.to_vec());
            }
            rustls_pemfile::Item::SubjectPublicKeyInfo(spki) => {
                keys.push(spki.as_ref().to_vec());
            }
            _ => {}
        }
    }

    if keys.is_empty() {
        return Err(format!("no certificate or public key in {}", path.display()));
    }
    Ok(keys)
}
