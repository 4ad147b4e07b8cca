use harddns_domain::DomainError;
use rustls::RootCertStore;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

/// Bundle files tried before scanning the directory.
const BUNDLE_NAMES: &[&str] = &["ca-certificates.crt", "ca-bundle.crt", "tls-ca-bundle.pem"];

/// System trust store from a directory of PEM certificates. A directory
/// that yields no usable root is a configuration error.
pub fn load_trust_store(dir: &Path) -> Result<RootCertStore, DomainError> {
    let mut roots = RootCertStore::empty();

    let bundle = BUNDLE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file());

    let (added, ignored) = match bundle {
        Some(path) => add_pem_file(&mut roots, &path),
        None => scan_directory(&mut roots, dir),
    };

    if roots.is_empty() {
        warn!(dir = %dir.display(), ignored, "No usable CA certificates found");
        return Err(DomainError::Config(format!(
            "trust store {} contains no usable CA certificates",
            dir.display()
        )));
    }
    debug!(dir = %dir.display(), added, ignored, "Trust store loaded");
    Ok(roots)
}

fn scan_directory(roots: &mut RootCertStore, dir: &Path) -> (usize, usize) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return (0, 0);
    };
    let mut totals = (0, 0);
    for entry in entries.flatten() {
        let path = entry.path();
        let is_pem = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| matches!(ext, "pem" | "crt"));
        if !is_pem || !path.is_file() {
            continue;
        }
        let (added, ignored) = add_pem_file(roots, &path);
        totals.0 += added;
        totals.1 += ignored;
    }
    totals
}

fn add_pem_file(roots: &mut RootCertStore, path: &Path) -> (usize, usize) {
    let Ok(file) = File::open(path) else {
        return (0, 0);
    };
    let mut reader = BufReader::new(file);
    let certs: Vec<_> = rustls_pemfile::certs(&mut reader).flatten().collect();
    roots.add_parsable_certificates(certs)
}
