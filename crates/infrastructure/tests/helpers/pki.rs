use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DnType, ExtendedKeyUsagePurpose, IsCa,
    KeyPair,
};
use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::{RootCertStore, ServerConfig};
use std::sync::Arc;

/// Throwaway certificate authority for transport tests.
pub struct TestCa {
    pub cert: Certificate,
    pub key: KeyPair,
}

impl TestCa {
    pub fn new() -> Self {
        let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params
            .distinguished_name
            .push(DnType::CommonName, "harddns test CA");
        let key = KeyPair::generate().unwrap();
        let cert = params.self_signed(&key).unwrap();
        Self { cert, key }
    }

    pub fn roots(&self) -> Arc<RootCertStore> {
        let mut roots = RootCertStore::empty();
        roots.add(self.cert.der().clone()).unwrap();
        Arc::new(roots)
    }

    /// Leaf valid for `san`, with subject CN `cn`.
    pub fn issue(&self, san: &str, cn: &str) -> TestLeaf {
        self.issue_with_key(san, cn, KeyPair::generate().unwrap())
    }

    pub fn issue_with_key(&self, san: &str, cn: &str, key: KeyPair) -> TestLeaf {
        let mut params = CertificateParams::new(vec![san.to_string()]).unwrap();
        params.distinguished_name.push(DnType::CommonName, cn);
        params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];
        let cert = params.signed_by(&key, &self.cert, &self.key).unwrap();
        TestLeaf { cert, key }
    }
}

pub struct TestLeaf {
    pub cert: Certificate,
    pub key: KeyPair,
}

impl TestLeaf {
    /// DER SubjectPublicKeyInfo of the leaf key.
    pub fn spki(&self) -> Vec<u8> {
        let (_, parsed) = x509_parser::parse_x509_certificate(self.cert.der()).unwrap();
        parsed.public_key().raw.to_vec()
    }

    pub fn pem(&self) -> String {
        self.cert.pem()
    }

    pub fn key_copy(&self) -> KeyPair {
        KeyPair::from_pem(&self.key.serialize_pem()).unwrap()
    }

    pub fn server_config(&self, ca: &TestCa) -> Arc<ServerConfig> {
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(self.key.serialize_der()));
        let config = ServerConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(vec![self.cert.der().clone(), ca.cert.der().clone()], key)
        .unwrap();
        Arc::new(config)
    }
}
