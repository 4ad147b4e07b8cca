use super::RecordType;
use crate::dns_record::record::normalize_name;
use std::sync::Arc;

/// DNS query (domain + record type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuery {
    pub domain: Arc<str>,
    pub record_type: RecordType,
}

impl DnsQuery {
    pub fn new(domain: impl AsRef<str>, record_type: RecordType) -> Self {
        Self {
            domain: Arc::from(normalize_name(domain.as_ref())),
            record_type,
        }
    }
}
