use crate::dns_record::RecordType;
use std::fmt;

/// Address family requested by a resolution caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    V4,
    V6,
    /// Either family; used by the address-tuple-list shape.
    Both,
}

impl AddressFamily {
    /// Whether an address record of `record_type` answers this family.
    pub fn matches(&self, record_type: RecordType) -> bool {
        match self {
            AddressFamily::V4 => record_type == RecordType::A,
            AddressFamily::V6 => record_type == RecordType::AAAA,
            AddressFamily::Both => record_type.is_address(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AddressFamily::V4 => "A",
            AddressFamily::V6 => "AAAA",
            AddressFamily::Both => "A/AAAA",
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_matching() {
        assert!(AddressFamily::V4.matches(RecordType::A));
        assert!(!AddressFamily::V4.matches(RecordType::AAAA));
        assert!(AddressFamily::V6.matches(RecordType::AAAA));
        assert!(AddressFamily::Both.matches(RecordType::A));
        assert!(AddressFamily::Both.matches(RecordType::AAAA));
        assert!(!AddressFamily::Both.matches(RecordType::CNAME));
    }
}
