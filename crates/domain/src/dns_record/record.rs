use super::RecordType;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Owner of a resource record. Alias records are filed under a shared
/// sentinel owner so their ordinal position among all aliases is stable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordOwner {
    Name(String),
    Alias,
}

/// One answer record as produced by the query codec.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRecord {
    pub owner: RecordOwner,
    pub record_type: RecordType,
    /// 4 bytes for A, 16 for AAAA, the target name for CNAME.
    pub data: Vec<u8>,
    /// Time to live in seconds
    pub ttl: u32,
}

impl ResourceRecord {
    pub fn address(owner: impl Into<String>, address: IpAddr, ttl: u32) -> Self {
        let (record_type, data) = match address {
            IpAddr::V4(v4) => (RecordType::A, v4.octets().to_vec()),
            IpAddr::V6(v6) => (RecordType::AAAA, v6.octets().to_vec()),
        };
        Self {
            owner: RecordOwner::Name(normalize_name(&owner.into())),
            record_type,
            data,
            ttl,
        }
    }

    pub fn alias(target: impl AsRef<str>, ttl: u32) -> Self {
        Self {
            owner: RecordOwner::Alias,
            record_type: RecordType::CNAME,
            data: normalize_name(target.as_ref()).into_bytes(),
            ttl,
        }
    }

    pub fn is_alias(&self) -> bool {
        self.owner == RecordOwner::Alias
    }

    pub fn owner_name(&self) -> Option<&str> {
        match &self.owner {
            RecordOwner::Name(name) => Some(name),
            RecordOwner::Alias => None,
        }
    }

    /// Alias target, for CNAME records.
    pub fn target(&self) -> Option<&str> {
        if self.record_type != RecordType::CNAME {
            return None;
        }
        std::str::from_utf8(&self.data).ok()
    }

    pub fn ip(&self) -> Option<IpAddr> {
        match self.record_type {
            RecordType::A => <[u8; 4]>::try_from(self.data.as_slice())
                .ok()
                .map(|o| IpAddr::V4(Ipv4Addr::from(o))),
            RecordType::AAAA => <[u8; 16]>::try_from(self.data.as_slice())
                .ok()
                .map(|o| IpAddr::V6(Ipv6Addr::from(o))),
            RecordType::CNAME => None,
        }
    }
}

/// Lowercased, without the trailing root dot.
pub fn normalize_name(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_address_record_creation() {
        let record = ResourceRecord::address(
            "Example.COM.",
            IpAddr::from_str("192.0.2.1").unwrap(),
            300,
        );

        assert_eq!(record.owner_name(), Some("example.com"));
        assert_eq!(record.record_type, RecordType::A);
        assert_eq!(record.data, vec![192, 0, 2, 1]);
        assert_eq!(record.ttl, 300);
    }

    #[test]
    fn test_v6_record_holds_sixteen_bytes() {
        let record =
            ResourceRecord::address("example.com", IpAddr::from_str("2001:db8::1").unwrap(), 60);
        assert_eq!(record.record_type, RecordType::AAAA);
        assert_eq!(record.data.len(), 16);
        assert_eq!(record.ip(), Some(IpAddr::from_str("2001:db8::1").unwrap()));
    }

    #[test]
    fn test_alias_record_uses_sentinel_owner() {
        let record = ResourceRecord::alias("b.example.", 30);
        assert!(record.is_alias());
        assert_eq!(record.owner_name(), None);
        assert_eq!(record.target(), Some("b.example"));
        assert_eq!(record.ip(), None);
    }
}
