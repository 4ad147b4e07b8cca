use super::{RecordOwner, RecordType, ResourceRecord};
use crate::family::AddressFamily;
use std::collections::HashSet;

/// Records collected across all hops of one resolution.
///
/// Keyed by owner, type and data: a record seen twice (the same CNAME comes
/// back for both the A and the AAAA question) is kept once, at the position
/// of its first insertion. Iteration order is insertion order.
#[derive(Debug, Clone, Default)]
pub struct ResourceRecordSet {
    records: Vec<ResourceRecord>,
    seen: HashSet<(RecordOwner, RecordType, Vec<u8>)>,
}

impl ResourceRecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if an identical record was already present.
    pub fn insert(&mut self, record: ResourceRecord) -> bool {
        let key = (
            record.owner.clone(),
            record.record_type,
            record.data.clone(),
        );
        if !self.seen.insert(key) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = ResourceRecord>) {
        for record in records {
            self.insert(record);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.records.iter()
    }

    pub fn aliases(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.records.iter().filter(|r| r.is_alias())
    }

    /// Target of the alias record at `ordinal` among all alias records.
    pub fn alias_at(&self, ordinal: usize) -> Option<&str> {
        self.aliases().nth(ordinal).and_then(|r| r.target())
    }

    pub fn addresses(&self, family: AddressFamily) -> impl Iterator<Item = &ResourceRecord> {
        self.records
            .iter()
            .filter(move |r| !r.is_alias() && family.matches(r.record_type))
    }

    pub fn address_count(&self, family: AddressFamily) -> usize {
        self.addresses(family).count()
    }

    /// Minimum TTL over the address records answering `family`.
    pub fn min_ttl(&self, family: AddressFamily) -> Option<u32> {
        self.addresses(family).map(|r| r.ttl).min()
    }

    pub fn first_address_owner(&self, family: AddressFamily) -> Option<&str> {
        self.addresses(family).find_map(|r| r.owner_name())
    }
}

impl<'a> IntoIterator for &'a ResourceRecordSet {
    type Item = &'a ResourceRecord;
    type IntoIter = std::slice::Iter<'a, ResourceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;
    use std::str::FromStr;

    fn a(owner: &str, ip: &str, ttl: u32) -> ResourceRecord {
        ResourceRecord::address(owner, IpAddr::from_str(ip).unwrap(), ttl)
    }

    #[test]
    fn test_duplicate_records_are_kept_once() {
        let mut set = ResourceRecordSet::new();
        assert!(set.insert(ResourceRecord::alias("b.example", 60)));
        assert!(!set.insert(ResourceRecord::alias("b.example", 60)));
        assert!(set.insert(a("b.example", "192.0.2.1", 120)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_alias_ordinal_lookup() {
        let mut set = ResourceRecordSet::new();
        set.insert(ResourceRecord::alias("b.example", 60));
        set.insert(a("x.example", "192.0.2.9", 10));
        set.insert(ResourceRecord::alias("c.example", 60));

        assert_eq!(set.alias_at(0), Some("b.example"));
        assert_eq!(set.alias_at(1), Some("c.example"));
        assert_eq!(set.alias_at(2), None);
    }

    #[test]
    fn test_min_ttl_ignores_other_family_and_aliases() {
        let mut set = ResourceRecordSet::new();
        set.insert(ResourceRecord::alias("b.example", 5));
        set.insert(a("b.example", "192.0.2.1", 300));
        set.insert(a("b.example", "192.0.2.2", 120));
        set.insert(a("b.example", "2001:db8::1", 7));

        assert_eq!(set.min_ttl(AddressFamily::V4), Some(120));
        assert_eq!(set.min_ttl(AddressFamily::V6), Some(7));
        assert_eq!(set.min_ttl(AddressFamily::Both), Some(7));
        assert_eq!(set.address_count(AddressFamily::V4), 2);
    }

    #[test]
    fn test_iteration_is_insertion_order() {
        let mut set = ResourceRecordSet::new();
        set.insert(a("h.example", "192.0.2.3", 1));
        set.insert(a("h.example", "192.0.2.1", 1));
        set.insert(a("h.example", "192.0.2.2", 1));

        let order: Vec<u8> = set.iter().map(|r| r.data[3]).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }
}
