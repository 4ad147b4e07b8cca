#![allow(dead_code)]

use harddns_application::ports::{DnsUpstream, UpstreamAnswer};
use harddns_application::use_cases::Resolution;
use harddns_domain::{
    AddressFamily, DnsQuery, DomainError, RecordType, ResourceRecord, ResourceRecordSet,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Pointer-aligned scratch buffer standing in for the caller's buffer.
#[repr(C, align(16))]
pub struct CallerBuffer(pub [u8; 512]);

impl CallerBuffer {
    pub fn filled(byte: u8) -> Self {
        Self([byte; 512])
    }
}

pub fn a(owner: &str, ip: &str, ttl: u32) -> ResourceRecord {
    ResourceRecord::address(owner, ip.parse().unwrap(), ttl)
}

pub fn aaaa(owner: &str, ip: &str, ttl: u32) -> ResourceRecord {
    ResourceRecord::address(owner, ip.parse().unwrap(), ttl)
}

pub fn cname(target: &str, ttl: u32) -> ResourceRecord {
    ResourceRecord::alias(target, ttl)
}

pub fn resolution(
    canonical_name: &str,
    family: AddressFamily,
    records: Vec<ResourceRecord>,
) -> Resolution {
    let mut set = ResourceRecordSet::new();
    set.extend(records);
    let ttl = set.min_ttl(family).unwrap_or_default();
    Resolution {
        canonical_name: canonical_name.to_string(),
        family,
        records: set,
        ttl,
    }
}

/// Read a native-endian pointer stored at `offset` and turn it back into an
/// offset relative to `buf`.
pub fn pointer_at(buf: &[u8], offset: usize) -> Option<usize> {
    let width = std::mem::size_of::<usize>();
    let mut raw = [0u8; std::mem::size_of::<usize>()];
    raw.copy_from_slice(&buf[offset..offset + width]);
    let value = usize::from_ne_bytes(raw);
    if value == 0 {
        None
    } else {
        Some(value - buf.as_ptr() as usize)
    }
}

pub fn cstr_at(buf: &[u8], offset: usize) -> &str {
    let end = buf[offset..].iter().position(|b| *b == 0).unwrap();
    std::str::from_utf8(&buf[offset..offset + end]).unwrap()
}

/// Upstream answering from a fixed table and recording what it was asked.
#[derive(Clone, Default)]
pub struct TableUpstream {
    answers: HashMap<(String, RecordType), Vec<ResourceRecord>>,
    ready_error: Option<DomainError>,
    asked: Arc<Mutex<Vec<(String, RecordType)>>>,
}

impl TableUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, name: &str, qtype: RecordType, records: Vec<ResourceRecord>) -> Self {
        self.answers.insert((name.to_string(), qtype), records);
        self
    }

    pub fn unreachable(mut self, error: DomainError) -> Self {
        self.ready_error = Some(error);
        self
    }

    pub fn asked(&self) -> Vec<(String, RecordType)> {
        self.asked.lock().unwrap().clone()
    }
}

impl DnsUpstream for TableUpstream {
    fn ensure_ready(&mut self, _name: &str) -> Result<(), DomainError> {
        match &self.ready_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn query(&mut self, query: &DnsQuery) -> Result<UpstreamAnswer, DomainError> {
        let key = (query.domain.to_string(), query.record_type);
        self.asked.lock().unwrap().push(key.clone());
        let records = self.answers.get(&key).cloned().unwrap_or_default();
        Ok(UpstreamAnswer::new(records, "{}"))
    }
}
