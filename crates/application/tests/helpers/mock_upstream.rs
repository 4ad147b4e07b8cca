#![allow(dead_code)]

use harddns_application::ports::{DnsUpstream, UpstreamAnswer};
use harddns_domain::{DnsQuery, DomainError, RecordType, ResourceRecord};
use std::collections::HashMap;
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn a(owner: &str, ip: &str, ttl: u32) -> ResourceRecord {
    ResourceRecord::address(owner, IpAddr::from_str(ip).unwrap(), ttl)
}

pub fn aaaa(owner: &str, ip: &str, ttl: u32) -> ResourceRecord {
    a(owner, ip, ttl)
}

pub fn cname(target: &str, ttl: u32) -> ResourceRecord {
    ResourceRecord::alias(target, ttl)
}

type Script = HashMap<(String, RecordType), Result<Vec<ResourceRecord>, DomainError>>;

// ============================================================================
// Scripted DnsUpstream
// ============================================================================

/// Answers from a fixed script and records every question asked.
/// Unscripted questions get an empty answer.
#[derive(Clone, Default)]
pub struct MockUpstream {
    script: Arc<Mutex<Script>>,
    queries: Arc<Mutex<Vec<(String, RecordType)>>>,
    ready_error: Arc<Mutex<Option<DomainError>>>,
    in_flight: Arc<AtomicBool>,
    overlap_detected: Arc<AtomicBool>,
    delay: Option<Duration>,
}

impl MockUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, name: &str, qtype: RecordType, records: Vec<ResourceRecord>) -> Self {
        self.script
            .lock()
            .unwrap()
            .insert((name.to_string(), qtype), Ok(records));
        self
    }

    pub fn fail(self, name: &str, qtype: RecordType, error: DomainError) -> Self {
        self.script
            .lock()
            .unwrap()
            .insert((name.to_string(), qtype), Err(error));
        self
    }

    pub fn fail_ready(self, error: DomainError) -> Self {
        *self.ready_error.lock().unwrap() = Some(error);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn queries(&self) -> Vec<(String, RecordType)> {
        self.queries.lock().unwrap().clone()
    }

    pub fn count(&self, qtype: RecordType) -> usize {
        self.queries().iter().filter(|(_, t)| *t == qtype).count()
    }

    pub fn overlap_detected(&self) -> bool {
        self.overlap_detected.load(Ordering::SeqCst)
    }
}

impl DnsUpstream for MockUpstream {
    fn ensure_ready(&mut self, _name: &str) -> Result<(), DomainError> {
        match self.ready_error.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn query(&mut self, query: &DnsQuery) -> Result<UpstreamAnswer, DomainError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.overlap_detected.store(true, Ordering::SeqCst);
        }
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        let key = (query.domain.to_string(), query.record_type);
        self.queries.lock().unwrap().push(key.clone());
        let result = match self.script.lock().unwrap().get(&key) {
            Some(Ok(records)) => Ok(UpstreamAnswer::new(records.clone(), "{}")),
            Some(Err(e)) => Err(e.clone()),
            None => Ok(UpstreamAnswer::default()),
        };

        self.in_flight.store(false, Ordering::SeqCst);
        result
    }
}
