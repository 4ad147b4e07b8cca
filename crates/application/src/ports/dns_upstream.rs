use bytes::Bytes;
use harddns_domain::{DnsQuery, DomainError, ResourceRecord};
use std::sync::{Mutex, MutexGuard};

/// Typed answer of one upstream query.
#[derive(Debug, Clone, Default)]
pub struct UpstreamAnswer {
    pub records: Vec<ResourceRecord>,
    /// Raw upstream payload, kept for diagnostics.
    pub raw: Bytes,
}

impl UpstreamAnswer {
    pub fn new(records: Vec<ResourceRecord>, raw: impl Into<Bytes>) -> Self {
        Self {
            records,
            raw: raw.into(),
        }
    }

    /// Printable form of the raw payload for request logging.
    pub fn raw_text(&self) -> String {
        String::from_utf8_lossy(&self.raw).into_owned()
    }
}

/// Query side of a DNS upstream: the DoH codec over its pinned transport.
///
/// Implementations hold a single session and are not safe for interleaved
/// use; callers go through [`UpstreamHandle`].
pub trait DnsUpstream: Send {
    /// Make sure the upstream that will serve `name` is reachable, opening
    /// and validating a session if none is established.
    fn ensure_ready(&mut self, name: &str) -> Result<(), DomainError>;

    fn query(&mut self, query: &DnsQuery) -> Result<UpstreamAnswer, DomainError>;
}

/// Process-wide upstream, serialized behind one lock.
///
/// The lock is held for a whole resolution, all hops included, so requests
/// and responses of concurrent callers never interleave on the session.
pub struct UpstreamHandle {
    inner: Mutex<Box<dyn DnsUpstream>>,
}

impl UpstreamHandle {
    pub fn new(upstream: impl DnsUpstream + 'static) -> Self {
        Self {
            inner: Mutex::new(Box::new(upstream)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, Box<dyn DnsUpstream>> {
        // Poisoned by a panicking caller; the session itself is still usable.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for UpstreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamHandle").finish_non_exhaustive()
    }
}
