//! DoH upstream client: the codec over one pinned TLS session per upstream,
//! with in-order failover and plain-UDP forwarding for internal domains.

use super::forwarding::{DohCodec, MessageBuilder, ResponseParser};
use super::transport::tls::client_config;
use super::transport::{load_trust_store, PinnedKeySet, PinnedTlsTransport, TlsIdentity, UdpTransport};
use harddns_application::ports::{DnsTransport, DnsUpstream, UpstreamAnswer};
use harddns_domain::{Config, DnsQuery, DomainError, InternalDomains, UpstreamConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One configured upstream with its codec and transport.
pub struct UpstreamSlot {
    config: UpstreamConfig,
    codec: DohCodec,
    transport: Box<dyn DnsTransport>,
}

impl UpstreamSlot {
    pub fn new(config: UpstreamConfig, transport: Box<dyn DnsTransport>) -> Self {
        Self {
            codec: DohCodec::for_upstream(&config),
            config,
            transport,
        }
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    pub fn transport_mut(&mut self) -> &mut dyn DnsTransport {
        self.transport.as_mut()
    }
}

pub struct DohClient {
    slots: Vec<UpstreamSlot>,
    /// Slot holding the established session, if any.
    active: Option<usize>,
    /// Where the next connection attempt starts.
    next: usize,
    timeout: Duration,
    internal_domains: InternalDomains,
}

impl DohClient {
    pub fn new(slots: Vec<UpstreamSlot>, timeout: Duration) -> Self {
        Self {
            slots,
            active: None,
            next: 0,
            timeout,
            internal_domains: InternalDomains::default(),
        }
    }

    pub fn with_internal_domains(mut self, internal_domains: InternalDomains) -> Self {
        self.internal_domains = internal_domains;
        self
    }

    /// Build pinned TLS transports for every configured upstream.
    pub fn from_config(config: &Config) -> Result<Self, DomainError> {
        config.validate()?;
        let roots = Arc::new(load_trust_store(&config.resolver.trust_store)?);
        let tls_config = client_config(roots)?;
        let timeout = config.resolver.timeout();

        let mut slots = Vec::with_capacity(config.upstreams.len());
        for upstream in &config.upstreams {
            let pins = PinnedKeySet::for_upstream(upstream)?;
            let transport = PinnedTlsTransport::new(
                TlsIdentity::for_upstream(upstream),
                pins,
                Arc::clone(&tls_config),
                timeout,
            );
            slots.push(UpstreamSlot::new(upstream.clone(), Box::new(transport)));
        }

        info!(
            upstreams = slots.len(),
            internal_domains = config.internal_domains.0.len(),
            "DoH client configured"
        );
        Ok(Self::new(slots, timeout).with_internal_domains(config.internal_domains.clone()))
    }

    pub fn slots_mut(&mut self) -> &mut [UpstreamSlot] {
        &mut self.slots
    }

    /// Label of the upstream holding the current session.
    pub fn active_upstream(&self) -> Option<&str> {
        self.active
            .and_then(|index| self.slots.get(index))
            .map(|slot| slot.config.label())
    }

    /// Reuse the established session or connect the first upstream that
    /// accepts, starting after the last one that failed.
    fn connect_any(&mut self) -> Result<usize, DomainError> {
        if let Some(index) = self.active {
            if self.slots[index].transport.is_connected() {
                return Ok(index);
            }
            self.active = None;
        }

        let count = self.slots.len();
        if count == 0 {
            return Err(DomainError::NotConnected);
        }

        let mut last_error = DomainError::NotConnected;
        for step in 0..count {
            let index = (self.next + step) % count;
            let slot = &mut self.slots[index];
            match slot.transport.connect(&slot.config.ip, slot.config.port) {
                Ok(()) => {
                    debug!(upstream = slot.config.label(), "Upstream session ready");
                    self.active = Some(index);
                    self.next = index;
                    return Ok(index);
                }
                Err(e) => {
                    warn!(upstream = slot.config.label(), error = %e, "Upstream unreachable");
                    last_error = e;
                }
            }
        }
        self.next = (self.next + 1) % count;
        Err(last_error)
    }

    fn query_doh(&mut self, query: &DnsQuery) -> Result<UpstreamAnswer, DomainError> {
        let index = self.connect_any()?;
        let timeout = self.timeout;
        let slot = &mut self.slots[index];

        match slot.codec.exchange(slot.transport.as_mut(), query, timeout) {
            Ok(answer) => {
                if !slot.transport.is_connected() {
                    self.active = None;
                }
                Ok(answer)
            }
            Err(e) => {
                warn!(
                    upstream = slot.config.label(),
                    name = %query.domain,
                    record_type = %query.record_type,
                    error = %e,
                    "DoH exchange failed, closing session"
                );
                slot.transport.close();
                self.active = None;
                self.next = (index + 1) % self.slots.len();
                Err(e)
            }
        }
    }

    fn query_internal(
        &self,
        server: SocketAddr,
        query: &DnsQuery,
    ) -> Result<UpstreamAnswer, DomainError> {
        let (id, wire) = MessageBuilder::build_query_with_id(&query.domain, &query.record_type)?;
        let reply = UdpTransport::new(server).exchange(&wire, self.timeout)?;
        let parsed = ResponseParser::parse_bytes(reply)?;

        if parsed.id != id {
            return Err(DomainError::InvalidDnsResponse(format!(
                "reply ID {} does not match query ID {}",
                parsed.id, id
            )));
        }
        if parsed.is_server_error() {
            return Err(DomainError::InvalidDnsResponse(format!(
                "{} answered {}",
                server,
                ResponseParser::rcode_to_status(parsed.rcode)
            )));
        }
        debug!(server = %server, name = %query.domain, records = parsed.records.len(), "Internal domain answered");
        Ok(UpstreamAnswer::new(parsed.records, parsed.summary))
    }
}

impl DnsUpstream for DohClient {
    fn ensure_ready(&mut self, name: &str) -> Result<(), DomainError> {
        if self.internal_domains.server_for(name).is_some() {
            return Ok(());
        }
        self.connect_any().map(|_| ())
    }

    fn query(&mut self, query: &DnsQuery) -> Result<UpstreamAnswer, DomainError> {
        match self.internal_domains.server_for(&query.domain) {
            Some(server) => self.query_internal(server, query),
            None => self.query_doh(query),
        }
    }
}
