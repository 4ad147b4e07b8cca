use crate::ports::{DnsUpstream, UpstreamAnswer, UpstreamHandle};
use harddns_domain::dns_record::record::normalize_name;
use harddns_domain::{AddressFamily, DnsQuery, DomainError, RecordType, ResourceRecordSet};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Upper bound on alias indirections followed for one lookup.
pub const MAX_HOPS: usize = 5;

/// Process-wide knobs, taken from configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolutionPolicy {
    /// Ask for AAAA on every hop regardless of the requested family.
    pub query_aaaa: bool,
    /// Log every query with the raw upstream reply.
    pub log_requests: bool,
}

/// One lookup as requested by a caller.
#[derive(Debug, Clone)]
pub struct LookupRequest {
    pub name: String,
    pub family: AddressFamily,
    /// The system resolver configuration asks for IPv6 results.
    pub resolver_inet6: bool,
}

impl LookupRequest {
    pub fn new(name: impl Into<String>, family: AddressFamily) -> Self {
        Self {
            name: name.into(),
            family,
            resolver_inet6: false,
        }
    }

    pub fn with_resolver_inet6(mut self, inet6: bool) -> Self {
        self.resolver_inet6 = inet6;
        self
    }
}

/// Outcome of a successful lookup.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Owner of the first matching address record, else the last name queried.
    pub canonical_name: String,
    pub family: AddressFamily,
    /// Every record collected across all hops.
    pub records: ResourceRecordSet,
    /// Minimum TTL over the address records answering `family`.
    pub ttl: u32,
}

impl Resolution {
    pub fn address_count(&self) -> usize {
        self.records.address_count(self.family)
    }

    pub fn alias_names(&self) -> Vec<&str> {
        self.records.aliases().filter_map(|r| r.target()).collect()
    }
}

/// Follows CNAME chains against the upstream until address records of the
/// requested family show up, the chain ends, or [`MAX_HOPS`] is reached.
///
/// Only the alias whose ordinal position among all collected aliases equals
/// the current hop index may extend the chain. A name is never queried twice
/// within one lookup.
pub struct ResolveHostUseCase {
    policy: ResolutionPolicy,
}

impl ResolveHostUseCase {
    pub fn new(policy: ResolutionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ResolutionPolicy {
        self.policy
    }

    pub fn execute(
        &self,
        upstream: &UpstreamHandle,
        request: &LookupRequest,
    ) -> Result<Resolution, DomainError> {
        let query_name = normalize_name(&request.name);
        if query_name.is_empty() {
            return Err(DomainError::NotFound(request.name.clone()));
        }

        let family = request.family;
        let wants_v6 =
            family == AddressFamily::V6 || request.resolver_inet6 || self.policy.query_aaaa;

        let mut records = ResourceRecordSet::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut name = query_name.clone();
        let mut last_queried = query_name.clone();

        {
            let mut guard = upstream.lock();
            let session: &mut dyn DnsUpstream = &mut **guard;

            session.ensure_ready(&query_name).map_err(|e| {
                warn!(name = %query_name, error = %e, "Upstream unavailable");
                e
            })?;

            for hop in 0..MAX_HOPS {
                visited.insert(name.clone());
                last_queried = name.clone();

                let mut found = self.ask(session, &name, RecordType::A, family, &mut records)?;
                if wants_v6 {
                    found |= self.ask(session, &name, RecordType::AAAA, family, &mut records)?;
                }
                if found {
                    break;
                }

                match records.alias_at(hop) {
                    None | Some("") => break,
                    Some(next) if visited.contains(next) => {
                        debug!(name = %name, alias = %next, "Alias chain loops, stopping");
                        break;
                    }
                    Some(next) => {
                        debug!(hop, from = %name, to = %next, "Following alias");
                        name = next.to_string();
                    }
                }
            }
        }

        if records.address_count(family) == 0 {
            debug!(name = %query_name, family = %family, "No address records");
            return Err(DomainError::NotFound(query_name));
        }

        let ttl = records.min_ttl(family).unwrap_or_default();
        let canonical_name = records
            .first_address_owner(family)
            .map(str::to_string)
            .unwrap_or(last_queried);

        Ok(Resolution {
            canonical_name,
            family,
            records,
            ttl,
        })
    }

    /// One question to the upstream; true if it produced an address record
    /// of the requested family.
    fn ask(
        &self,
        session: &mut dyn DnsUpstream,
        name: &str,
        record_type: RecordType,
        family: AddressFamily,
        records: &mut ResourceRecordSet,
    ) -> Result<bool, DomainError> {
        let query = DnsQuery::new(name, record_type);
        let answer: UpstreamAnswer = match session.query(&query) {
            Ok(answer) => answer,
            Err(e) => {
                warn!(name = %name, qtype = %record_type, error = %e, "Upstream query failed");
                return Err(e);
            }
        };

        if self.policy.log_requests {
            info!("nss {} {}? -> {}", name, record_type, answer.raw_text());
        }

        let found = answer
            .records
            .iter()
            .any(|r| r.record_type == record_type && family.matches(r.record_type));
        records.extend(answer.records);
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_request_builder() {
        let request = LookupRequest::new("a.example", AddressFamily::V4).with_resolver_inet6(true);
        assert!(request.resolver_inet6);
        assert_eq!(request.family, AddressFamily::V4);
    }

    #[test]
    fn test_policy_defaults_off() {
        let policy = ResolutionPolicy::default();
        assert!(!policy.query_aaaa);
        assert!(!policy.log_requests);
    }
}
