//! harddns domain layer
pub mod config;
pub mod dns_query;
pub mod dns_record;
pub mod errors;
pub mod family;

pub use config::{Config, ConfigError, InternalDomains, LoggingConfig, ResolverConfig, UpstreamConfig};
pub use dns_query::DnsQuery;
pub use dns_record::{RecordOwner, RecordType, ResourceRecord, ResourceRecordSet};
pub use errors::DomainError;
pub use family::AddressFamily;
