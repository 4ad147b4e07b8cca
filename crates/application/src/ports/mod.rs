pub mod dns_transport;
pub mod dns_upstream;

pub use dns_transport::{DnsTransport, SessionState};
pub use dns_upstream::{DnsUpstream, UpstreamAnswer, UpstreamHandle};
