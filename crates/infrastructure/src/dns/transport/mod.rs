pub mod pins;
pub mod tls;
pub mod trust;
pub mod udp;

pub use harddns_application::ports::{DnsTransport, SessionState};
pub use pins::PinnedKeySet;
pub use tls::{PinnedTlsTransport, TlsIdentity};
pub use trust::load_trust_store;
pub use udp::UdpTransport;

/// Sleep quantum of the non-blocking send/receive loops.
pub const WAIT_QUANTUM: std::time::Duration = std::time::Duration::from_millis(10);
