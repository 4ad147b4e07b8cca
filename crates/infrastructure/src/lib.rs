//! harddns infrastructure: pinned TLS transport, DoH codec and the upstream
//! client built on them.
pub mod dns;

pub use dns::client::{DohClient, UpstreamSlot};
