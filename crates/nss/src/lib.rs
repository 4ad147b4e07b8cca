//! glibc NSS `hosts` module resolving names over pinned DNS-over-HTTPS.
//!
//! Built as `libnss_harddns.so.2`; the exported `_nss_harddns_*` symbols are
//! the whole C surface. The rlib exposes the marshaller and the resolver for
//! tests and the diagnostic CLI.

mod entry;
mod logging;
mod resolv;
mod signal;

pub mod marshal;
pub mod resolver;
pub mod status;

pub use entry::{
    _nss_harddns_gethostbyname2_r, _nss_harddns_gethostbyname3_r,
    _nss_harddns_gethostbyname4_r, _nss_harddns_gethostbyname_r,
};
pub use marshal::{write_addrtuples, write_hostent, AddrTupleImage, GaihAddrTuple, HostentImage};
pub use resolver::NssResolver;
pub use status::{NssStatus, Outcome};
