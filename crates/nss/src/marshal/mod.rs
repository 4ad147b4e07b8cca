//! Result marshalling into caller-owned buffers.
//!
//! Every writer runs in two phases: the exact size is computed first and
//! checked against the buffer, and only then are bytes written. A buffer that
//! is too small is left untouched. Pointers stored in the buffer are absolute
//! addresses (buffer base + offset) in native byte order.

pub mod addrtuple;
pub mod arena;
pub mod hostent;

pub use addrtuple::{write_addrtuples, AddrTupleImage, GaihAddrTuple};
pub use arena::Arena;
pub use hostent::{write_hostent, HostentImage};

pub const POINTER_SIZE: usize = std::mem::size_of::<usize>();

/// Round `len` up to the next multiple of the pointer size.
pub const fn align(len: usize) -> usize {
    (len + POINTER_SIZE - 1) & !(POINTER_SIZE - 1)
}

/// Bytes to skip so that `base + pad` is pointer aligned.
pub fn leading_pad(base: *const u8) -> usize {
    base.align_offset(POINTER_SIZE)
}
