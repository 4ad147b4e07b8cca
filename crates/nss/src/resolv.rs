//! Read-only peek at the thread's resolver options (`_res.options`).

use libc::{c_int, c_ulong};

/// `RES_USE_INET6` from resolv.h.
pub const RES_USE_INET6: c_ulong = 0x0000_2000;

/// Leading fields of glibc's `struct __res_state`; only `options` is read.
#[repr(C)]
struct ResStatePrefix {
    retrans: c_int,
    retry: c_int,
    options: c_ulong,
}

#[cfg(all(target_os = "linux", target_env = "gnu"))]
extern "C" {
    fn __res_state() -> *mut ResStatePrefix;
}

/// Whether the resolver configuration asks for IPv6 results
/// (`options inet6` in resolv.conf or `RES_OPTIONS`).
#[cfg(all(target_os = "linux", target_env = "gnu"))]
pub fn inet6_requested() -> bool {
    // SAFETY: glibc returns the calling thread's resolver state, which lives
    // as long as the thread.
    let state = unsafe { __res_state() };
    if state.is_null() {
        return false;
    }
    // SAFETY: non-null and points at a live `struct __res_state`.
    let options = unsafe { (*state).options };
    options & RES_USE_INET6 != 0
}

#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
pub fn inet6_requested() -> bool {
    false
}
