//! glibc NSS `hosts` entry points.
//!
//! Every call ignores SIGPIPE for its duration, catches panics before they
//! cross the FFI boundary, and reports errno and h_errno per
//! [`Outcome::from_error`].

use crate::marshal::{write_addrtuples, write_hostent, GaihAddrTuple};
use crate::resolv;
use crate::resolver;
use crate::signal::SigpipeGuard;
use crate::status::{NssStatus, Outcome};
use harddns_application::use_cases::{LookupRequest, Resolution};
use harddns_domain::{AddressFamily, DomainError};
use libc::{c_char, c_int, hostent, size_t};
use std::ffi::CStr;
use std::panic::{self, AssertUnwindSafe};
use std::{ptr, slice};
use tracing::{error, info};

fn guarded(
    errnop: *mut c_int,
    h_errnop: *mut c_int,
    lookup: impl FnOnce() -> Result<(), DomainError>,
) -> NssStatus {
    let _sigpipe = SigpipeGuard::install();

    let outcome = match panic::catch_unwind(AssertUnwindSafe(lookup)) {
        Ok(Ok(())) => Outcome::SUCCESS,
        Ok(Err(e)) => Outcome::from_error(&e),
        Err(_) => {
            error!("Resolver panicked, reporting try-again");
            Outcome::TRY_AGAIN
        }
    };

    // SAFETY: out-parameters supplied by glibc for this call.
    unsafe { outcome.report(errnop, h_errnop) };
    outcome.status
}

/// # Safety
/// `name` must be null or a valid NUL-terminated string.
unsafe fn query_name<'a>(name: *const c_char) -> Result<&'a str, DomainError> {
    if name.is_null() {
        return Err(DomainError::InvalidDomainName(String::new()));
    }
    // SAFETY: per the function contract.
    let name = unsafe { CStr::from_ptr(name) };
    name.to_str()
        .map_err(|_| DomainError::InvalidDomainName(name.to_string_lossy().into_owned()))
}

/// # Safety
/// `buffer` must be null or valid for writes of `buflen` bytes.
unsafe fn caller_buffer<'a>(buffer: *mut c_char, buflen: size_t) -> &'a mut [u8] {
    if buffer.is_null() {
        return &mut [];
    }
    // SAFETY: per the function contract.
    unsafe { slice::from_raw_parts_mut(buffer.cast::<u8>(), buflen) }
}

fn family_for(af: c_int) -> Result<AddressFamily, DomainError> {
    match af {
        libc::AF_INET => Ok(AddressFamily::V4),
        libc::AF_INET6 => Ok(AddressFamily::V6),
        other => Err(DomainError::UnsupportedFamily(other)),
    }
}

fn clamp_ttl(ttl: u32) -> i32 {
    i32::try_from(ttl).unwrap_or(i32::MAX)
}

fn resolve(name: &str, family: AddressFamily) -> Result<Resolution, DomainError> {
    let resolver = resolver::global()?;
    let request =
        LookupRequest::new(name, family).with_resolver_inet6(resolv::inet6_requested());
    let resolution = resolver.resolve(&request)?;
    info!(
        name,
        family = %family,
        canonical = %resolution.canonical_name,
        addresses = resolution.address_count(),
        ttl = resolution.ttl,
        "Resolved"
    );
    Ok(resolution)
}

unsafe fn fill_hostent(
    name: *const c_char,
    af: c_int,
    result: *mut hostent,
    buffer: *mut c_char,
    buflen: size_t,
    ttlp: *mut i32,
    canonp: *mut *mut c_char,
) -> Result<(), DomainError> {
    let family = family_for(af)?;
    // SAFETY: glibc passes a NUL-terminated name.
    let name = unsafe { query_name(name)? };
    let resolution = resolve(name, family)?;

    // SAFETY: glibc passes a `result` it owns for the duration of the call.
    let Some(result) = (unsafe { result.as_mut() }) else {
        return Err(DomainError::BufferTooSmall {
            needed: std::mem::size_of::<hostent>(),
            available: 0,
        });
    };
    // SAFETY: glibc passes `buflen` writable bytes at `buffer`.
    let buf = unsafe { caller_buffer(buffer, buflen) };
    let image = write_hostent(&resolution, family, buf)?;

    let base = buffer.cast::<u8>();
    // SAFETY: every offset in `image` lies inside the buffer just written.
    unsafe {
        result.h_name = base.add(image.name).cast();
        result.h_aliases = base.add(image.aliases).cast();
        result.h_addrtype = image.addr_type;
        result.h_length = image.addr_len;
        result.h_addr_list = base.add(image.addr_list).cast();

        if !ttlp.is_null() {
            *ttlp = clamp_ttl(resolution.ttl);
        }
        if !canonp.is_null() {
            *canonp = result.h_name;
        }
    }
    Ok(())
}

unsafe fn fill_addrtuples(
    name: *const c_char,
    pat: *mut *mut GaihAddrTuple,
    buffer: *mut c_char,
    buflen: size_t,
    ttlp: *mut i32,
) -> Result<(), DomainError> {
    // SAFETY: glibc passes a NUL-terminated name.
    let name = unsafe { query_name(name)? };
    if pat.is_null() {
        return Err(DomainError::BufferTooSmall {
            needed: std::mem::size_of::<*mut GaihAddrTuple>(),
            available: 0,
        });
    }
    let resolution = resolve(name, AddressFamily::Both)?;

    // SAFETY: glibc passes `buflen` writable bytes at `buffer`.
    let buf = unsafe { caller_buffer(buffer, buflen) };
    let image = write_addrtuples(&resolution, buf)?;

    // SAFETY: `image.head` is the offset of a tuple written above; `pat` is
    // non-null and, when `*pat` is set, it points at a caller-owned tuple.
    unsafe {
        let head = buffer.cast::<u8>().add(image.head).cast::<GaihAddrTuple>();
        if (*pat).is_null() {
            *pat = head;
        } else {
            ptr::copy_nonoverlapping(head, *pat, 1);
        }
        if !ttlp.is_null() {
            *ttlp = clamp_ttl(resolution.ttl);
        }
    }
    Ok(())
}

/// # Safety
/// Called by glibc with the `gethostbyname3_r` NSS contract.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn _nss_harddns_gethostbyname3_r(
    name: *const c_char,
    af: c_int,
    result: *mut hostent,
    buffer: *mut c_char,
    buflen: size_t,
    errnop: *mut c_int,
    h_errnop: *mut c_int,
    ttlp: *mut i32,
    canonp: *mut *mut c_char,
) -> NssStatus {
    guarded(errnop, h_errnop, || unsafe {
        fill_hostent(name, af, result, buffer, buflen, ttlp, canonp)
    })
}

/// # Safety
/// Called by glibc with the `gethostbyname2_r` NSS contract.
#[no_mangle]
pub unsafe extern "C" fn _nss_harddns_gethostbyname2_r(
    name: *const c_char,
    af: c_int,
    result: *mut hostent,
    buffer: *mut c_char,
    buflen: size_t,
    errnop: *mut c_int,
    h_errnop: *mut c_int,
) -> NssStatus {
    unsafe {
        _nss_harddns_gethostbyname3_r(
            name,
            af,
            result,
            buffer,
            buflen,
            errnop,
            h_errnop,
            ptr::null_mut(),
            ptr::null_mut(),
        )
    }
}

/// Family follows the resolver's `inet6` option.
///
/// # Safety
/// Called by glibc with the `gethostbyname_r` NSS contract.
#[no_mangle]
pub unsafe extern "C" fn _nss_harddns_gethostbyname_r(
    name: *const c_char,
    result: *mut hostent,
    buffer: *mut c_char,
    buflen: size_t,
    errnop: *mut c_int,
    h_errnop: *mut c_int,
) -> NssStatus {
    let af = if resolv::inet6_requested() {
        libc::AF_INET6
    } else {
        libc::AF_INET
    };
    unsafe {
        _nss_harddns_gethostbyname3_r(
            name,
            af,
            result,
            buffer,
            buflen,
            errnop,
            h_errnop,
            ptr::null_mut(),
            ptr::null_mut(),
        )
    }
}

/// # Safety
/// Called by glibc with the `gethostbyname4_r` NSS contract.
#[no_mangle]
pub unsafe extern "C" fn _nss_harddns_gethostbyname4_r(
    name: *const c_char,
    pat: *mut *mut GaihAddrTuple,
    buffer: *mut c_char,
    buflen: size_t,
    errnop: *mut c_int,
    h_errnop: *mut c_int,
    ttlp: *mut i32,
) -> NssStatus {
    guarded(errnop, h_errnop, || unsafe {
        fill_addrtuples(name, pat, buffer, buflen, ttlp)
    })
}
