use harddns_domain::DomainError;
use libc::c_int;

/// `enum nss_status` from glibc's nss.h.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NssStatus {
    TryAgain = -2,
    Unavail = -1,
    NotFound = 0,
    Success = 1,
    Return = 2,
}

// netdb.h h_errno values
pub const NETDB_INTERNAL: c_int = -1;
pub const NETDB_SUCCESS: c_int = 0;
pub const HOST_NOT_FOUND: c_int = 1;
pub const TRY_AGAIN: c_int = 2;
pub const NO_RECOVERY: c_int = 3;

/// Status triple reported back through an entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub status: NssStatus,
    pub errno: c_int,
    pub h_errno: c_int,
}

impl Outcome {
    pub const SUCCESS: Outcome = Outcome {
        status: NssStatus::Success,
        errno: 0,
        h_errno: NETDB_SUCCESS,
    };

    pub const TRY_AGAIN: Outcome = Outcome {
        status: NssStatus::TryAgain,
        errno: libc::EAGAIN,
        h_errno: TRY_AGAIN,
    };

    pub fn from_error(error: &DomainError) -> Self {
        match error {
            DomainError::NotFound(_) | DomainError::InvalidDomainName(_) => Outcome {
                status: NssStatus::NotFound,
                errno: libc::ENOENT,
                h_errno: HOST_NOT_FOUND,
            },
            DomainError::BufferTooSmall { .. } => Outcome {
                status: NssStatus::TryAgain,
                errno: libc::ERANGE,
                h_errno: NETDB_INTERNAL,
            },
            // Bad family and missing configuration are retryable too.
            _ => Outcome::TRY_AGAIN,
        }
    }

    /// Store errno and h_errno through the caller's out pointers.
    ///
    /// # Safety
    /// Each pointer must be null or valid for a write of one `c_int`.
    pub unsafe fn report(&self, errnop: *mut c_int, h_errnop: *mut c_int) {
        if !errnop.is_null() {
            // SAFETY: caller-provided out-parameter pointer.
            unsafe { *errnop = self.errno };
        }
        if !h_errnop.is_null() {
            // SAFETY: caller-provided out-parameter pointer.
            unsafe { *h_errnop = self.h_errno };
        }
    }
}
