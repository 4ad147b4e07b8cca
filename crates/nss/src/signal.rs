use std::mem;
use std::ptr;

/// Ignores SIGPIPE while alive and restores the previous disposition on
/// drop. Writes to a socket the peer already closed must not kill the
/// host process.
pub struct SigpipeGuard {
    previous: libc::sigaction,
}

impl SigpipeGuard {
    pub fn install() -> Option<Self> {
        // SAFETY: sigaction structs are plain data; zeroed is a valid value.
        unsafe {
            let mut ignore: libc::sigaction = mem::zeroed();
            ignore.sa_sigaction = libc::SIG_IGN;
            libc::sigemptyset(&mut ignore.sa_mask);

            let mut previous: libc::sigaction = mem::zeroed();
            if libc::sigaction(libc::SIGPIPE, &ignore, &mut previous) != 0 {
                return None;
            }
            Some(Self { previous })
        }
    }
}

impl Drop for SigpipeGuard {
    fn drop(&mut self) {
        // SAFETY: restores the disposition captured by `install`.
        unsafe {
            libc::sigaction(libc::SIGPIPE, &self.previous, ptr::null_mut());
        }
    }
}

/// Serializes unit tests that change the process-wide SIGPIPE disposition.
#[cfg(test)]
pub(crate) static DISPOSITION_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
