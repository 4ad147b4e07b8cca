use bytes::Bytes;
use harddns_domain::DomainError;
use std::time::Duration;

/// Lifecycle of one transport session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Established,
    /// Closed locally or by the peer.
    Closed,
    /// Setup or I/O failed; `close()` and `connect()` again to recover.
    Failed,
}

/// Byte stream to one upstream host.
///
/// `send` and `receive` block for at most `timeout` each. A clean shutdown by
/// the peer is reported as [`DomainError::PeerClosed`], distinct from
/// [`DomainError::TransportTimeout`].
pub trait DnsTransport: Send {
    /// Connect to a literal IP address. Never performs a name lookup.
    fn connect(&mut self, host: &str, port: u16) -> Result<(), DomainError>;

    /// Write all of `bytes`, returning how many were written.
    fn send(&mut self, bytes: &[u8], timeout: Duration) -> Result<usize, DomainError>;

    /// Return the next non-empty chunk of plaintext.
    fn receive(&mut self, timeout: Duration) -> Result<Bytes, DomainError>;

    /// Release the session and the socket. Idempotent.
    fn close(&mut self);

    fn state(&self) -> SessionState;

    fn is_connected(&self) -> bool {
        self.state() == SessionState::Established
    }

    fn protocol_name(&self) -> &'static str;
}
