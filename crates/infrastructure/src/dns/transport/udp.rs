use bytes::Bytes;
use harddns_domain::DomainError;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Maximum UDP DNS response size with EDNS(0)
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// Plain DNS over UDP, used for internal domains.
#[derive(Debug, Clone, Copy)]
pub struct UdpTransport {
    server_addr: SocketAddr,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    /// Send one query and wait for the reply carrying the same message ID.
    /// Datagrams from other sources or with other IDs are dropped.
    pub fn exchange(&self, message_bytes: &[u8], timeout: Duration) -> Result<Bytes, DomainError> {
        if message_bytes.len() < 2 {
            return Err(DomainError::InvalidDnsResponse("query too short".into()));
        }
        let query_id = &message_bytes[..2];

        let bind_addr: SocketAddr = if self.server_addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(bind_addr)?;

        let bytes_sent = socket.send_to(message_bytes, self.server_addr)?;
        debug!(server = %self.server_addr, bytes_sent, "UDP query sent");

        let deadline = Instant::now() + timeout;
        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(self.timed_out(timeout));
            }
            socket.set_read_timeout(Some(remaining))?;

            let (bytes_received, from_addr) = match socket.recv_from(&mut recv_buf) {
                Ok(received) => received,
                Err(e)
                    if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
                {
                    return Err(self.timed_out(timeout))
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            if from_addr != self.server_addr {
                warn!(
                    expected = %self.server_addr,
                    received_from = %from_addr,
                    "UDP response from unexpected source"
                );
                continue;
            }
            if bytes_received < 2 || &recv_buf[..2] != query_id {
                warn!(server = %self.server_addr, "UDP response with mismatched ID");
                continue;
            }

            debug!(server = %self.server_addr, bytes_received, "UDP response received");
            return Ok(Bytes::copy_from_slice(&recv_buf[..bytes_received]));
        }
    }

    fn timed_out(&self, timeout: Duration) -> DomainError {
        DomainError::TransportTimeout {
            operation: "recvfrom",
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }
}
