//! Pinned TLS transport.
//!
//! The handshake runs on a blocking socket. Once the peer is verified the
//! socket switches to non-blocking mode and send/receive poll in
//! [`WAIT_QUANTUM`] steps until their timeout is used up.

use super::pins::PinnedKeySet;
use super::WAIT_QUANTUM;
use bytes::Bytes;
use harddns_application::ports::{DnsTransport, SessionState};
use harddns_domain::{DomainError, UpstreamConfig};
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, RootCertStore};
use socket2::{Domain, Protocol, Socket, Type};
use std::io::{self, Read, Write};
use std::net::{IpAddr, Shutdown, SocketAddr, TcpStream};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const READ_CHUNK: usize = 4096;

/// Who the peer has to prove to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsIdentity {
    /// SNI, also checked against the certificate chain
    pub server_name: String,
    /// Required subject common name of the leaf certificate
    pub common_name: String,
}

impl TlsIdentity {
    pub fn new(server_name: impl Into<String>, common_name: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
            common_name: common_name.into(),
        }
    }

    pub fn for_upstream(upstream: &UpstreamConfig) -> Self {
        Self::new(&upstream.host, &upstream.cn)
    }
}

/// Client configuration validating chains against `roots`.
pub fn client_config(roots: Arc<RootCertStore>) -> Result<Arc<ClientConfig>, DomainError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| DomainError::Tls(e.to_string()))?
        .with_root_certificates(roots)
        .with_no_client_auth();
    Ok(Arc::new(config))
}

#[derive(Debug)]
struct TlsSession {
    conn: ClientConnection,
    sock: TcpStream,
}

impl TlsSession {
    fn send(&mut self, bytes: &[u8], timeout: Duration) -> Result<usize, DomainError> {
        let mut waited = Duration::ZERO;
        let mut written = 0;
        while written < bytes.len() {
            written += self
                .conn
                .writer()
                .write(&bytes[written..])
                .map_err(|e| io_error("SSL_write", e))?;
            self.flush(timeout, &mut waited)?;
        }
        Ok(written)
    }

    fn flush(&mut self, timeout: Duration, waited: &mut Duration) -> Result<(), DomainError> {
        while self.conn.wants_write() {
            match self.conn.write_tls(&mut self.sock) {
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    wait(timeout, waited, "SSL_write")?
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(io_error("SSL_write", e)),
            }
        }
        Ok(())
    }

    fn receive(&mut self, timeout: Duration) -> Result<Bytes, DomainError> {
        let mut waited = Duration::ZERO;
        let mut buf = [0u8; READ_CHUNK];
        loop {
            match self.conn.reader().read(&mut buf) {
                // close_notify received
                Ok(0) => return Err(DomainError::PeerClosed { operation: "SSL_read" }),
                Ok(n) => return Ok(Bytes::copy_from_slice(&buf[..n])),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    return Err(DomainError::PeerClosed { operation: "SSL_read" })
                }
                Err(e) => return Err(io_error("SSL_read", e)),
            }

            match self.conn.read_tls(&mut self.sock) {
                Ok(0) => return Err(DomainError::PeerClosed { operation: "SSL_read" }),
                Ok(_) => {
                    self.conn
                        .process_new_packets()
                        .map_err(|e| DomainError::Tls(e.to_string()))?;
                    // Key updates and alerts
                    self.flush(timeout, &mut waited)?;
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    wait(timeout, &mut waited, "SSL_read")?
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(io_error("SSL_read", e)),
            }
        }
    }
}

/// One TLS session to one upstream, addressed by literal IP.
///
/// Besides chain validation against the configured roots, the leaf
/// certificate must carry the expected subject common name and, when pins
/// are configured, a public key equal to one of them.
#[derive(Debug)]
pub struct PinnedTlsTransport {
    identity: TlsIdentity,
    pins: Arc<PinnedKeySet>,
    config: Arc<ClientConfig>,
    connect_timeout: Duration,
    state: SessionState,
    session: Option<TlsSession>,
    peer: Option<SocketAddr>,
}

impl PinnedTlsTransport {
    pub fn new(
        identity: TlsIdentity,
        pins: PinnedKeySet,
        config: Arc<ClientConfig>,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            identity,
            pins: Arc::new(pins),
            config,
            connect_timeout,
            state: SessionState::Disconnected,
            session: None,
            peer: None,
        }
    }

    pub fn identity(&self) -> &TlsIdentity {
        &self.identity
    }

    pub fn pins(&self) -> &PinnedKeySet {
        &self.pins
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    fn open(&self, addr: SocketAddr) -> Result<TlsSession, DomainError> {
        let server = addr.to_string();
        let connect_failed = |e: io::Error| DomainError::ConnectFailed {
            server: server.clone(),
            reason: e.to_string(),
        };

        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
            .map_err(connect_failed)?;
        socket
            .connect_timeout(&addr.into(), self.connect_timeout)
            .map_err(|e| match e.kind() {
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                    DomainError::TransportTimeout {
                        operation: "connect",
                        timeout_ms: millis(self.connect_timeout),
                    }
                }
                _ => connect_failed(e),
            })?;

        let sock: TcpStream = socket.into();
        sock.set_nodelay(true)?;
        sock.set_read_timeout(Some(self.connect_timeout))?;
        sock.set_write_timeout(Some(self.connect_timeout))?;

        let server_name = ServerName::try_from(self.identity.server_name.clone()).map_err(|e| {
            DomainError::Tls(format!(
                "invalid server name '{}': {}",
                self.identity.server_name, e
            ))
        })?;
        let conn = ClientConnection::new(Arc::clone(&self.config), server_name)
            .map_err(|e| DomainError::Tls(e.to_string()))?;
        let mut session = TlsSession { conn, sock };

        while session.conn.is_handshaking() {
            session
                .conn
                .complete_io(&mut session.sock)
                .map_err(|e| handshake_error(e, self.connect_timeout))?;
        }

        self.verify_peer(&session.conn)?;

        session.sock.set_read_timeout(None)?;
        session.sock.set_write_timeout(None)?;
        session.sock.set_nonblocking(true)?;
        Ok(session)
    }

    /// Post-handshake checks on the leaf certificate: common name, then pins.
    fn verify_peer(&self, conn: &ClientConnection) -> Result<(), DomainError> {
        let leaf = conn
            .peer_certificates()
            .and_then(|chain| chain.first())
            .ok_or_else(|| DomainError::CertificateInvalid("peer sent no certificate".into()))?;
        let (_, cert) = x509_parser::parse_x509_certificate(leaf.as_ref())
            .map_err(|e| DomainError::CertificateInvalid(e.to_string()))?;

        let found = cert
            .subject()
            .iter_common_name()
            .next()
            .and_then(|cn| cn.as_str().ok())
            .unwrap_or_default();
        if found != self.identity.common_name {
            return Err(DomainError::CommonNameMismatch {
                expected: self.identity.common_name.clone(),
                found: found.to_string(),
            });
        }

        if !self.pins.is_empty() && !self.pins.matches(cert.public_key().raw) {
            return Err(DomainError::PinMismatch);
        }
        Ok(())
    }

    fn settle<T>(&mut self, result: Result<T, DomainError>) -> Result<T, DomainError> {
        if let Err(e) = &result {
            self.state = match e {
                DomainError::PeerClosed { .. } => SessionState::Closed,
                _ => SessionState::Failed,
            };
        }
        result
    }
}

impl DnsTransport for PinnedTlsTransport {
    fn connect(&mut self, host: &str, port: u16) -> Result<(), DomainError> {
        self.close();

        let ip: IpAddr = host.parse().map_err(|_| {
            DomainError::InvalidIpAddress(format!("'{}' is not a literal IP address", host))
        })?;
        let addr = SocketAddr::new(ip, port);
        self.peer = Some(addr);
        self.state = SessionState::Connecting;
        debug!(peer = %addr, server_name = %self.identity.server_name, "Opening TLS session");

        match self.open(addr) {
            Ok(session) => {
                debug!(
                    peer = %addr,
                    version = ?session.conn.protocol_version(),
                    pins = self.pins.len(),
                    "TLS session established"
                );
                self.session = Some(session);
                self.state = SessionState::Established;
                Ok(())
            }
            Err(e) => {
                warn!(peer = %addr, error = %e, "TLS session setup failed");
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }

    fn send(&mut self, bytes: &[u8], timeout: Duration) -> Result<usize, DomainError> {
        let result = match self.session.as_mut() {
            Some(session) if self.state == SessionState::Established => {
                session.send(bytes, timeout)
            }
            _ => return Err(DomainError::NotConnected),
        };
        self.settle(result)
    }

    fn receive(&mut self, timeout: Duration) -> Result<Bytes, DomainError> {
        let result = match self.session.as_mut() {
            Some(session) if self.state == SessionState::Established => session.receive(timeout),
            _ => return Err(DomainError::NotConnected),
        };
        self.settle(result)
    }

    fn close(&mut self) {
        if let Some(TlsSession { mut conn, mut sock }) = self.session.take() {
            conn.send_close_notify();
            let _ = conn.write_tls(&mut sock);
            drop(conn);
            let _ = sock.shutdown(Shutdown::Both);
            debug!(peer = ?self.peer, "TLS session closed");
        }
        if self.state != SessionState::Disconnected {
            self.state = SessionState::Closed;
        }
    }

    fn state(&self) -> SessionState {
        self.state
    }

    fn protocol_name(&self) -> &'static str {
        "TLS"
    }
}

impl Drop for PinnedTlsTransport {
    fn drop(&mut self) {
        self.close();
    }
}

fn wait(timeout: Duration, waited: &mut Duration, operation: &'static str) -> Result<(), DomainError> {
    if *waited >= timeout {
        return Err(DomainError::TransportTimeout {
            operation,
            timeout_ms: millis(timeout),
        });
    }
    std::thread::sleep(WAIT_QUANTUM);
    *waited += WAIT_QUANTUM;
    Ok(())
}

fn handshake_error(e: io::Error, timeout: Duration) -> DomainError {
    if let Some(tls) = e
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<rustls::Error>())
    {
        return match tls {
            rustls::Error::InvalidCertificate(_) => DomainError::CertificateInvalid(tls.to_string()),
            other => DomainError::Tls(other.to_string()),
        };
    }
    match e.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => DomainError::TransportTimeout {
            operation: "SSL_connect",
            timeout_ms: millis(timeout),
        },
        io::ErrorKind::UnexpectedEof => DomainError::PeerClosed {
            operation: "SSL_connect",
        },
        _ => DomainError::Tls(format!("SSL_connect: {}", e)),
    }
}

fn io_error(operation: &str, e: io::Error) -> DomainError {
    DomainError::IoError(format!("{}: {}", operation, e))
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
