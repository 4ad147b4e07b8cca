use rustls::{ServerConfig, ServerConnection, StreamOwned};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// What the test server does once a client connects.
pub enum ServerScript {
    /// Complete the handshake, then wait for the client to go away.
    Idle,
    /// Answer each request, in order, with the given raw bytes.
    Respond(Vec<Vec<u8>>),
    /// Read the request and stay silent.
    Stall(Duration),
    /// Read the request, then shut the session down cleanly.
    CloseAfterRequest,
}

/// Single-connection rustls server on 127.0.0.1.
pub fn spawn_tls_server(config: Arc<ServerConfig>, script: ServerScript) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        let Ok((stream, _)) = listener.accept() else {
            return;
        };
        let Ok(conn) = ServerConnection::new(config) else {
            return;
        };
        let mut tls = StreamOwned::new(conn, stream);

        match script {
            ServerScript::Idle => drain(&mut tls),
            ServerScript::Respond(responses) => {
                for response in responses {
                    if !read_request(&mut tls) {
                        return;
                    }
                    if tls.write_all(&response).and_then(|_| tls.flush()).is_err() {
                        return;
                    }
                }
                drain(&mut tls);
            }
            ServerScript::Stall(duration) => {
                read_request(&mut tls);
                thread::sleep(duration);
            }
            ServerScript::CloseAfterRequest => {
                if read_request(&mut tls) {
                    tls.conn.send_close_notify();
                    let _ = tls.flush();
                    thread::sleep(Duration::from_millis(200));
                }
            }
        }
    });

    addr
}

/// Connections accepted and HTTP requests read by a counting server.
#[derive(Clone, Default)]
pub struct ServerCounters {
    connections: Arc<AtomicUsize>,
    requests: Arc<AtomicUsize>,
}

impl ServerCounters {
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

/// Multi-connection rustls server that counts what it sees and never
/// answers.
pub fn spawn_counting_tls_server(config: Arc<ServerConfig>) -> (SocketAddr, ServerCounters) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let counters = ServerCounters::default();
    let seen = counters.clone();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else {
                return;
            };
            seen.connections.fetch_add(1, Ordering::SeqCst);
            let Ok(conn) = ServerConnection::new(Arc::clone(&config)) else {
                continue;
            };
            let mut tls = StreamOwned::new(conn, stream);
            while read_request(&mut tls) {
                seen.requests.fetch_add(1, Ordering::SeqCst);
            }
        }
    });

    (addr, counters)
}

fn read_request(tls: &mut StreamOwned<ServerConnection, TcpStream>) -> bool {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match tls.read(&mut buf) {
            Ok(0) | Err(_) => return false,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
    true
}

fn drain(tls: &mut StreamOwned<ServerConnection, TcpStream>) {
    let mut buf = [0u8; 1024];
    while let Ok(n) = tls.read(&mut buf) {
        if n == 0 {
            break;
        }
    }
}
