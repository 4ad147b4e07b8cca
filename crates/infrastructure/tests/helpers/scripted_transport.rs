use bytes::Bytes;
use harddns_application::ports::{DnsTransport, SessionState};
use harddns_domain::DomainError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug)]
struct Script {
    refuse: bool,
    replies: VecDeque<Result<Vec<u8>, DomainError>>,
    sent: Vec<Vec<u8>>,
    connects: usize,
    closes: usize,
    state: SessionState,
}

/// In-memory transport replaying scripted replies. Clones share the script,
/// so a test keeps one handle while the client owns the other.
#[derive(Debug, Clone)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                refuse: false,
                replies: VecDeque::new(),
                sent: Vec::new(),
                connects: 0,
                closes: 0,
                state: SessionState::Disconnected,
            })),
        }
    }

    /// Every connect attempt fails.
    pub fn refusing() -> Self {
        let transport = Self::new();
        transport.script.lock().unwrap().refuse = true;
        transport
    }

    pub fn reply(self, bytes: Vec<u8>) -> Self {
        self.script.lock().unwrap().replies.push_back(Ok(bytes));
        self
    }

    pub fn fail(self, error: DomainError) -> Self {
        self.script.lock().unwrap().replies.push_back(Err(error));
        self
    }

    pub fn boxed(&self) -> Box<dyn DnsTransport> {
        Box::new(self.clone())
    }

    pub fn connects(&self) -> usize {
        self.script.lock().unwrap().connects
    }

    pub fn closes(&self) -> usize {
        self.script.lock().unwrap().closes
    }

    /// Request lines of everything sent so far.
    pub fn requests(&self) -> Vec<String> {
        self.script
            .lock()
            .unwrap()
            .sent
            .iter()
            .map(|bytes| {
                String::from_utf8_lossy(bytes)
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .to_string()
            })
            .collect()
    }
}

impl DnsTransport for ScriptedTransport {
    fn connect(&mut self, host: &str, port: u16) -> Result<(), DomainError> {
        let mut script = self.script.lock().unwrap();
        script.connects += 1;
        if script.refuse {
            script.state = SessionState::Failed;
            return Err(DomainError::ConnectFailed {
                server: format!("{}:{}", host, port),
                reason: "Connection refused".into(),
            });
        }
        script.state = SessionState::Established;
        Ok(())
    }

    fn send(&mut self, bytes: &[u8], _timeout: Duration) -> Result<usize, DomainError> {
        let mut script = self.script.lock().unwrap();
        if script.state != SessionState::Established {
            return Err(DomainError::NotConnected);
        }
        script.sent.push(bytes.to_vec());
        Ok(bytes.len())
    }

    fn receive(&mut self, timeout: Duration) -> Result<Bytes, DomainError> {
        let mut script = self.script.lock().unwrap();
        match script.replies.pop_front() {
            Some(Ok(bytes)) => Ok(Bytes::from(bytes)),
            Some(Err(e)) => {
                script.state = SessionState::Failed;
                Err(e)
            }
            None => Err(DomainError::TransportTimeout {
                operation: "SSL_read",
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    fn close(&mut self) {
        let mut script = self.script.lock().unwrap();
        script.closes += 1;
        script.state = SessionState::Closed;
    }

    fn state(&self) -> SessionState {
        self.script.lock().unwrap().state
    }

    fn protocol_name(&self) -> &'static str {
        "SCRIPTED"
    }
}
