//! Deterministic in-memory probe for tests. Records every signal it is asked
//! to deliver and resolves waits instantly, so the state machine's branches
//! can be exercised without real processes or real time.

use super::{ProbeError, RawSocket, SystemProbe};
use crate::inventory::types::{Protocol, SocketState};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentSignal {
    Term,
    Kill,
}

#[derive(Debug, Clone)]
pub struct MockProcess {
    pub name: String,
    pub alive: bool,
    /// Survives SIGTERM (the wait after a graceful signal times out).
    pub ignores_term: bool,
    /// Survives even SIGKILL, to drive the timeout paths.
    pub unkillable: bool,
    /// Signals to this pid fail with EPERM.
    pub signal_denied: bool,
}

impl MockProcess {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            alive: true,
            ignores_term: false,
            unkillable: false,
            signal_denied: false,
        }
    }
}

pub struct MockProbe {
    pub tcp: Mutex<Result<Vec<RawSocket>, ProbeError>>,
    pub udp: Mutex<Result<Vec<RawSocket>, ProbeError>>,
    processes: Mutex<HashMap<u32, MockProcess>>,
    signals: Mutex<Vec<(u32, SentSignal)>>,
}

impl MockProbe {
    pub fn new() -> Self {
        Self {
            tcp: Mutex::new(Ok(Vec::new())),
            udp: Mutex::new(Ok(Vec::new())),
            processes: Mutex::new(HashMap::new()),
            signals: Mutex::new(Vec::new()),
        }
    }

    pub fn with_process(self, pid: u32, process: MockProcess) -> Self {
        self.processes.lock().unwrap().insert(pid, process);
        self
    }

    pub fn with_tcp(self, sockets: Vec<RawSocket>) -> Self {
        *self.tcp.lock().unwrap() = Ok(sockets);
        self
    }

    pub fn with_udp(self, sockets: Vec<RawSocket>) -> Self {
        *self.udp.lock().unwrap() = Ok(sockets);
        self
    }

    pub fn deny_tcp(self) -> Self {
        *self.tcp.lock().unwrap() = Err(ProbeError::AccessDenied("tcp table".into()));
        self
    }

    pub fn deny_udp(self) -> Self {
        *self.udp.lock().unwrap() = Err(ProbeError::AccessDenied("udp table".into()));
        self
    }

    pub fn sent_signals(&self) -> Vec<(u32, SentSignal)> {
        self.signals.lock().unwrap().clone()
    }
}

/// Shorthand for building raw sockets in tests.
pub fn sock(
    protocol: Protocol,
    port: u16,
    state: SocketState,
    pid: Option<u32>,
) -> RawSocket {
    RawSocket {
        protocol,
        state,
        local: SocketAddr::from(([127, 0, 0, 1], port)),
        remote: None,
        pid,
    }
}

impl SystemProbe for MockProbe {
    fn tcp_sockets(&self) -> Result<Vec<RawSocket>, ProbeError> {
        self.tcp.lock().unwrap().clone()
    }

    fn udp_sockets(&self) -> Result<Vec<RawSocket>, ProbeError> {
        self.udp.lock().unwrap().clone()
    }

    fn process_name(&self, pid: u32) -> Result<String, ProbeError> {
        match self.processes.lock().unwrap().get(&pid) {
            Some(process) => Ok(process.name.clone()),
            None => Err(ProbeError::NotFound { pid }),
        }
    }

    fn signal_terminate(&self, pid: u32) -> Result<(), ProbeError> {
        let mut processes = self.processes.lock().unwrap();
        let process = processes
            .get_mut(&pid)
            .ok_or(ProbeError::NotFound { pid })?;
        if process.signal_denied {
            return Err(ProbeError::AccessDenied(format!("SIGTERM to pid {pid}")));
        }
        self.signals.lock().unwrap().push((pid, SentSignal::Term));
        if !process.ignores_term {
            process.alive = false;
        }
        Ok(())
    }

    fn signal_kill(&self, pid: u32) -> Result<(), ProbeError> {
        let mut processes = self.processes.lock().unwrap();
        let process = processes
            .get_mut(&pid)
            .ok_or(ProbeError::NotFound { pid })?;
        if process.signal_denied {
            return Err(ProbeError::AccessDenied(format!("SIGKILL to pid {pid}")));
        }
        self.signals.lock().unwrap().push((pid, SentSignal::Kill));
        if !process.unkillable {
            process.alive = false;
        }
        Ok(())
    }

    fn wait_for_exit(&self, pid: u32, _timeout: Duration) -> bool {
        !self
            .processes
            .lock()
            .unwrap()
            .get(&pid)
            .map(|p| p.alive)
            .unwrap_or(false)
    }
}
