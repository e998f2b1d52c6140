//! Narrow OS interface.
//!
//! Everything that touches the operating system goes through [`SystemProbe`]:
//! socket-table enumeration, process-name resolution, signal delivery, and
//! the bounded exit wait. The inventory builder and the termination state
//! machine are written against the trait, so their decision logic is testable
//! without a live host.

mod host;
#[cfg(test)]
pub(crate) mod mock;

pub use host::HostProbe;

use crate::inventory::types::{Protocol, SocketState};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// A socket as reported by the OS, before dedup and process correlation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSocket {
    pub protocol: Protocol,
    pub state: SocketState,
    pub local: SocketAddr,
    pub remote: Option<SocketAddr>,
    pub pid: Option<u32>,
}

/// Failures at the OS boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("process {pid} not found")]
    NotFound { pid: u32 },

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("not supported on this platform: {0}")]
    Unsupported(&'static str),

    #[error("{0}")]
    Io(String),
}

/// The OS operations the engine needs, and nothing more.
pub trait SystemProbe: Send + Sync {
    /// All TCP sockets (v4 and v6) currently known to the kernel.
    fn tcp_sockets(&self) -> Result<Vec<RawSocket>, ProbeError>;

    /// All UDP sockets (v4 and v6). Their `state` is ignored by callers.
    fn udp_sockets(&self) -> Result<Vec<RawSocket>, ProbeError>;

    /// Resolve the short name of a process.
    fn process_name(&self, pid: u32) -> Result<String, ProbeError>;

    /// Deliver the graceful termination signal (SIGTERM).
    fn signal_terminate(&self, pid: u32) -> Result<(), ProbeError>;

    /// Deliver the immediate kill signal (SIGKILL).
    fn signal_kill(&self, pid: u32) -> Result<(), ProbeError>;

    /// Block until the process exits or the timeout elapses. Returns true if
    /// the process is gone (a zombie counts as exited).
    fn wait_for_exit(&self, pid: u32, timeout: Duration) -> bool;
}
