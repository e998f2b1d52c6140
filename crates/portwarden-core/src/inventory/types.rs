use serde::{Deserialize, Serialize};

/// Transport protocol of a socket.
///
/// Ordering is lexicographic ("TCP" < "UDP"), which the snapshot sort relies
/// on: at equal port, TCP records come first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection state, fixed vocabulary. UDP sockets always carry [`SocketState::None`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SocketState {
    Listen,
    Established,
    TimeWait,
    CloseWait,
    FinWait1,
    FinWait2,
    SynSent,
    SynRecv,
    LastAck,
    Closing,
    None,
}

impl SocketState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SocketState::Listen => "LISTEN",
            SocketState::Established => "ESTABLISHED",
            SocketState::TimeWait => "TIME_WAIT",
            SocketState::CloseWait => "CLOSE_WAIT",
            SocketState::FinWait1 => "FIN_WAIT1",
            SocketState::FinWait2 => "FIN_WAIT2",
            SocketState::SynSent => "SYN_SENT",
            SocketState::SynRecv => "SYN_RECV",
            SocketState::LastAck => "LAST_ACK",
            SocketState::Closing => "CLOSING",
            SocketState::None => "NONE",
        }
    }
}

impl std::fmt::Display for SocketState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One open socket correlated with its owning process.
///
/// Rebuilt from scratch on every snapshot, never mutated in place.
/// `is_critical` is derived from the policy, never authoritative input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketRecord {
    pub port: u16,
    pub protocol: Protocol,
    pub state: SocketState,
    pub pid: Option<u32>,
    pub process_name: Option<String>,
    pub local_address: String,
    pub remote_address: Option<String>,
    pub is_critical: bool,
}

/// Aggregate counts over one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStats {
    pub total_tcp_ports: usize,
    pub total_udp_ports: usize,
    pub listening_ports: usize,
    pub established_connections: usize,
    pub unique_processes: usize,
}

/// Optional filter criteria, AND-combined. An absent field means "no
/// constraint". Protocol and state are compared case-insensitively against
/// the record's string form; `process` is a case-insensitive substring match
/// (records without a name never match it).
#[derive(Debug, Clone, Default)]
pub struct SocketFilter {
    pub port: Option<u16>,
    pub protocol: Option<String>,
    pub process: Option<String>,
    pub state: Option<String>,
}

impl SocketFilter {
    pub fn is_empty(&self) -> bool {
        self.port.is_none()
            && self.protocol.is_none()
            && self.process.is_none()
            && self.state.is_none()
    }

    pub(crate) fn matches(&self, record: &SocketRecord) -> bool {
        if let Some(port) = self.port {
            if record.port != port {
                return false;
            }
        }
        if let Some(protocol) = &self.protocol {
            if !record.protocol.as_str().eq_ignore_ascii_case(protocol) {
                return false;
            }
        }
        if let Some(process) = &self.process {
            match &record.process_name {
                Some(name) => {
                    if !name.to_lowercase().contains(&process.to_lowercase()) {
                        return false;
                    }
                }
                None => return false,
            }
        }
        if let Some(state) = &self.state {
            if !record.state.as_str().eq_ignore_ascii_case(state) {
                return false;
            }
        }
        true
    }
}
