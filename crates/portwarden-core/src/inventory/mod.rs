//! Connection inventory builder.
//!
//! [`InventoryScanner::snapshot`] turns the probe's raw socket tables into a
//! deduplicated, policy-classified, deterministically ordered list of
//! [`SocketRecord`]s. The derived views, [`filter_records`] and
//! [`snapshot_stats`], are pure functions over a snapshot and never touch
//! the OS.

pub mod types;

pub use types::SocketFilter;


use crate::policy::CriticalPolicy;
use crate::probe::{RawSocket, SystemProbe};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};
use types::{Protocol, SocketRecord, SocketState, SystemStats};

pub struct InventoryScanner<P: SystemProbe> {
    probe: Arc<P>,
    policy: Arc<CriticalPolicy>,
}

impl<P: SystemProbe> InventoryScanner<P> {
    pub fn new(probe: Arc<P>, policy: Arc<CriticalPolicy>) -> Self {
        Self { probe, policy }
    }

    /// Build a fresh snapshot of all open sockets.
    ///
    /// TCP is enumerated first, then UDP. Duplicates collapse on
    /// `(port, protocol, state, pid)`; UDP states are normalized to `NONE`
    /// before keying, which makes the UDP key effectively
    /// `(port, protocol, pid)`. A family whose enumeration fails contributes
    /// zero records instead of failing the snapshot. The result is sorted by
    /// `(port, protocol)` with TCP before UDP at equal port.
    pub fn snapshot(&self) -> Vec<SocketRecord> {
        let mut records = Vec::new();
        let mut seen: HashSet<(u16, Protocol, SocketState, Option<u32>)> = HashSet::new();
        // Per-call cache only: a pid reused by a new process must not inherit
        // the old name on the next snapshot.
        let mut name_cache: HashMap<u32, String> = HashMap::new();

        match self.probe.tcp_sockets() {
            Ok(sockets) => {
                for socket in sockets {
                    self.collect(socket, &mut records, &mut seen, &mut name_cache);
                }
            }
            Err(e) => warn!(error = %e, "TCP enumeration failed; family skipped"),
        }

        match self.probe.udp_sockets() {
            Ok(sockets) => {
                for mut socket in sockets {
                    socket.state = SocketState::None;
                    self.collect(socket, &mut records, &mut seen, &mut name_cache);
                }
            }
            Err(e) => warn!(error = %e, "UDP enumeration failed; family skipped"),
        }

        records.sort_by_key(|r| (r.port, r.protocol));
        records
    }

    fn collect(
        &self,
        socket: RawSocket,
        records: &mut Vec<SocketRecord>,
        seen: &mut HashSet<(u16, Protocol, SocketState, Option<u32>)>,
        name_cache: &mut HashMap<u32, String>,
    ) {
        let port = socket.local.port();
        if !seen.insert((port, socket.protocol, socket.state, socket.pid)) {
            return;
        }
        let process_name = self.resolve_name(socket.pid, name_cache);
        records.push(SocketRecord {
            port,
            protocol: socket.protocol,
            state: socket.state,
            pid: socket.pid,
            process_name: process_name.clone(),
            local_address: socket.local.to_string(),
            remote_address: socket.remote.map(|addr| addr.to_string()),
            is_critical: self.policy.is_critical(process_name.as_deref(), port),
        });
    }

    /// A socket whose owner vanished, is inaccessible, or is a zombie keeps
    /// its record; only the name is omitted.
    fn resolve_name(
        &self,
        pid: Option<u32>,
        cache: &mut HashMap<u32, String>,
    ) -> Option<String> {
        let pid = pid?;
        if let Some(name) = cache.get(&pid) {
            return Some(name.clone());
        }
        match self.probe.process_name(pid) {
            Ok(name) => {
                cache.insert(pid, name.clone());
                Some(name)
            }
            Err(e) => {
                debug!(pid, error = %e, "process name unresolved");
                None
            }
        }
    }
}

/// AND-combine whichever criteria are present; an empty filter is identity.
pub fn filter_records(records: &[SocketRecord], filter: &SocketFilter) -> Vec<SocketRecord> {
    records
        .iter()
        .filter(|record| filter.matches(record))
        .cloned()
        .collect()
}

/// Aggregate counts over a snapshot.
pub fn snapshot_stats(records: &[SocketRecord]) -> SystemStats {
    let unique: HashSet<u32> = records.iter().filter_map(|r| r.pid).collect();
    SystemStats {
        total_tcp_ports: records
            .iter()
            .filter(|r| r.protocol == Protocol::Tcp)
            .count(),
        total_udp_ports: records
            .iter()
            .filter(|r| r.protocol == Protocol::Udp)
            .count(),
        listening_ports: records
            .iter()
            .filter(|r| r.state == SocketState::Listen)
            .count(),
        established_connections: records
            .iter()
            .filter(|r| r.state == SocketState::Established)
            .count(),
        unique_processes: unique.len(),
    }
}
