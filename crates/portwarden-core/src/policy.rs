//! Critical-resource policy.
//!
//! A pure lookup over two immutable sets: process names that must never be
//! terminated, and well-known system ports whose owners are flagged in the
//! inventory. The same predicate backs both the inventory's `is_critical`
//! flag and the termination guard, so the two can never disagree.

use std::collections::HashSet;

/// Protected process names and ports. Built once at startup and shared
/// read-only; no locking is needed.
#[derive(Debug, Clone)]
pub struct CriticalPolicy {
    /// Lowercased process names.
    names: HashSet<String>,
    ports: HashSet<u16>,
}

/// Core processes of the three major OS families. Killing any of these takes
/// the session or the whole machine down with it.
const CRITICAL_PROCESS_NAMES: &[&str] = &[
    // Windows
    "system",
    "smss.exe",
    "csrss.exe",
    "wininit.exe",
    "services.exe",
    "lsass.exe",
    "svchost.exe",
    "winlogon.exe",
    "explorer.exe",
    "dwm.exe",
    // Linux
    "init",
    "systemd",
    "kthreadd",
    "ksoftirqd",
    "kworker",
    // macOS
    "launchd",
    "kernel_task",
    "WindowServer",
];

/// System ports that should not be reclaimed by killing their owner.
const CRITICAL_PORTS: &[u16] = &[22, 53, 67, 68, 123, 135, 137, 138, 139, 445];

impl CriticalPolicy {
    /// The built-in protection sets.
    pub fn builtin() -> Self {
        Self::new(
            CRITICAL_PROCESS_NAMES.iter().map(|s| s.to_string()),
            CRITICAL_PORTS.iter().copied(),
        )
    }

    pub fn new(
        names: impl IntoIterator<Item = String>,
        ports: impl IntoIterator<Item = u16>,
    ) -> Self {
        Self {
            names: names.into_iter().map(|n| n.to_lowercase()).collect(),
            ports: ports.into_iter().collect(),
        }
    }

    /// True if the name (case-insensitive, exact) or the port is protected.
    /// An absent name matches nothing.
    pub fn is_critical(&self, process_name: Option<&str>, port: u16) -> bool {
        if let Some(name) = process_name {
            if self.is_critical_name(name) {
                return true;
            }
        }
        self.is_critical_port(port)
    }

    pub fn is_critical_name(&self, name: &str) -> bool {
        self.names.contains(&name.to_lowercase())
    }

    pub fn is_critical_port(&self, port: u16) -> bool {
        self.ports.contains(&port)
    }
}

impl Default for CriticalPolicy {
    fn default() -> Self {
        Self::builtin()
    }
}
