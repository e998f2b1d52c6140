//! Append-only action audit trail.
//!
//! A bounded in-memory FIFO: once the cap is reached, each append evicts the
//! oldest entry. The single mutex covers trim and append together, so readers
//! never observe a partially evicted sequence. Reads hand out cloned
//! snapshots, newest first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// Default maximum number of retained entries.
pub const AUDIT_LOG_CAP: usize = 1000;

/// Operation kind of an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// Graceful termination signal was sent.
    Terminate,
    /// Immediate kill signal was sent.
    ForceKill,
    /// The safety guards refused the attempt.
    KillBlocked,
    /// The attempt failed before any signal took effect.
    KillAttempted,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Terminate => "TERMINATE",
            AuditAction::ForceKill => "FORCE_KILL",
            AuditAction::KillBlocked => "KILL_BLOCKED",
            AuditAction::KillAttempted => "KILL_ATTEMPTED",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable record of an attempted action and its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub target_pid: Option<u32>,
    pub target_process: Option<String>,
    pub target_port: Option<u16>,
    pub result: String,
    pub user: Option<String>,
}

/// Bounded FIFO of [`AuditEntry`] values. Appends are serialized by a single
/// lock; entries are only ever removed by cap eviction.
pub struct AuditLog {
    entries: Mutex<VecDeque<AuditEntry>>,
    cap: usize,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::with_capacity(AUDIT_LOG_CAP)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            cap,
        }
    }

    pub fn append(&self, entry: AuditEntry) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        entries.push_back(entry);
        while entries.len() > self.cap {
            entries.pop_front();
        }
    }

    /// Up to `limit` entries, most recently appended first.
    pub fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        entries.iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}
