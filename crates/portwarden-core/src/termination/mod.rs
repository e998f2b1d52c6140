//! Safety-gated process termination.
//!
//! A single attempt is a synchronous state machine: resolve the target,
//! refuse critical processes and self-termination, signal, wait, escalate
//! from SIGTERM to SIGKILL when the graceful wait runs out. Every terminal
//! path produces exactly one [`TerminationOutcome`] and appends exactly one
//! entry to the audit log before returning; OS failures never escape as
//! errors.

#[cfg(test)]
mod tests;

use crate::audit::{AuditAction, AuditEntry, AuditLog};
use crate::policy::CriticalPolicy;
use crate::probe::{ProbeError, SystemProbe};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Result of one termination attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminationOutcome {
    pub success: bool,
    pub message: String,
    pub pid: u32,
    pub process_name: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl TerminationOutcome {
    fn succeeded(pid: u32, process_name: Option<String>, message: String) -> Self {
        Self {
            success: true,
            message,
            pid,
            process_name,
            timestamp: Utc::now(),
        }
    }

    fn failed(pid: u32, process_name: Option<String>, message: String) -> Self {
        Self {
            success: false,
            message,
            pid,
            process_name,
            timestamp: Utc::now(),
        }
    }
}

/// Resolved identity of a live process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDetails {
    pub pid: u32,
    pub name: String,
}

/// Wait bounds for the escalation sequence.
#[derive(Debug, Clone, Copy)]
pub struct TerminatorConfig {
    /// Wait after the initial signal.
    pub grace: Duration,
    /// Additional wait after the escalation SIGKILL.
    pub kill_grace: Duration,
}

impl Default for TerminatorConfig {
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(3),
            kill_grace: Duration::from_secs(2),
        }
    }
}

/// Drives termination attempts and owns the audit trail they produce.
pub struct ProcessTerminator<P: SystemProbe> {
    probe: Arc<P>,
    policy: Arc<CriticalPolicy>,
    audit: AuditLog,
    config: TerminatorConfig,
    self_pid: u32,
}

impl<P: SystemProbe> ProcessTerminator<P> {
    pub fn new(probe: Arc<P>, policy: Arc<CriticalPolicy>, config: TerminatorConfig) -> Self {
        Self {
            probe,
            policy,
            audit: AuditLog::new(),
            config,
            self_pid: std::process::id(),
        }
    }

    #[cfg(test)]
    fn with_self_pid(mut self, self_pid: u32) -> Self {
        self.self_pid = self_pid;
        self
    }

    /// Attempt to terminate `pid`. `force` skips the graceful signal and goes
    /// straight to SIGKILL. `port` is carried into the audit trail only; it
    /// never influences control flow.
    pub fn terminate(&self, pid: u32, force: bool, port: Option<u16>) -> TerminationOutcome {
        let name = match self.probe.process_name(pid) {
            Ok(name) => name,
            Err(e) => return self.resolve_failure(pid, port, e),
        };

        // The critical guard outranks everything, including the self guard.
        if self.policy.is_critical_name(&name) {
            self.log(
                AuditAction::KillBlocked,
                pid,
                Some(name.clone()),
                port,
                "CRITICAL_PROCESS",
            );
            return TerminationOutcome::failed(
                pid,
                Some(name.clone()),
                format!("Cannot terminate critical system process: {name} (PID {pid})"),
            );
        }

        if pid == self.self_pid {
            self.log(
                AuditAction::KillBlocked,
                pid,
                Some(name.clone()),
                port,
                "SELF_TERMINATION",
            );
            return TerminationOutcome::failed(
                pid,
                Some(name),
                "Cannot terminate the portwarden process itself".to_string(),
            );
        }

        let (signal_result, action) = if force {
            (self.probe.signal_kill(pid), AuditAction::ForceKill)
        } else {
            (self.probe.signal_terminate(pid), AuditAction::Terminate)
        };
        if let Err(e) = signal_result {
            // the target can vanish between resolve and signal
            return self.resolve_failure(pid, port, e);
        }

        let mut exited = self.probe.wait_for_exit(pid, self.config.grace);
        if !exited && !force {
            // Escalate. A failure here usually means the process died right
            // after the wait gave up; the second wait settles it either way.
            if let Err(e) = self.probe.signal_kill(pid) {
                debug!(pid, error = %e, "escalation signal failed");
            }
            exited = self.probe.wait_for_exit(pid, self.config.kill_grace);
        }

        if exited {
            self.log(action, pid, Some(name.clone()), port, "SUCCESS");
            TerminationOutcome::succeeded(
                pid,
                Some(name.clone()),
                format!("Successfully terminated {name} (PID {pid})"),
            )
        } else {
            self.log(action, pid, Some(name.clone()), port, "TIMEOUT");
            TerminationOutcome::failed(
                pid,
                Some(name.clone()),
                format!("Process {name} (PID {pid}) did not terminate"),
            )
        }
    }

    /// Resolve a process without touching it.
    pub fn process_info(&self, pid: u32) -> Result<ProcessDetails, ProbeError> {
        self.probe
            .process_name(pid)
            .map(|name| ProcessDetails { pid, name })
    }

    /// Read-only view of the audit trail, newest first.
    pub fn recent_actions(&self, limit: usize) -> Vec<AuditEntry> {
        self.audit.recent(limit)
    }

    fn resolve_failure(&self, pid: u32, port: Option<u16>, error: ProbeError) -> TerminationOutcome {
        let (result, message) = match &error {
            ProbeError::NotFound { .. } => (
                "NOT_FOUND".to_string(),
                format!("Process with PID {pid} no longer exists (it may have already terminated)"),
            ),
            ProbeError::AccessDenied(_) => (
                "ACCESS_DENIED".to_string(),
                format!(
                    "Access denied. Insufficient permissions to terminate process {pid}. \
                     Try again with elevated privileges"
                ),
            ),
            other => (
                format!("ERROR: {other}"),
                format!("Unexpected error terminating process {pid}: {other}"),
            ),
        };
        self.log(AuditAction::KillAttempted, pid, None, port, &result);
        TerminationOutcome::failed(pid, None, message)
    }

    fn log(
        &self,
        action: AuditAction,
        pid: u32,
        process_name: Option<String>,
        port: Option<u16>,
        result: &str,
    ) {
        self.audit.append(AuditEntry {
            timestamp: Utc::now(),
            action,
            target_pid: Some(pid),
            target_process: process_name,
            target_port: port,
            result: result.to_string(),
            user: current_user(),
        });
    }
}

fn current_user() -> Option<String> {
    std::env::var("USER")
        .ok()
        .or_else(|| std::env::var("USERNAME").ok())
}
