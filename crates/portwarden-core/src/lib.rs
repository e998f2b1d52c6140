//! Socket inventory and safety-gated process termination engine.
//!
//! - [`policy`]: which process names and port numbers must never be
//!   terminated.
//! - [`probe`]: the narrow OS interface (socket tables, process names,
//!   signals, exit waits) plus the production [`probe::HostProbe`].
//! - [`inventory`]: builds the deduplicated, sorted socket snapshot and the
//!   derived filter/stats views.
//! - [`audit`]: the append-only, bounded action log.
//! - [`termination`]: the escalating terminate/wait/force-kill state machine
//!   with its safety guards.
//!
//! Nothing in here performs background work; every snapshot and every
//! termination attempt is a single blocking sequence of OS calls. Callers
//! always get a structured value back. OS failures during a termination
//! attempt are folded into a failed [`termination::TerminationOutcome`],
//! never raised.

pub mod audit;
pub mod inventory;
pub mod policy;
pub mod probe;
pub mod termination;

pub use audit::{AuditAction, AuditEntry, AuditLog};
pub use inventory::types::{Protocol, SocketRecord, SocketState, SystemStats};
pub use inventory::{filter_records, snapshot_stats, InventoryScanner, SocketFilter};
pub use policy::CriticalPolicy;
pub use probe::{HostProbe, ProbeError, RawSocket, SystemProbe};
pub use termination::{
    ProcessDetails, ProcessTerminator, TerminationOutcome, TerminatorConfig,
};
