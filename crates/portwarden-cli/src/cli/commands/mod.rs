pub mod dispatch;
pub mod inspect;
pub mod kill;
pub mod ports;
pub mod stats;

pub use dispatch::dispatch;

use portwarden_core::{CriticalPolicy, HostProbe, InventoryScanner};
use std::sync::Arc;

/// One scanner per invocation; the policy is the built-in protection set.
pub(crate) fn scanner() -> InventoryScanner<HostProbe> {
    InventoryScanner::new(
        Arc::new(HostProbe::new()),
        Arc::new(CriticalPolicy::builtin()),
    )
}
