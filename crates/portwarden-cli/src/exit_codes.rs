//! Process exit codes. Part of the scripting contract, keep stable.

pub const SUCCESS: i32 = 0;
pub const INTERNAL_ERROR: i32 = 2;
/// At least one termination target failed.
pub const KILL_FAILED: i32 = 30;
