//! Process exit codes

/// Successful termination, including a user abort
pub const OK: i32 = 0;

/// Any fatal error
pub const FAILURE: i32 = 1;
