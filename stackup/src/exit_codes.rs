//! Stable exit codes for `stackup` commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Invalid input or environment: unknown feature, bad config, held lock.
pub const INVALID: i32 = 1;
/// A feature was rejected by validation (missing requirement or conflict).
pub const REJECTED: i32 = 2;
/// A feature's step failed after validation passed.
pub const STEP_FAILED: i32 = 3;
