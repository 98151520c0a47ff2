//! Exit codes for opsctl.

/// Exit code for success, including success with zero findings.
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code when a diagnostic check fails or its input is missing.
pub const EXIT_CHECK_FAILED: i32 = 1;
