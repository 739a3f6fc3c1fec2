// Process exit codes (No magic values)
// Errors start at 11; a child's own nonzero code is forwarded unchanged

/// Success
pub const EXIT_OK: i32 = 0;

/// Generic failure (e.g. env file could not be written)
pub const EXIT_ERROR: i32 = 11;

/// Flag or argument misuse (missing command, bad deployment flags)
pub const EXIT_PARSE_FLAGS_ERROR: i32 = 12;

/// Supervisor could not launch the child
pub const EXIT_RUNNER_ERROR: i32 = 13;

/// Resolution failed (bad peers or store unreachable)
pub const EXIT_RESOLUTION_ERROR: i32 = 14;
