//! Standard exit codes for CLI operations
//!
//! Code 2 is left to clap, which uses it for argument parsing errors.

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Tool error - helm, yq, curl or the container runtime failed
pub const TOOL_ERROR: i32 = 3;

/// Chart error - no chart at the given directory, or unreadable Chart.yaml
pub const CHART_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Probe error - the registry gave no clear answer whether a chart exists
pub const PROBE_ERROR: i32 = 6;

/// Auth error - registry login failed
pub const AUTH_ERROR: i32 = 7;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;

/// Config error - invalid settings file or override (sysexits.h EX_CONFIG)
pub const CONFIG_ERROR: i32 = 78;
