//! System-wide constants for the robot workspace.
//!
//! Single source of truth for numeric defaults and default paths.

/// Default control tick period in microseconds (1 kHz = 1000 µs).
pub const TICK_PERIOD_US: u64 = 1000;

/// Default rate limiter step per tick, in normalized stick units.
///
/// Shared by all three control axes unless overridden in `[limiter]`.
pub const RATE_LIMIT_MAX_STEP: f64 = 0.002;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/robot.toml";
