//! TOML configuration for the control unit binary.
//!
//! ```toml
//! [shared]
//! log_level = "info"
//! service_name = "robot-cu"
//!
//! [cycle]
//! tick_period_us = 1000
//! overrun_is_fatal = false
//!
//! [limiter]
//! vx = 0.002
//! vy = 0.002
//! vomega = 0.002
//! ```
//!
//! Every section is optional. Validation rejects a zero tick period, an
//! empty service name and any non-positive or non-finite limiter step.

use std::path::Path;

use robot_common::config::{ConfigError, ConfigLoader, SharedConfig};
use robot_common::consts::{RATE_LIMIT_MAX_STEP, TICK_PERIOD_US};
use serde::{Deserialize, Serialize};

use crate::control::rate_limiter::{AxisSteps, MaxStep};

// ─── Sections ───────────────────────────────────────────────────────

/// `[cycle]`: tick pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CycleConfig {
    /// Tick period [µs].
    pub tick_period_us: u64,
    /// Abort the loop on the first overrun (rt builds only).
    pub overrun_is_fatal: bool,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            tick_period_us: TICK_PERIOD_US,
            overrun_is_fatal: false,
        }
    }
}

/// `[limiter]`: per-axis rate limiter step, in stick units per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimiterConfig {
    pub vx: f64,
    pub vy: f64,
    pub vomega: f64,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            vx: RATE_LIMIT_MAX_STEP,
            vy: RATE_LIMIT_MAX_STEP,
            vomega: RATE_LIMIT_MAX_STEP,
        }
    }
}

impl LimiterConfig {
    /// Validate and convert into per-axis step bounds.
    pub fn axis_steps(&self) -> Result<AxisSteps, ConfigError> {
        let step = |name: &str, value: f64| {
            MaxStep::new(value)
                .map_err(|e| ConfigError::ValidationError(format!("limiter.{name}: {e}")))
        };
        Ok(AxisSteps {
            vx: step("vx", self.vx)?,
            vy: step("vy", self.vy)?,
            vomega: step("vomega", self.vomega)?,
        })
    }
}

// ─── Root ───────────────────────────────────────────────────────────

/// Complete control unit configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub shared: SharedConfig,
    pub cycle: CycleConfig,
    pub limiter: LimiterConfig,
}

impl RobotConfig {
    /// Check all semantic constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        if self.cycle.tick_period_us == 0 {
            return Err(ConfigError::ValidationError(
                "cycle.tick_period_us must be > 0".to_string(),
            ));
        }
        self.limiter.axis_steps()?;
        Ok(())
    }
}

/// Validated configuration bundle, ready for runtime use.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: RobotConfig,
    pub steps: AxisSteps,
}

impl LoadedConfig {
    fn from_config(config: RobotConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let steps = config.limiter.axis_steps()?;
        Ok(Self { config, steps })
    }

    /// Built-in defaults (used when no config file is present).
    pub fn defaults() -> Self {
        Self {
            steps: AxisSteps::default(),
            config: RobotConfig::default(),
        }
    }
}

/// Load and validate the configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    LoadedConfig::from_config(RobotConfig::load(path)?)
}

/// Load and validate the configuration from a TOML string (for testing).
pub fn load_config_from_str(toml: &str) -> Result<LoadedConfig, ConfigError> {
    LoadedConfig::from_config(RobotConfig::from_toml(toml)?)
}

// ─── Tests ──────────────────────────────────────────────────────────
