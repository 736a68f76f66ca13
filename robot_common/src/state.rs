//! Robot state types.
//!
//! `OperationalState` uses `#[repr(u8)]` so it can be carried as a single
//! byte in diagnostics and telemetry. The snapshot types hold the values the
//! state machine caches between ticks.

use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;

// ─── Operational State ──────────────────────────────────────────────

/// Top-level robot mode.
///
/// Only one `OperationalState` is active at any time. The robot boots into
/// `StartingUp` and never returns to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum OperationalState {
    /// Hardware bring-up pending.
    #[default]
    StartingUp = 0,
    /// Actuators held disabled.
    Disabled = 1,
    /// Operator in control.
    Enabled = 2,
}

const_assert_eq!(core::mem::size_of::<OperationalState>(), 1);

impl OperationalState {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::StartingUp),
            1 => Some(Self::Disabled),
            2 => Some(Self::Enabled),
            _ => None,
        }
    }

    /// Short upper-case name used in logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::StartingUp => "STARTING_UP",
            Self::Disabled => "DISABLED",
            Self::Enabled => "ENABLED",
        }
    }
}

impl core::fmt::Display for OperationalState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Remote Link ────────────────────────────────────────────────────

/// Connectivity of the operator remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum LinkStatus {
    #[default]
    Offline = 0,
    Online = 1,
}

/// Position of the safety switch on the remote. `Down` forces a disable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum SwitchPosition {
    Up = 1,
    Middle = 3,
    #[default]
    Down = 2,
}

/// Raw stick deflection as decoded by the remote receiver.
///
/// Values are normalized, nominally in `[-1.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StickInput {
    pub left_x: f64,
    pub left_y: f64,
    pub right_x: f64,
}

// ─── Robot Snapshot ─────────────────────────────────────────────────

/// Operator input after rate limiting.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ShapedInput {
    /// Forward/backward translation.
    pub vx: f64,
    /// Lateral translation.
    pub vy: f64,
    /// Rotation.
    pub vomega: f64,
}

/// Last-commanded chassis speeds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChassisCommand {
    pub x_speed: f64,
    pub y_speed: f64,
}

/// Launcher command flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LaunchCommand {
    pub flywheel_enabled: bool,
}

/// Values cached by the robot state machine between ticks.
///
/// Collaborators only ever see this by shared reference.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RobotSnapshot {
    pub input: ShapedInput,
    pub chassis: ChassisCommand,
    pub launch: LaunchCommand,
}

impl RobotSnapshot {
    /// Zero chassis speeds and clear the flywheel flag.
    #[inline]
    pub fn make_safe(&mut self) {
        self.chassis = ChassisCommand::default();
        self.launch.flywheel_enabled = false;
    }

    /// True when no motion or launch is being commanded.
    #[inline]
    pub fn is_safe(&self) -> bool {
        self.chassis.x_speed == 0.0 && self.chassis.y_speed == 0.0 && !self.launch.flywheel_enabled
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
