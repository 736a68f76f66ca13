//! Error taxonomy for the control core.
//!
//! Only two conditions are errors. A lost remote link or a switch in the
//! `Down` position are ordinary state transitions and never show up here.

use thiserror::Error;

/// Errors raised by the rate limiter and the robot state machine.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RobotError {
    /// Rate limiter step bound is not a positive finite number.
    #[error("invalid rate limiter max_step {value} (must be > 0 and finite)")]
    InvalidConfiguration {
        /// Rejected value.
        value: f64,
    },

    /// Operational state byte outside the defined states. Unrecoverable.
    #[error("invalid operational state {0:#04x}")]
    InvalidState(u8),
}
