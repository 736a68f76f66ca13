//! Robot-level state machine.
//!
//! StartingUp → Disabled ↔ Enabled. One handler runs per tick, selected by
//! the current state, and returns the state for the next tick.
//!
//! | State | Condition | Action | Next |
//! |-------|-----------|--------|------|
//! | StartingUp | always | bring up all hardware, re-init limiters | Disabled |
//! | Disabled | link online ∧ switch ≠ Down | disable, make safe, enable all | Enabled |
//! | Disabled | otherwise | disable, make safe | Disabled |
//! | Enabled | link offline ∨ switch = Down | - | Disabled |
//! | Enabled | otherwise | telemetry, shape input, control steps | Enabled |
//!
//! The state is stored as its `u8` wire value. An undefined value goes to
//! the fatal handler before any handler logic runs.

use robot_common::error::RobotError;
use robot_common::state::{
    ChassisCommand, LaunchCommand, OperationalState, RobotSnapshot, ShapedInput,
};
use tracing::{debug, error, info, trace};

use crate::control::rate_limiter::{AxisLimiters, AxisSteps};
use crate::hardware::collaborators::{RobotHardware, permits_enable};

/// State before and after one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: OperationalState,
    pub to: OperationalState,
}

impl Transition {
    #[inline]
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Owned robot context: operational state, snapshot and input limiters.
#[derive(Debug, Clone)]
pub struct RobotStateMachine {
    state: u8,
    snapshot: RobotSnapshot,
    limiters: AxisLimiters,
    steps: AxisSteps,
}

impl RobotStateMachine {
    /// Create a machine in `StartingUp` with the given per-axis step bounds.
    pub const fn new(steps: AxisSteps) -> Self {
        Self {
            state: OperationalState::StartingUp as u8,
            snapshot: RobotSnapshot {
                input: ShapedInput {
                    vx: 0.0,
                    vy: 0.0,
                    vomega: 0.0,
                },
                chassis: ChassisCommand {
                    x_speed: 0.0,
                    y_speed: 0.0,
                },
                launch: LaunchCommand {
                    flywheel_enabled: false,
                },
            },
            limiters: AxisLimiters::new(steps),
            steps,
        }
    }

    /// Current state, or `None` if the stored byte is undefined.
    #[inline]
    pub const fn state(&self) -> Option<OperationalState> {
        OperationalState::from_u8(self.state)
    }

    /// Raw state byte as carried in diagnostics.
    #[inline]
    pub const fn raw_state(&self) -> u8 {
        self.state
    }

    #[inline]
    pub const fn snapshot(&self) -> &RobotSnapshot {
        &self.snapshot
    }

    /// Mutable snapshot access for the owner of the machine.
    ///
    /// Collaborators never receive this; they get `&RobotSnapshot`.
    #[inline]
    pub fn snapshot_mut(&mut self) -> &mut RobotSnapshot {
        &mut self.snapshot
    }

    #[inline]
    pub const fn limiters(&self) -> &AxisLimiters {
        &self.limiters
    }

    #[inline]
    pub const fn steps(&self) -> AxisSteps {
        self.steps
    }

    /// Overwrite the raw state byte (fault injection, diagnostics restore).
    pub fn force_raw_state(&mut self, raw: u8) {
        self.state = raw;
    }

    /// Run one tick: dispatch to exactly one handler.
    ///
    /// Never returns if the stored state is undefined; the fatal handler is
    /// called instead.
    pub fn tick<H: RobotHardware + ?Sized>(&mut self, hw: &mut H) -> Transition {
        let from = match OperationalState::from_u8(self.state) {
            Some(state) => state,
            None => {
                let err = RobotError::InvalidState(self.state);
                error!("FATAL: {err}");
                hw.fatal(err)
            }
        };

        let to = match from {
            OperationalState::StartingUp => self.handle_starting_up(hw),
            OperationalState::Disabled => self.handle_disabled(hw),
            OperationalState::Enabled => self.handle_enabled(hw),
        };

        self.state = to as u8;
        if to != from {
            info!("Robot state {from} -> {to}");
        }
        Transition { from, to }
    }

    fn handle_starting_up<H: RobotHardware + ?Sized>(&mut self, hw: &mut H) -> OperationalState {
        info!("Bringing up hardware");
        hw.init_chassis();
        hw.init_gimbal();
        hw.init_launch();
        hw.init_remote();
        hw.init_can_bus();
        hw.init_referee();
        hw.init_supercap();

        self.limiters.reinit(self.steps);
        debug!(
            "Rate limiters ready (vx={}, vy={}, vomega={})",
            self.steps.vx.get(),
            self.steps.vy.get(),
            self.steps.vomega.get()
        );

        OperationalState::Disabled
    }

    fn handle_disabled<H: RobotHardware + ?Sized>(&mut self, hw: &mut H) -> OperationalState {
        hw.disable_all();
        self.snapshot.make_safe();

        if permits_enable(hw.link_status(), hw.safety_switch()) {
            debug!("Remote online, switch released: enabling actuators");
            hw.enable_all();
            OperationalState::Enabled
        } else {
            OperationalState::Disabled
        }
    }

    fn handle_enabled<H: RobotHardware + ?Sized>(&mut self, hw: &mut H) -> OperationalState {
        let link = hw.link_status();
        let switch = hw.safety_switch();
        if !permits_enable(link, switch) {
            debug!("Disable requested (link={link:?}, switch={switch:?})");
            return OperationalState::Disabled;
        }

        hw.publish_state(OperationalState::Enabled, &self.snapshot);
        self.shape_input(hw);
        hw.chassis_step(&self.snapshot);
        hw.gimbal_step(&self.snapshot);
        hw.launch_step(&self.snapshot);

        OperationalState::Enabled
    }

    fn shape_input<H: RobotHardware + ?Sized>(&mut self, hw: &H) {
        let sticks = hw.sticks();
        self.snapshot.input = ShapedInput {
            vx: self.limiters.vx.apply(sticks.left_x),
            vy: self.limiters.vy.apply(sticks.left_y),
            vomega: self.limiters.vomega.apply(sticks.right_x),
        };
        trace!(input = ?self.snapshot.input, "shaped input");
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
