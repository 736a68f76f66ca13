//! Simulated robot hardware.
//!
//! `SimulatedHardware` implements every collaborator trait so the control
//! unit can run on a development host. The remote comes online after a
//! configurable delay with the safety switch in `Middle` and sweeps the
//! sticks sinusoidally. Telemetry is serialized to JSON and logged at trace
//! level.

use std::time::{Duration, Instant};

use robot_common::error::RobotError;
use robot_common::state::{
    LinkStatus, OperationalState, RobotSnapshot, ShapedInput, StickInput, SwitchPosition,
};
use tracing::{debug, error, info, trace, warn};

use super::collaborators::{Bringup, ControlLoops, FatalHandler, MotorBus, RemoteLink, Telemetry};

/// Call counters, exposed for diagnostics and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimCounters {
    /// Bring-up calls, in order of arrival.
    pub inits: Vec<&'static str>,
    pub enables: u64,
    pub disables: u64,
    pub published: u64,
    pub chassis_steps: u64,
    pub gimbal_steps: u64,
    pub launch_steps: u64,
}

/// Simulated remote script.
#[derive(Debug, Clone, Copy)]
pub struct RemoteScript {
    /// Time after start before the link reports `Online`.
    pub link_delay: Duration,
    /// Switch position once online.
    pub switch: SwitchPosition,
    /// Stick sweep period. Zero holds the sticks centered.
    pub sweep_period: Duration,
}

impl Default for RemoteScript {
    fn default() -> Self {
        Self {
            link_delay: Duration::from_millis(500),
            switch: SwitchPosition::Middle,
            sweep_period: Duration::from_secs(4),
        }
    }
}

/// Software stand-in for the robot's subsystems.
pub struct SimulatedHardware {
    script: RemoteScript,
    start_time: Instant,
    motors_enabled: bool,
    counters: SimCounters,
    last_telemetry: Option<String>,
    last_input: ShapedInput,
}

impl SimulatedHardware {
    pub fn new(script: RemoteScript) -> Self {
        Self {
            script,
            start_time: Instant::now(),
            motors_enabled: false,
            counters: SimCounters::default(),
            last_telemetry: None,
            last_input: ShapedInput::default(),
        }
    }

    #[inline]
    pub fn counters(&self) -> &SimCounters {
        &self.counters
    }

    #[inline]
    pub fn motors_enabled(&self) -> bool {
        self.motors_enabled
    }

    /// Last telemetry frame as JSON.
    pub fn last_telemetry(&self) -> Option<&str> {
        self.last_telemetry.as_deref()
    }

    /// Shaped input seen by the last chassis step.
    pub fn last_input(&self) -> ShapedInput {
        self.last_input
    }

    fn record_init(&mut self, name: &'static str) {
        if self.counters.inits.contains(&name) {
            warn!("{name} initialized more than once");
        }
        self.counters.inits.push(name);
        info!("Simulated {name} ready");
    }

    fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Default for SimulatedHardware {
    fn default() -> Self {
        Self::new(RemoteScript::default())
    }
}

impl Bringup for SimulatedHardware {
    fn init_chassis(&mut self) {
        self.record_init("chassis");
    }

    fn init_gimbal(&mut self) {
        self.record_init("gimbal");
    }

    fn init_launch(&mut self) {
        self.record_init("launch");
    }

    fn init_remote(&mut self) {
        self.record_init("remote");
    }

    fn init_can_bus(&mut self) {
        self.record_init("can_bus");
    }

    fn init_referee(&mut self) {
        self.record_init("referee");
    }

    fn init_supercap(&mut self) {
        self.record_init("supercap");
    }
}

impl MotorBus for SimulatedHardware {
    fn enable_all(&mut self) {
        self.counters.enables += 1;
        self.motors_enabled = true;
        debug!("Motors enabled");
    }

    fn disable_all(&mut self) {
        self.counters.disables += 1;
        if self.motors_enabled {
            debug!("Motors disabled");
        }
        self.motors_enabled = false;
    }
}

impl RemoteLink for SimulatedHardware {
    fn link_status(&self) -> LinkStatus {
        if self.elapsed() >= self.script.link_delay {
            LinkStatus::Online
        } else {
            LinkStatus::Offline
        }
    }

    fn safety_switch(&self) -> SwitchPosition {
        match self.link_status() {
            LinkStatus::Online => self.script.switch,
            LinkStatus::Offline => SwitchPosition::Down,
        }
    }

    fn sticks(&self) -> StickInput {
        if self.script.sweep_period.is_zero() {
            return StickInput::default();
        }
        let phase = self.elapsed().as_secs_f64() / self.script.sweep_period.as_secs_f64()
            * core::f64::consts::TAU;
        StickInput {
            left_x: phase.sin(),
            left_y: phase.cos(),
            right_x: (0.5 * phase).sin(),
        }
    }
}

impl Telemetry for SimulatedHardware {
    fn publish_state(&mut self, state: OperationalState, snapshot: &RobotSnapshot) {
        self.counters.published += 1;
        match serde_json::to_string(&(state, snapshot)) {
            Ok(json) => {
                trace!(target: "telemetry", "{json}");
                self.last_telemetry = Some(json);
            }
            Err(e) => warn!("telemetry encode failed: {e}"),
        }
    }
}

impl ControlLoops for SimulatedHardware {
    fn chassis_step(&mut self, snapshot: &RobotSnapshot) {
        self.counters.chassis_steps += 1;
        self.last_input = snapshot.input;
    }

    fn gimbal_step(&mut self, _snapshot: &RobotSnapshot) {
        self.counters.gimbal_steps += 1;
    }

    fn launch_step(&mut self, _snapshot: &RobotSnapshot) {
        self.counters.launch_steps += 1;
    }
}

impl FatalHandler for SimulatedHardware {
    fn fatal(&mut self, err: RobotError) -> ! {
        error!("Simulated robot halted: {err}");
        std::process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
