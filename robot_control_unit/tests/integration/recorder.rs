//! Recording hardware double shared by the integration tests.

use robot_common::error::RobotError;
use robot_common::state::{
    LinkStatus, OperationalState, RobotSnapshot, StickInput, SwitchPosition,
};
use robot_control_unit::control::rate_limiter::{AxisSteps, MaxStep};
use robot_control_unit::hardware::collaborators::{
    Bringup, ControlLoops, FatalHandler, MotorBus, RemoteLink, Telemetry,
};
use robot_control_unit::state::robot::RobotStateMachine;

/// One collaborator call, in the order the state machine made it.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    InitChassis,
    InitGimbal,
    InitLaunch,
    InitRemote,
    InitCanBus,
    InitReferee,
    InitSupercap,
    EnableAll,
    DisableAll,
    Publish(OperationalState),
    ChassisStep(RobotSnapshot),
    GimbalStep,
    LaunchStep,
}

/// Records every call; the remote is set directly by the test.
#[derive(Debug, Default)]
pub struct Recorder {
    pub link: LinkStatus,
    pub switch: SwitchPosition,
    pub sticks: StickInput,
    pub calls: Vec<Call>,
    pub fatal_errors: Vec<RobotError>,
}

impl Recorder {
    pub fn online() -> Self {
        Self {
            link: LinkStatus::Online,
            switch: SwitchPosition::Middle,
            ..Default::default()
        }
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn control_steps(&self) -> usize {
        self.count(|c| {
            matches!(
                c,
                Call::ChassisStep(_) | Call::GimbalStep | Call::LaunchStep
            )
        })
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Bringup for Recorder {
    fn init_chassis(&mut self) {
        self.calls.push(Call::InitChassis);
    }
    fn init_gimbal(&mut self) {
        self.calls.push(Call::InitGimbal);
    }
    fn init_launch(&mut self) {
        self.calls.push(Call::InitLaunch);
    }
    fn init_remote(&mut self) {
        self.calls.push(Call::InitRemote);
    }
    fn init_can_bus(&mut self) {
        self.calls.push(Call::InitCanBus);
    }
    fn init_referee(&mut self) {
        self.calls.push(Call::InitReferee);
    }
    fn init_supercap(&mut self) {
        self.calls.push(Call::InitSupercap);
    }
}

impl MotorBus for Recorder {
    fn enable_all(&mut self) {
        self.calls.push(Call::EnableAll);
    }
    fn disable_all(&mut self) {
        self.calls.push(Call::DisableAll);
    }
}

impl RemoteLink for Recorder {
    fn link_status(&self) -> LinkStatus {
        self.link
    }
    fn safety_switch(&self) -> SwitchPosition {
        self.switch
    }
    fn sticks(&self) -> StickInput {
        self.sticks
    }
}

impl Telemetry for Recorder {
    fn publish_state(&mut self, state: OperationalState, _snapshot: &RobotSnapshot) {
        self.calls.push(Call::Publish(state));
    }
}

impl ControlLoops for Recorder {
    fn chassis_step(&mut self, snapshot: &RobotSnapshot) {
        self.calls.push(Call::ChassisStep(*snapshot));
    }
    fn gimbal_step(&mut self, _snapshot: &RobotSnapshot) {
        self.calls.push(Call::GimbalStep);
    }
    fn launch_step(&mut self, _snapshot: &RobotSnapshot) {
        self.calls.push(Call::LaunchStep);
    }
}

impl FatalHandler for Recorder {
    fn fatal(&mut self, error: RobotError) -> ! {
        self.fatal_errors.push(error);
        panic!("robot halted: {error}");
    }
}

/// Machine with an exactly representable step so outputs compare exactly.
pub fn machine_with_step(step: f64) -> RobotStateMachine {
    RobotStateMachine::new(AxisSteps::uniform(MaxStep::new(step).unwrap()))
}

/// Machine already past startup, sitting in `Disabled`.
pub fn disabled_machine(step: f64) -> RobotStateMachine {
    let mut sm = machine_with_step(step);
    sm.tick(&mut Recorder::default());
    assert_eq!(sm.state(), Some(OperationalState::Disabled));
    sm
}

/// Machine in `Enabled` (startup + one disabled tick with the remote online).
pub fn enabled_machine(step: f64) -> RobotStateMachine {
    let mut sm = disabled_machine(step);
    sm.tick(&mut Recorder::online());
    assert_eq!(sm.state(), Some(OperationalState::Enabled));
    sm
}
