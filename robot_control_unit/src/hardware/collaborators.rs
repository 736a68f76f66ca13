//! Collaborator traits.
//!
//! The state machine never touches hardware directly. Every subsystem it
//! drives is reached through one of these traits, so a test double or the
//! simulated backend can stand in for the real robot.
//!
//! # Call Points
//!
//! | Trait | Called from | Frequency |
//! |-------|-------------|-----------|
//! | `Bringup` | `StartingUp` | once per method |
//! | `MotorBus` | `Disabled` | every disabled tick / on enable |
//! | `RemoteLink` | `Disabled`, `Enabled` | sampled every tick |
//! | `Telemetry` | `Enabled` | once per tick, before control steps |
//! | `ControlLoops` | `Enabled` | once per tick |
//! | `FatalHandler` | dispatch | on invalid state, never returns |

use robot_common::error::RobotError;
use robot_common::state::{
    LinkStatus, OperationalState, RobotSnapshot, StickInput, SwitchPosition,
};

/// Hardware bring-up entry points, each called exactly once during startup.
pub trait Bringup {
    fn init_chassis(&mut self);
    fn init_gimbal(&mut self);
    fn init_launch(&mut self);
    /// Remote receiver UART.
    fn init_remote(&mut self);
    /// CAN motor-bus service.
    fn init_can_bus(&mut self);
    /// Referee/telemetry UART link.
    fn init_referee(&mut self);
    /// Supercapacitor power module.
    fn init_supercap(&mut self);
}

/// Bulk actuator enable/disable on the motor bus.
pub trait MotorBus {
    fn enable_all(&mut self);
    fn disable_all(&mut self);
}

/// Read-only view of the operator remote.
pub trait RemoteLink {
    fn link_status(&self) -> LinkStatus;
    fn safety_switch(&self) -> SwitchPosition;
    fn sticks(&self) -> StickInput;
}

/// True when a remote sample permits enabling: online and switch not down.
#[inline]
pub const fn permits_enable(link: LinkStatus, switch: SwitchPosition) -> bool {
    matches!(link, LinkStatus::Online) && !matches!(switch, SwitchPosition::Down)
}

/// Referee/telemetry publisher.
pub trait Telemetry {
    fn publish_state(&mut self, state: OperationalState, snapshot: &RobotSnapshot);
}

/// Subsystem control steps, one call each per enabled tick.
pub trait ControlLoops {
    fn chassis_step(&mut self, snapshot: &RobotSnapshot);
    fn gimbal_step(&mut self, snapshot: &RobotSnapshot);
    fn launch_step(&mut self, snapshot: &RobotSnapshot);
}

/// Unrecoverable error sink. Implementations halt or reset the system.
pub trait FatalHandler {
    fn fatal(&mut self, error: RobotError) -> !;
}

/// Everything the robot state machine needs from the outside world.
pub trait RobotHardware:
    Bringup + MotorBus + RemoteLink + Telemetry + ControlLoops + FatalHandler
{
}

impl<T> RobotHardware for T where
    T: Bringup + MotorBus + RemoteLink + Telemetry + ControlLoops + FatalHandler
{
}
