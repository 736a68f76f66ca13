//! Integration test: startup sequence.
//!
//! Validates: config → state machine construction → one StartingUp tick
//! initializes every subsystem exactly once and lands in Disabled.

use robot_common::consts::RATE_LIMIT_MAX_STEP;
use robot_common::state::OperationalState;
use robot_control_unit::config::load_config_from_str;
use robot_control_unit::state::robot::RobotStateMachine;

use super::recorder::{Call, Recorder, machine_with_step};

#[test]
fn startup_initializes_each_subsystem_once_in_order() {
    let mut sm = machine_with_step(0.25);
    let mut hw = Recorder::online();

    let t = sm.tick(&mut hw);

    assert_eq!(t.from, OperationalState::StartingUp);
    assert_eq!(t.to, OperationalState::Disabled);
    assert_eq!(
        hw.calls,
        vec![
            Call::InitChassis,
            Call::InitGimbal,
            Call::InitLaunch,
            Call::InitRemote,
            Call::InitCanBus,
            Call::InitReferee,
            Call::InitSupercap,
        ]
    );
}

#[test]
fn startup_does_not_enable_even_when_remote_ready() {
    let mut sm = machine_with_step(0.25);
    let mut hw = Recorder::online();
    sm.tick(&mut hw);
    assert_eq!(hw.count(|c| *c == Call::EnableAll), 0);
    assert_eq!(hw.control_steps(), 0);
}

#[test]
fn startup_limiters_share_configured_step() {
    let config = load_config_from_str("").unwrap();
    let mut sm = RobotStateMachine::new(config.steps);
    sm.tick(&mut Recorder::default());

    let lim = sm.limiters();
    for l in [&lim.vx, &lim.vy, &lim.vomega] {
        assert_eq!(l.max_step(), RATE_LIMIT_MAX_STEP);
        assert_eq!(l.previous_output(), 0.0);
    }
}

#[test]
fn init_runs_only_once_over_many_ticks() {
    let mut sm = machine_with_step(0.25);
    let mut hw = Recorder::online();
    for _ in 0..50 {
        sm.tick(&mut hw);
    }
    assert_eq!(hw.count(|c| *c == Call::InitChassis), 1);
    assert_eq!(hw.count(|c| *c == Call::InitSupercap), 1);
}
