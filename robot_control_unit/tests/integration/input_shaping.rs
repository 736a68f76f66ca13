//! Integration test: stick input → rate limiters → snapshot → chassis.

use robot_common::state::{LinkStatus, StickInput};
use robot_control_unit::control::rate_limiter::{AxisSteps, MaxStep};
use robot_control_unit::state::robot::RobotStateMachine;

use super::recorder::{Call, Recorder, enabled_machine};

#[test]
fn stick_step_is_slewed() {
    let mut sm = enabled_machine(0.25);
    let mut hw = Recorder::online();
    hw.sticks = StickInput {
        left_x: 1.0,
        left_y: -1.0,
        right_x: 0.5,
    };

    let expected = [
        (0.25, -0.25, 0.25),
        (0.5, -0.5, 0.5),
        (0.75, -0.75, 0.5),
        (1.0, -1.0, 0.5),
        (1.0, -1.0, 0.5),
    ];
    for (vx, vy, vomega) in expected {
        sm.tick(&mut hw);
        let input = sm.snapshot().input;
        assert_eq!((input.vx, input.vy, input.vomega), (vx, vy, vomega));
    }
}

#[test]
fn chassis_sees_shaped_values() {
    let mut sm = enabled_machine(0.25);
    let mut hw = Recorder::online();
    hw.sticks.left_x = 1.0;

    sm.tick(&mut hw);

    let seen = hw
        .calls
        .iter()
        .find_map(|c| match c {
            Call::ChassisStep(snap) => Some(*snap),
            _ => None,
        })
        .expect("chassis step called");
    assert_eq!(seen.input.vx, 0.25);
    assert_eq!(seen.input, sm.snapshot().input);
}

#[test]
fn large_vx_steps_leave_other_axes_untouched() {
    let mut sm = enabled_machine(0.125);
    let mut hw = Recorder::online();
    hw.sticks.left_x = 100.0;

    for _ in 0..20 {
        sm.tick(&mut hw);
    }

    let lim = sm.limiters();
    assert_eq!(lim.vx.previous_output(), 2.5);
    assert_eq!(lim.vy.previous_output(), 0.0);
    assert_eq!(lim.vomega.previous_output(), 0.0);
}

#[test]
fn per_axis_steps_apply_independently() {
    let steps = AxisSteps {
        vx: MaxStep::new(0.5).unwrap(),
        vy: MaxStep::new(0.25).unwrap(),
        vomega: MaxStep::new(0.125).unwrap(),
    };
    let mut sm = RobotStateMachine::new(steps);
    let mut hw = Recorder::online();
    sm.tick(&mut hw);
    sm.tick(&mut hw);

    hw.sticks = StickInput {
        left_x: 1.0,
        left_y: 1.0,
        right_x: 1.0,
    };
    sm.tick(&mut hw);

    let input = sm.snapshot().input;
    assert_eq!(input.vx, 0.5);
    assert_eq!(input.vy, 0.25);
    assert_eq!(input.vomega, 0.125);
}

#[test]
fn limiter_state_survives_disable() {
    let mut sm = enabled_machine(0.25);
    let mut hw = Recorder::online();
    hw.sticks.left_x = 1.0;
    sm.tick(&mut hw);
    sm.tick(&mut hw);

    hw.link = LinkStatus::Offline;
    sm.tick(&mut hw);
    sm.tick(&mut hw);
    hw.link = LinkStatus::Online;
    sm.tick(&mut hw);

    // Shaping resumes from the last emitted value.
    sm.tick(&mut hw);
    assert_eq!(sm.snapshot().input.vx, 0.75);
}
