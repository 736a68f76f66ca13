//! Integration test: undefined operational state.
//!
//! The fatal handler never returns, so the recorder panics and the test
//! catches the unwind to inspect what happened before it.

use std::panic::{AssertUnwindSafe, catch_unwind};

use robot_common::error::RobotError;
use robot_common::state::OperationalState;

use super::recorder::{Recorder, enabled_machine, machine_with_step};

#[test]
fn out_of_range_state_calls_fatal_once() {
    let mut sm = enabled_machine(0.25);
    sm.force_raw_state(3);
    let mut hw = Recorder::online();

    let result = catch_unwind(AssertUnwindSafe(|| sm.tick(&mut hw)));

    assert!(result.is_err());
    assert_eq!(hw.fatal_errors, vec![RobotError::InvalidState(3)]);
    assert!(hw.calls.is_empty(), "handler ran: {:?}", hw.calls);
}

#[test]
fn fatal_path_leaves_context_untouched() {
    let mut sm = machine_with_step(0.25);
    sm.force_raw_state(0xFF);
    let before = sm.snapshot().to_owned();

    let mut hw = Recorder::online();
    let _ = catch_unwind(AssertUnwindSafe(|| sm.tick(&mut hw)));

    assert_eq!(sm.raw_state(), 0xFF);
    assert_eq!(sm.state(), None);
    assert_eq!(*sm.snapshot(), before);
    assert_eq!(hw.fatal_errors.len(), 1);
}

#[test]
fn restored_valid_state_resumes() {
    let mut sm = machine_with_step(0.25);
    sm.force_raw_state(OperationalState::Disabled as u8);
    let mut hw = Recorder::online();
    assert_eq!(sm.tick(&mut hw).to, OperationalState::Enabled);
    assert!(hw.fatal_errors.is_empty());
}
