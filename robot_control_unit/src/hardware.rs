//! Hardware module root.
//!
//! Collaborator traits the state machine calls into, plus a simulated
//! implementation for running without a robot.

pub mod collaborators;
pub mod sim;
