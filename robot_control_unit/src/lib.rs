//! # Robot Control Unit Library
//!
//! Top-level control loop of a competition robot. A single owned
//! [`state::robot::RobotStateMachine`] sequences hardware bring-up,
//! safety-disable and operator control, one handler per tick.
//!
//! ## Layout
//!
//! 1. **control**: input shaping (per-axis rate limiters)
//! 2. **state**: the robot-level state machine
//! 3. **hardware**: collaborator traits and a simulated backend
//! 4. **cycle**: periodic tick driver with timing statistics
//! 5. **config**: TOML configuration for the binary
//!
//! ## Execution Model
//!
//! Ticks run to completion on one thread. All state lives in the state
//! machine value; collaborators receive it by shared reference only.

pub mod config;
pub mod control;
pub mod cycle;
pub mod hardware;
pub mod state;
