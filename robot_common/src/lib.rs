//! Robot Common Library
//!
//! Shared types for the robot control unit: the operational state enum,
//! the robot snapshot, remote-link readings, error types and configuration
//! loading.
//!
//! # Module Structure
//!
//! - [`state`] - Operational state, snapshot and remote-link types
//! - [`error`] - Control-core error taxonomy
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - System-wide defaults

pub mod config;
pub mod consts;
pub mod error;
pub mod state;
