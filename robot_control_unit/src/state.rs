//! State machine module root.

pub mod robot;
