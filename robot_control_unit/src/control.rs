//! Control engine root.
//!
//! Input shaping applied to operator commands before they reach the
//! chassis controller.

pub mod rate_limiter;
