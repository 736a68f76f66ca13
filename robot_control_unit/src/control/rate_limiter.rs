//! Slew-rate limiter for operator input.
//!
//! A stick can jump from center to full deflection between two samples.
//! The limiter bounds how far its output may move per call so the chassis
//! controller never sees a step command.
//!
//! ```text
//! delta = raw - y[n-1]
//! y[n]  = raw                                 if |delta| <= max_step
//!         y[n-1] + sign(delta) × max_step     otherwise
//! ```
//!
//! A non-positive or non-finite step bound is rejected at construction with
//! `RobotError::InvalidConfiguration`. There is no clamping fallback.

use robot_common::consts::RATE_LIMIT_MAX_STEP;
use robot_common::error::RobotError;

// ─── Step Bound ─────────────────────────────────────────────────────

/// Validated per-call step bound (strictly positive, finite).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct MaxStep(f64);

impl MaxStep {
    /// Workspace default bound, shared by all axes.
    pub const DEFAULT: Self = Self(RATE_LIMIT_MAX_STEP);

    /// Validate a raw step bound.
    pub fn new(value: f64) -> Result<Self, RobotError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(RobotError::InvalidConfiguration { value })
        }
    }

    #[inline]
    pub const fn get(self) -> f64 {
        self.0
    }
}

// ─── Rate Limiter ───────────────────────────────────────────────────

/// Per-axis rate limiter state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimiter {
    /// Last emitted value.
    previous_output: f64,
    max_step: MaxStep,
}

impl RateLimiter {
    /// Create a limiter at rest (`previous_output = 0`).
    pub const fn new(max_step: MaxStep) -> Self {
        Self {
            previous_output: 0.0,
            max_step,
        }
    }

    /// Validate `max_step` and create a limiter.
    pub fn with_max_step(max_step: f64) -> Result<Self, RobotError> {
        MaxStep::new(max_step).map(Self::new)
    }

    /// Install a new step bound and return to rest.
    pub fn reinit(&mut self, max_step: MaxStep) {
        *self = Self::new(max_step);
    }

    /// Step toward `raw_target` by at most `max_step` and return the new output.
    ///
    /// A constant target is reached within `ceil(|e| / max_step)` calls when
    /// `max_step` is exact in binary (e.g. 0.125). Otherwise rounding in the
    /// repeated `prev + max_step` sum can leave a residue just above the
    /// remaining distance, costing at most one extra call.
    #[inline]
    pub fn apply(&mut self, raw_target: f64) -> f64 {
        let step = self.max_step.get();
        let delta = raw_target - self.previous_output;
        let output = if delta.abs() <= step {
            raw_target
        } else {
            self.previous_output + step.copysign(delta)
        };
        self.previous_output = output;
        output
    }

    #[inline]
    pub const fn previous_output(&self) -> f64 {
        self.previous_output
    }

    #[inline]
    pub const fn max_step(&self) -> f64 {
        self.max_step.get()
    }
}

// ─── Per-axis limiter bank ──────────────────────────────────────────

/// Step bounds for the three control axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSteps {
    pub vx: MaxStep,
    pub vy: MaxStep,
    pub vomega: MaxStep,
}

impl AxisSteps {
    /// Same bound on every axis.
    pub const fn uniform(step: MaxStep) -> Self {
        Self {
            vx: step,
            vy: step,
            vomega: step,
        }
    }
}

impl Default for AxisSteps {
    fn default() -> Self {
        Self::uniform(MaxStep::DEFAULT)
    }
}

/// One limiter per control axis. Instances are never shared between axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisLimiters {
    pub vx: RateLimiter,
    pub vy: RateLimiter,
    pub vomega: RateLimiter,
}

impl AxisLimiters {
    pub const fn new(steps: AxisSteps) -> Self {
        Self {
            vx: RateLimiter::new(steps.vx),
            vy: RateLimiter::new(steps.vy),
            vomega: RateLimiter::new(steps.vomega),
        }
    }

    /// Re-initialize all three limiters (outputs back to zero).
    pub fn reinit(&mut self, steps: AxisSteps) {
        self.vx.reinit(steps.vx);
        self.vy.reinit(steps.vy);
        self.vomega.reinit(steps.vomega);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
