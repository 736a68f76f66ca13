//! Periodic tick driver.
//!
//! Calls `RobotStateMachine::tick` once per configured period, measures
//! each tick and counts overruns.
//!
//! ## RT Setup Sequence
//! 1. `mlockall(MCL_CURRENT | MCL_FUTURE)`: lock all pages.
//! 2. Prefault stack pages.
//! 3. `sched_setaffinity`: pin to isolated CPU core.
//! 4. `sched_setscheduler(SCHED_FIFO, prio)`: RT priority.
//!
//! ## Loop
//! Absolute-time sleep on `CLOCK_MONOTONIC` for drift-free pacing (`rt`),
//! `std::thread::sleep` for the remaining period otherwise. The loop exits
//! when the shutdown flag is cleared or the tick budget is spent.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

use crate::config::LoadedConfig;
use crate::hardware::collaborators::RobotHardware;
use crate::state::robot::{RobotStateMachine, Transition};

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-tick timing statistics.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total ticks executed.
    pub cycle_count: u64,
    /// Last tick duration [ns].
    pub last_cycle_ns: i64,
    /// Minimum tick duration [ns].
    pub min_cycle_ns: i64,
    /// Maximum tick duration [ns].
    pub max_cycle_ns: i64,
    /// Running sum for average computation.
    pub sum_cycle_ns: i64,
    /// Number of overruns detected.
    pub overruns: u64,
    /// Maximum wake-up latency [ns] (time between expected and actual wake).
    pub max_latency_ns: i64,
}

impl CycleStats {
    /// Create a new zeroed stats instance.
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
            max_latency_ns: 0,
        }
    }

    /// Record a tick duration. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, latency_ns: i64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns = self.sum_cycle_ns.saturating_add(duration_ns);
        self.max_latency_ns = self.max_latency_ns.max(latency_ns);
    }

    /// Average tick time [ns] (returns 0 if no ticks).
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Errors ─────────────────────────────────────────────────────────

/// Errors during RT setup or loop execution.
#[derive(Debug, Error)]
pub enum CycleError {
    /// RT system call failed.
    #[error("RT setup error: {0}")]
    RtSetup(String),

    /// Tick overrun with `overrun_is_fatal` set.
    #[error("cycle overrun: {actual_ns}ns > {budget_ns}ns budget")]
    CycleOverrun {
        /// Actual tick duration [ns].
        actual_ns: i64,
        /// Configured tick budget [ns].
        budget_ns: i64,
    },
}

// ─── RT Setup ───────────────────────────────────────────────────────

/// Lock all current and future memory pages.
///
/// No-op when the `rt` feature is not enabled.
#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), CycleError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| CycleError::RtSetup(format!("mlockall failed: {e}")))?;
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), CycleError> {
    Ok(())
}

/// Touch 256 KiB of stack so the loop never faults a stack page in.
fn prefault_stack() {
    let mut buf = [0u8; 256 * 1024];
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is a valid, exclusive reference into `buf`.
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

/// Pin the current thread to a specific CPU core.
#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), CycleError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| CycleError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| CycleError::RtSetup(format!("sched_setaffinity failed: {e}")))?;
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), CycleError> {
    Ok(())
}

/// Set SCHED_FIFO with the given RT priority.
#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), CycleError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` is a valid sched_param for the duration of the call.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(CycleError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), CycleError> {
    Ok(())
}

/// Perform the full RT setup sequence.
///
/// Must be called before entering the loop. Without the `rt` feature only
/// the stack prefault runs.
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), CycleError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    Ok(())
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// Owns the robot state machine, its hardware and the timing state.
pub struct CycleRunner<H: RobotHardware> {
    machine: RobotStateMachine,
    hardware: H,
    stats: CycleStats,
    running: Arc<AtomicBool>,
    period: Duration,
    overrun_is_fatal: bool,
}

impl<H: RobotHardware> CycleRunner<H> {
    /// Create a runner from a validated configuration.
    pub fn new(config: &LoadedConfig, hardware: H) -> Self {
        Self {
            machine: RobotStateMachine::new(config.steps),
            hardware,
            stats: CycleStats::new(),
            running: Arc::new(AtomicBool::new(true)),
            period: Duration::from_micros(config.config.cycle.tick_period_us),
            overrun_is_fatal: config.config.cycle.overrun_is_fatal,
        }
    }

    /// Flag that keeps the loop alive; clear it to stop after the current tick.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    #[inline]
    pub fn machine(&self) -> &RobotStateMachine {
        &self.machine
    }

    #[inline]
    pub fn machine_mut(&mut self) -> &mut RobotStateMachine {
        &mut self.machine
    }

    #[inline]
    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    #[inline]
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run a single tick and record its duration.
    ///
    /// Overruns are counted here; whether they abort is decided by the loop.
    pub fn step(&mut self) -> Transition {
        let start = Instant::now();
        let transition = self.machine.tick(&mut self.hardware);
        let duration_ns = start.elapsed().as_nanos() as i64;
        self.stats.record(duration_ns, 0);
        if duration_ns > self.budget_ns() {
            self.stats.overruns += 1;
        }
        transition
    }

    /// Enter the tick loop.
    ///
    /// Runs until the shutdown flag is cleared or `max_ticks` ticks have
    /// executed in this call (`None` = unbounded).
    ///
    /// # Errors
    /// `CycleError::CycleOverrun` on the first overrun when
    /// `overrun_is_fatal` is set (rt builds only).
    pub fn run(&mut self, max_ticks: Option<u64>) -> Result<(), CycleError> {
        info!(
            "Entering tick loop (period={}µs, limit={:?})",
            self.period.as_micros(),
            max_ticks
        );
        let first_tick = self.stats.cycle_count;
        let stop_at = max_ticks.map(|n| first_tick.saturating_add(n));

        #[cfg(feature = "rt")]
        let result = self.run_rt_loop(stop_at);

        #[cfg(not(feature = "rt"))]
        let result = self.run_sim_loop(stop_at);

        info!(
            "Tick loop stopped after {} ticks (avg={}ns, max={}ns, overruns={})",
            self.stats.cycle_count - first_tick,
            self.stats.avg_cycle_ns(),
            self.stats.max_cycle_ns,
            self.stats.overruns
        );
        result
    }

    #[inline]
    fn budget_ns(&self) -> i64 {
        self.period.as_nanos() as i64
    }

    /// `stop_at` is an absolute `cycle_count`.
    fn keep_going(&self, stop_at: Option<u64>) -> bool {
        self.running.load(Ordering::SeqCst)
            && stop_at.is_none_or(|limit| self.stats.cycle_count < limit)
    }

    /// RT loop using `clock_nanosleep(TIMER_ABSTIME)`.
    #[cfg(feature = "rt")]
    fn run_rt_loop(&mut self, stop_at: Option<u64>) -> Result<(), CycleError> {
        use nix::time::{ClockId, ClockNanosleepFlags, clock_gettime, clock_nanosleep};

        let clock = ClockId::CLOCK_MONOTONIC;
        let budget_ns = self.budget_ns();
        let mut next_wake = clock_gettime(clock)
            .map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))?;

        while self.keep_going(stop_at) {
            next_wake = timespec_add_ns(next_wake, budget_ns);

            let tick_start = clock_gettime(clock)
                .map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))?;

            self.machine.tick(&mut self.hardware);

            let tick_end = clock_gettime(clock)
                .map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))?;
            let duration_ns = timespec_diff_ns(&tick_end, &tick_start);
            let latency_ns = (budget_ns - timespec_diff_ns(&next_wake, &tick_start)).abs();
            self.stats.record(duration_ns, latency_ns);

            if duration_ns > budget_ns {
                self.stats.overruns += 1;
                if self.overrun_is_fatal {
                    return Err(CycleError::CycleOverrun {
                        actual_ns: duration_ns,
                        budget_ns,
                    });
                }
                warn!("Tick overrun: {duration_ns}ns > {budget_ns}ns");
            }

            let _ = clock_nanosleep(clock, ClockNanosleepFlags::TIMER_ABSTIME, &next_wake);
        }
        Ok(())
    }

    /// Simulation loop using `std::thread::sleep`. Overruns are logged only.
    #[cfg(not(feature = "rt"))]
    fn run_sim_loop(&mut self, stop_at: Option<u64>) -> Result<(), CycleError> {
        while self.keep_going(stop_at) {
            let tick_start = Instant::now();
            let overruns = self.stats.overruns;

            self.step();

            if self.stats.overruns > overruns {
                warn!(
                    "Tick overrun: {}ns > {}ns",
                    self.stats.last_cycle_ns,
                    self.budget_ns()
                );
            }

            if let Some(remaining) = self.period.checked_sub(tick_start.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
        Ok(())
    }
}

// ─── Time Helpers ───────────────────────────────────────────────────

/// Add nanoseconds to a TimeSpec.
#[cfg(feature = "rt")]
fn timespec_add_ns(ts: nix::sys::time::TimeSpec, ns: i64) -> nix::sys::time::TimeSpec {
    let mut secs = ts.tv_sec();
    let mut nanos = ts.tv_nsec() + ns;
    while nanos >= 1_000_000_000 {
        secs += 1;
        nanos -= 1_000_000_000;
    }
    while nanos < 0 {
        secs -= 1;
        nanos += 1_000_000_000;
    }
    nix::sys::time::TimeSpec::new(secs, nanos)
}

/// Compute the difference (a - b) in nanoseconds.
#[cfg(feature = "rt")]
fn timespec_diff_ns(a: &nix::sys::time::TimeSpec, b: &nix::sys::time::TimeSpec) -> i64 {
    (a.tv_sec() - b.tv_sec()) * 1_000_000_000 + (a.tv_nsec() - b.tv_nsec())
}

// ─── Tests ──────────────────────────────────────────────────────────
