//! # Robot Control Unit
//!
//! Runs the robot state machine against the simulated hardware backend at
//! the configured tick rate.
//!
//! Loads `robot.toml` (falls back to built-in defaults when the file is
//! missing), performs RT setup and enters the tick loop until Ctrl-C or the
//! `--ticks` budget is reached.

use clap::Parser;
use robot_common::config::ConfigError;
use robot_control_unit::config::{LoadedConfig, load_config};
use robot_control_unit::cycle::{CycleRunner, rt_setup};
use robot_control_unit::hardware::sim::{RemoteScript, SimulatedHardware};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Robot Control Unit: top-level robot state machine
#[derive(Parser, Debug)]
#[command(name = "robot_control_unit")]
#[command(version)]
#[command(about = "Periodic robot state machine with input rate limiting")]
struct Args {
    /// Path to the control unit configuration TOML.
    #[arg(long, default_value = robot_common::consts::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Stop after this many ticks (default: run until Ctrl-C).
    #[arg(long)]
    ticks: Option<u64>,

    /// Delay before the simulated remote comes online [ms].
    #[arg(long, default_value_t = 500)]
    link_delay_ms: u64,

    /// CPU core to pin the RT thread to.
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority.
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let (loaded, defaulted) = match load_config(&args.config) {
        Ok(loaded) => (loaded, false),
        Err(ConfigError::FileNotFound) => (LoadedConfig::defaults(), true),
        Err(e) => {
            eprintln!("FATAL: {e}");
            process::exit(1);
        }
    };

    setup_tracing(&args, loaded.config.shared.log_level.into());

    info!(
        "Robot Control Unit v{} starting ({})",
        env!("CARGO_PKG_VERSION"),
        loaded.config.shared.service_name
    );
    if defaulted {
        warn!(
            "No config at {}, using built-in defaults",
            args.config.display()
        );
    }

    if let Err(e) = run(&args, &loaded) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Robot Control Unit shutdown complete");
}

fn run(args: &Args, loaded: &LoadedConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "Config OK: tick_period={}µs, limiter vx={} vy={} vomega={}",
        loaded.config.cycle.tick_period_us,
        loaded.steps.vx.get(),
        loaded.steps.vy.get(),
        loaded.steps.vomega.get(),
    );

    rt_setup(args.cpu_core, args.rt_priority)?;
    info!(
        "RT setup complete (cpu_core={}, priority={})",
        args.cpu_core, args.rt_priority
    );

    let hardware = SimulatedHardware::new(RemoteScript {
        link_delay: Duration::from_millis(args.link_delay_ms),
        ..Default::default()
    });
    let mut runner = CycleRunner::new(loaded, hardware);

    let running = runner.shutdown_handle();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })?;

    runner.run(args.ticks)?;
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments and configured level.
fn setup_tracing(args: &Args, configured: Level) {
    let level = if args.verbose { Level::DEBUG } else { configured };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
