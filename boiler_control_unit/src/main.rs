//! # Boiler Control Unit
//!
//! Cyclic steam-boiler controller.
//!
//! Loads the plant file (`config/boiler.toml` by default), builds the
//! controller and drives it once per cycle period until Ctrl-C or until
//! `--max-cycles` cycles ran. The plant driver is not part of this binary:
//! the units are disconnected, so the controller stays in Initialization
//! waiting for the boiler.

use boiler_common::config::LogLevel;
use boiler_common::consts::DEFAULT_CONFIG_PATH;
use boiler_control_unit::config::{LoadedConfig, load_config};
use boiler_control_unit::controller::ControlUnit;
use boiler_control_unit::cycle::{CycleRunner, DisconnectedUnits};
use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// Boiler Control Unit: cyclic steam-boiler controller
#[derive(Parser, Debug)]
#[command(name = "boiler_control_unit")]
#[command(version)]
#[command(about = "Cyclic steam-boiler control unit")]
struct Args {
    /// Path to the plant configuration TOML.
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,

    /// Stop after this many cycles.
    #[arg(long, value_name = "N")]
    max_cycles: Option<u64>,
}

fn main() {
    let args = Args::parse();
    let loaded = load_config(&args.config);
    let log_level = loaded
        .as_ref()
        .map(|cfg| cfg.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, log_level);

    info!("Boiler Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = loaded
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|cfg| run(&args, cfg));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Boiler Control Unit shutdown complete");
}

fn run(args: &Args, config: LoadedConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "Config OK: service={}, cycle_time={:?}, pumps={}, stop_cycles={}",
        config.shared.service_name,
        config.cycle_time(),
        config.constants.pump.count,
        config.cycle.stop_cycles,
    );

    let controller = ControlUnit::new(config.constants).with_stop_cycles(config.cycle.stop_cycles);
    let mut runner = CycleRunner::new(controller, DisconnectedUnits, config.cycle_time())
        .abort_on_overrun(config.cycle.abort_on_overrun);

    // Setup signal handler for graceful shutdown.
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    runner.run(&running, args.max_cycles)?;
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, configured: LogLevel) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::from(configured)
    };

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
