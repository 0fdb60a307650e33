//! Startle prop host entry point.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                    │
//! │                                                           │
//! │  HardwareArm     HardwareLid      LogEventSink            │
//! │  (ArmActuator)   (SwitchSensor)   (EventSink)             │
//! │                                                           │
//! │  ──────────────── Port Trait Boundary ──────────────      │
//! │                                                           │
//! │  ┌─────────────────────────────────────────────────────┐  │
//! │  │  PropService: StateMachine · TimerQueue ·           │  │
//! │  │               Orchestrator · LidMonitor             │  │
//! │  └─────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! GPIO is simulated: a virtual finger follows the motor lines and a
//! virtual visitor flips the lid toggle every `--visit-secs` seconds.

#![deny(unused_must_use)]

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use startle::adapters::hardware::{HardwareArm, HardwareLid};
use startle::adapters::log_sink::LogEventSink;
use startle::adapters::sim::{SimArm, SimLid, SimLine};
use startle::app::lid::LidLevels;
use startle::app::service::PropService;
use startle::config::PropConfig;
use startle::drivers::arm_motor::ArmMotor;
use startle::pins;
use startle::shutdown::ShutdownSignal;

/// Simulation step for the virtual finger.
const SIM_TICK: Duration = Duration::from_millis(10);

/// Startle prop controller
#[derive(Parser, Debug)]
#[command(name = "startle")]
#[command(version)]
#[command(about = "Lid-switch driven startle prop controller")]
struct Args {
    /// JSON file overriding behaviour timings
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Default log filter (RUST_LOG takes precedence)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Seconds between simulated visitors flipping the lid toggle (0 = never)
    #[arg(long, default_value_t = 20)]
    visit_secs: u64,

    /// Milliseconds the virtual finger needs from home to full reach
    #[arg(long, default_value_t = 600)]
    travel_ms: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_tracing(&args);

    info!("╔══════════════════════════════════════╗");
    info!("║  Startle v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");
    for (name, pin) in pins::ALL {
        info!("pin {name} = {pin}");
    }

    // ── 1. Configuration ──────────────────────────────────────
    let config = match &args.config {
        Some(path) => PropConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PropConfig::default(),
    };

    // ── 2. Signal handling ────────────────────────────────────
    let signal = ShutdownSignal::new();
    {
        let signal = signal.clone();
        ctrlc::set_handler(move || {
            info!("Received shutdown signal");
            signal.trigger();
        })
        .context("installing signal handler")?;
    }

    // ── 3. Simulated hardware ─────────────────────────────────
    let motor_lines = [SimLine::new(false), SimLine::new(false), SimLine::new(false)];
    let motor = ArmMotor::new(
        motor_lines[0].clone(),
        motor_lines[1].clone(),
        motor_lines[2].clone(),
    )?;
    let (lid, switches) = SimLid::new(LidLevels::new(true, false));
    let sim_arm = SimArm::new(motor_lines, lid.clone(), Duration::from_millis(args.travel_ms));
    let sim = spawn_simulation(sim_arm, lid, signal.clone(), args.visit_secs)?;

    // ── 4. Run until signalled ────────────────────────────────
    let service = PropService::start(
        config,
        HardwareArm::new(motor),
        HardwareLid::new(switches),
        LogEventSink::new(),
    )?;
    service.run_until(&signal)?;

    if sim.join().is_err() {
        warn!("simulation thread panicked");
    }
    info!("clean exit!");
    Ok(())
}

fn setup_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Step the virtual finger and play visitor until shutdown.
fn spawn_simulation(
    mut arm: SimArm,
    lid: SimLid,
    signal: ShutdownSignal,
    visit_secs: u64,
) -> Result<thread::JoinHandle<()>> {
    let visit_every = (visit_secs > 0).then(|| Duration::from_secs(visit_secs));
    let handle = thread::Builder::new()
        .name("sim".into())
        .spawn(move || {
            let mut last_visit = Instant::now();
            while !signal.wait_timeout(SIM_TICK) {
                arm.step(SIM_TICK);
                if let Some(every) = visit_every {
                    if last_visit.elapsed() >= every {
                        info!("sim: visitor flips the lid toggle");
                        lid.set_external(true);
                        last_visit = Instant::now();
                    }
                }
            }
        })
        .context("spawning simulation thread")?;
    Ok(handle)
}
