//! `crescendo-cli` – control loop runner
//!
//! This binary is the entry point for running the aiming stack against
//! simulated hardware.  It:
//!
//! 1. Initialises structured logging (optionally exporting spans over OTLP).
//! 2. Loads `~/.crescendo/config.toml`, writing the defaults on first run.
//! 3. Builds the simulated robot and runs the control loop at a fixed period;
//!    late ticks are skipped, never bunched up.
//! 4. Intercepts **Ctrl-C** to neutralise the pivot and rollers before exit.

mod aim;
mod config;
mod demo;

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use colored::Colorize;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info, warn};

use crescendo_hal::sim::SimMotor;
use crescendo_runtime::{RollerSubsystem, telemetry};

use crate::config::Config;
use crate::demo::SimRobot;

/// Shooter duty cycle while a target is in view (negative spins outward).
const SHOOTER_DUTY: f64 = -0.75;

/// Set-point changes smaller than this are ignored, so derivative memory is
/// not reset by vision noise every tick.
const RETARGET_TOLERANCE_DEGREES: f64 = 0.25;

fn main() -> ExitCode {
    // Hold the guard so pending spans are flushed on exit.
    let _guard = telemetry::init_tracing("crescendo");

    print_banner();

    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => first_run(),
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            Config::default()
        }
    };

    let mut robot = match demo::build_robot(&cfg) {
        Ok(robot) => robot,
        Err(e) => {
            error!(error = %e, "robot configuration rejected");
            println!("{}: {}", "Startup failed".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        tags = robot.vision().layout().len(),
        target_fiducial = cfg.sim.target_fiducial,
        camera = %cfg.camera.name,
        "robot ready"
    );

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        shutdown_flag.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; the loop will only stop after run_ticks");
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to start the async runtime");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "  Running at {} ms per tick {}\n",
        cfg.tick_period_ms.to_string().bold(),
        "(Ctrl-C to stop)".dimmed()
    );
    let ticks = runtime.block_on(run(&mut robot, &cfg, &shutdown));

    println!();
    println!("{}", "  ✓ Pivot disabled, rollers stopped.".green());
    println!(
        "  {} ticks, pivot at {:.2}°",
        ticks,
        robot.pivot().encoder_position()
    );
    ExitCode::SUCCESS
}

// ─────────────────────────────────────────────────────────────────────────────
// Control loop
// ─────────────────────────────────────────────────────────────────────────────

async fn run(robot: &mut SimRobot, cfg: &Config, shutdown: &AtomicBool) -> u64 {
    let mut shooter = RollerSubsystem::new(SimMotor::new("shooter"));
    let mut ticker = interval(Duration::from_millis(cfg.tick_period_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut ticks = 0u64;
    while !shutdown.load(Ordering::SeqCst) && cfg.run_ticks.is_none_or(|limit| ticks < limit) {
        ticker.tick().await;

        let report = robot.tick();
        shooter.periodic();
        telemetry::publish(&report.telemetry);

        let angle = if report.observation.has_target {
            robot
                .vision()
                .target_height(&report.observation)
                .ok()
                .and_then(|height| {
                    aim::shot_angle_degrees(
                        report.range.distance_meters,
                        height,
                        cfg.pivot.height_meters,
                    )
                })
        } else {
            None
        };

        match angle {
            Some(angle) => {
                let drift = (angle - robot.pivot().target_angle()).abs();
                if !robot.is_holding() || drift > RETARGET_TOLERANCE_DEGREES {
                    info!(angle_degrees = angle, range_meters = report.range.distance_meters, "aiming pivot");
                    robot.set_angle(angle);
                }
                robot.start_hold();
                shooter.run(SHOOTER_DUTY);
            }
            None => shooter.stop(),
        }

        robot.pivot_mut().hardware_mut().step();
        ticks += 1;
    }

    robot.cancel_hold();
    shooter.stop();
    info!(ticks, "control loop stopped");
    ticks
}

// ─────────────────────────────────────────────────────────────────────────────
// First run
// ─────────────────────────────────────────────────────────────────────────────

fn first_run() -> Config {
    let cfg = Config::default();
    println!("  No configuration found; writing defaults.");
    match config::save(&cfg) {
        Ok(()) => println!(
            "  {} Config saved to {}",
            "✓".green().bold(),
            config::config_path().display().to_string().bold()
        ),
        Err(e) => println!("{}: {}", "Error saving config".red(), e),
    }
    cfg
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!(
        "  {} {}",
        "Crescendo".bold().cyan(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Vision ranging and pivot control");
    println!();
}
