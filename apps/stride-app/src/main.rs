//! Stride balance controller CLI.
//!
//! Provides two modes of operation:
//! - `run`: Simulate a straight walk under the centroidal MPC and print
//!   statistics
//! - `info`: Print crate versions and the resolved configuration

mod config;
mod reference;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nalgebra::Vector3;
use stride_centroidal::{CentroidalCommand, CentroidalManager};
use stride_core::constants::GRAVITY;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::reference::build_walk_reference;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Centroidal ZMP balance control for biped walking.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a straight walk and print statistics.
    Run {
        /// TOML configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Simulated time in seconds (default: until the walk has settled).
        #[arg(short, long)]
        duration: Option<f64>,
    },

    /// Print crate information and the resolved configuration.
    Info {
        /// TOML configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Point-mass CoM pushed from the ZMP, integrated with semi-implicit Euler.
#[derive(Debug, Clone, Copy)]
struct ComState {
    pos: Vector3<f64>,
    vel: Vector3<f64>,
}

impl ComState {
    fn step(&mut self, command: &CentroidalCommand, mass: f64, dt: f64) {
        let omega2 = command.force_z / (mass * self.pos.z);
        let acc = Vector3::new(
            omega2 * (self.pos.x - command.zmp.x),
            omega2 * (self.pos.y - command.zmp.y),
            command.force_z / mass - GRAVITY,
        );
        self.vel += acc * dt;
        self.pos += self.vel * dt;
    }
}

/// Aggregated over the ticks on which the MPC ran.
#[derive(Debug, Default)]
struct RunSummary {
    ticks: u64,
    mpc_ticks: u64,
    not_converged: u64,
    total_solve_time_us: u64,
    max_iter: u32,
    max_zmp_error: f64,
}

impl RunSummary {
    #[allow(clippy::cast_precision_loss)]
    fn print(&self, com: &ComState) {
        let mean_solve_ms = if self.mpc_ticks > 0 {
            self.total_solve_time_us as f64 / self.mpc_ticks as f64 / 1000.0
        } else {
            0.0
        };
        println!("ticks: total={}, mpc={}", self.ticks, self.mpc_ticks);
        println!(
            "solver: mean={mean_solve_ms:.3}ms, max_iter={}, not_converged={}",
            self.max_iter, self.not_converged
        );
        println!("max zmp deviation from reference: {:.4}m", self.max_zmp_error);
        println!(
            "final com: pos=({:.3}, {:.3}, {:.3}), vel=({:.3}, {:.3}, {:.3})",
            com.pos.x, com.pos.y, com.pos.z, com.vel.x, com.vel.y, com.vel.z
        );
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(AppConfig::default()),
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn run_walk(config: &AppConfig, duration: Option<f64>) -> Result<()> {
    let centroidal = &config.centroidal;
    let margin = centroidal.horizon_duration + centroidal.horizon_dt;
    let walk = build_walk_reference(&config.walk, centroidal.ref_com_z, margin);
    let duration = duration.unwrap_or(walk.end_time);
    if !(duration >= 0.0 && duration <= walk.end_time) {
        anyhow::bail!(
            "duration must lie within [0, {:.3}] s, the span of the walk",
            walk.end_time
        );
    }

    let mut manager = CentroidalManager::new(config.robot_mass, centroidal.clone());
    *manager.zmp_reference_mut() = walk.zmp;
    *manager.com_reference_mut() = walk.com;

    let mut com = ComState {
        pos: Vector3::new(0.0, 0.0, centroidal.ref_com_z),
        vel: Vector3::zeros(),
    };
    let mut summary = RunSummary::default();
    let ticks = (duration / config.control_dt).floor() as u64;
    info!(
        mass = config.robot_mass,
        steps = config.walk.step_count,
        duration,
        ticks,
        "starting walk"
    );

    for tick in 0..ticks {
        let t = tick as f64 * config.control_dt;

        if !manager.is_active() && config.auto_start_time.is_none_or(|start| t > start) {
            manager.reset()?;
            info!(t, "balance control started");
        }

        let command = if manager.is_active() {
            let command = *manager
                .run_mpc(&com.pos, &com.vel, t)
                .with_context(|| format!("MPC tick failed at t = {t:.3}"))?;
            let reference = manager.ref_zmp(t)?;
            summary.mpc_ticks += 1;
            summary.max_zmp_error = summary
                .max_zmp_error
                .max((command.zmp.xy() - reference.xy()).norm());
            if let Some(stats) = manager.stats() {
                summary.total_solve_time_us += stats.solve_time_us;
                summary.max_iter = summary.max_iter.max(stats.iter);
                summary.not_converged += u64::from(!stats.converged);
            }
            command
        } else {
            // Standing still: ZMP under the CoM, weight fully supported.
            CentroidalCommand {
                zmp: Vector3::new(com.pos.x, com.pos.y, 0.0),
                force_z: config.robot_mass * GRAVITY,
            }
        };

        com.step(&command, config.robot_mass, config.control_dt);
        summary.ticks += 1;
    }

    summary.print(&com);
    Ok(())
}

fn run_info(config: &AppConfig) -> Result<()> {
    println!("stride v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  stride-core       {}", env!("CARGO_PKG_VERSION"));
    println!("  stride-trajectory {}", env!("CARGO_PKG_VERSION"));
    println!("  stride-centroidal {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("horizon steps: {}", config.centroidal.horizon_steps());
    println!();
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Some(Commands::Run { config, duration }) => {
            let config = load_config(config.as_deref())?;
            run_walk(&config, duration)
        }
        Some(Commands::Info { config }) => {
            let config = load_config(config.as_deref())?;
            run_info(&config)
        }
        None => run_walk(&AppConfig::default(), None),
    }
}
