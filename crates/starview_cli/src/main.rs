//! Starview CLI
//!
//! Replay scripted camera scenarios without a renderer.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use starview_camera::CameraConfig;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod scenario;

use scenario::Scenario;

#[derive(Parser)]
#[command(name = "starview")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Starview camera scenario runner", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario file and log every camera event
    Replay {
        /// Scenario file (TOML)
        scenario: PathBuf,

        /// Camera config file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Simulated frame rate
        #[arg(long, default_value = "60")]
        fps: u32,
    },

    /// Print the default camera config
    Defaults,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("info,starview_camera=debug,starview_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Replay {
            scenario,
            config,
            fps,
        } => cmd_replay(&scenario, config.as_deref(), fps),

        Commands::Defaults => cmd_defaults(),
    }
}

fn cmd_replay(scenario_path: &Path, config_path: Option<&Path>, fps: u32) -> Result<()> {
    let config = match config_path {
        Some(path) => CameraConfig::load(path)
            .with_context(|| format!("Failed to load camera config {}", path.display()))?,
        None => CameraConfig::default(),
    };
    let scenario = Scenario::load(scenario_path)?;

    let summary = scenario::replay(&scenario, config, fps)?;

    info!(
        "Finished after {} frames: {} completed transitions, {} interactions",
        summary.frames, summary.completions, summary.interactions
    );
    info!(
        "Final camera: position {:?}, target {:?}, state {:?}, focus {:?}",
        summary.final_pose.position,
        summary.final_pose.target,
        summary.final_state,
        summary.store.focused_object
    );

    Ok(())
}

fn cmd_defaults() -> Result<()> {
    let text = CameraConfig::default()
        .to_toml()
        .context("Failed to serialize default config")?;
    println!("{}", text);
    Ok(())
}
