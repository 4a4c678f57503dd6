//! Command-line driver for the canopy pipeline.
//!
//! - `snapshot`: load one viewport and print the filtered summary
//! - `replay`: feed a recorded viewport stream through the debounced sync
//! - `enrich`: look up page summaries for scientific names

mod enrich;
mod replay;
mod report;
mod snapshot;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use canopy_common::CanopyConfig;

#[derive(Parser, Debug)]
#[command(name = "canopy")]
#[command(about = "Street tree viewport sync, analytics and enrichment")]
struct Args {
    /// YAML configuration file
    #[arg(long, env = "CANOPY_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (used when RUST_LOG is not set)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Override the feature layer query endpoint
    #[arg(long)]
    feature_service_url: Option<String>,

    /// Override the zoom threshold below which nothing is queried
    #[arg(long)]
    zoom_threshold: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Query one viewport and print its summary as JSON
    Snapshot(snapshot::SnapshotArgs),
    /// Replay newline-delimited viewport changes through the debounced sync
    Replay(replay::ReplayArgs),
    /// Look up summaries for scientific names
    Enrich(enrich::EnrichArgs),
}

fn init_tracing(args: &Args) {
    // Logs go to stderr; stdout carries the JSON results.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(args: &Args) -> Result<CanopyConfig> {
    let config = match &args.config {
        Some(path) => CanopyConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => CanopyConfig::default(),
    };
    let mut config = config.with_env_overrides();

    if let Some(url) = &args.feature_service_url {
        config.feature_service_url = url.clone();
    }
    if let Some(zoom) = args.zoom_threshold {
        config.zoom_threshold = zoom;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args);

    let config = load_config(&args)?;
    info!(
        feature_service = %config.feature_service_url,
        zoom_threshold = config.zoom_threshold,
        "Configuration loaded"
    );

    match args.command {
        Command::Snapshot(cmd) => snapshot::run(cmd, &config).await,
        Command::Replay(cmd) => replay::run(cmd, &config).await,
        Command::Enrich(cmd) => enrich::run(cmd, &config).await,
    }
}
