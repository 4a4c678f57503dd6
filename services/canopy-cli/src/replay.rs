//! Replay a recorded stream of viewport changes through the debounced sync.
//!
//! Input is newline-delimited JSON, one step per line:
//!
//! ```text
//! {"delay_ms": 0,   "viewport": {"longitude": -122.33, "latitude": 47.61, "zoom": 17, "width": 1280, "height": 720}}
//! {"delay_ms": 120, "viewport": {"longitude": -122.34, "latitude": 47.61, "zoom": 17, "width": 1280, "height": 720}}
//! {"delay_ms": 300, "resize": {"width": 800, "height": 600}}
//! ```
//!
//! Every time the visible feature set changes a report line is printed.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Args;
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use canopy_common::{CanopyConfig, FeatureSet, ViewportState};
use viewport_sync::{ArcGisFeatureSource, ViewportSync};

use crate::report::{build_report, FilterArgs};

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// NDJSON file of viewport steps; stdin when omitted or "-"
    pub input: Option<PathBuf>,

    /// How long to keep syncing after the last step
    #[arg(long, default_value_t = 2000)]
    pub linger_ms: u64,

    #[command(flatten)]
    pub filters: FilterArgs,
}

#[derive(Debug, Deserialize)]
struct Step {
    #[serde(default)]
    delay_ms: u64,
    #[serde(default)]
    viewport: Option<ViewportState>,
    #[serde(default)]
    resize: Option<Size>,
}

#[derive(Debug, Deserialize)]
struct Size {
    width: f64,
    height: f64,
}

pub async fn run(args: ReplayArgs, config: &CanopyConfig) -> Result<()> {
    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &args.input {
        Some(path) if path.as_os_str() != "-" => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        _ => Box::new(BufReader::new(tokio::io::stdin())),
    };
    let mut lines = reader.lines();

    let source = Arc::new(ArcGisFeatureSource::from_config(config)?);

    // the first step must carry a full viewport to start from
    let mut line_no = 0;
    let first = loop {
        let Some(line) = lines.next_line().await? else {
            bail!("No viewport steps in input");
        };
        line_no += 1;
        if let Some(step) = parse_step(&line, line_no)? {
            break step;
        }
    };
    let Some(initial) = first.viewport else {
        bail!("First step must contain a viewport");
    };
    tokio::time::sleep(Duration::from_millis(first.delay_ms)).await;

    let mut sync = ViewportSync::spawn(source, config, initial);
    let printer = tokio::spawn(print_changes(sync.subscribe(), args.filters.clone(), config.clone()));

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let Some(step) = parse_step(&line, line_no)? else {
            continue;
        };
        tokio::time::sleep(Duration::from_millis(step.delay_ms)).await;

        match (step.viewport, step.resize) {
            (Some(viewport), _) => sync.update_viewport(viewport),
            (None, Some(size)) => sync.resize(size.width, size.height),
            (None, None) => warn!(line = line_no, "Step has neither viewport nor resize"),
        }
        debug!(line = line_no, state = ?sync.debounce_state(), "Applied step");
    }

    tokio::time::sleep(Duration::from_millis(args.linger_ms)).await;
    info!(
        features = sync.features().len(),
        viewport = ?sync.viewport(),
        "Replay finished"
    );

    sync.shutdown().await;
    // the store sender is gone once the sync is dropped, which ends the printer
    printer.await.context("Report printer panicked")?;
    Ok(())
}

fn parse_step(line: &str, line_no: usize) -> Result<Option<Step>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let step = serde_json::from_str(trimmed).with_context(|| format!("Invalid step on line {}", line_no))?;
    Ok(Some(step))
}

async fn print_changes(
    mut changes: watch::Receiver<Arc<FeatureSet>>,
    filters: FilterArgs,
    config: CanopyConfig,
) {
    while changes.changed().await.is_ok() {
        let features = changes.borrow_and_update().clone();
        let report = build_report(&features, &filters, None, &config, Utc::now());
        match serde_json::to_string(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => warn!(error = %e, "Failed to serialize report"),
        }
    }
}
