//! One-shot viewport query.

use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Utc;
use clap::Args;
use serde::Serialize;
use tracing::info;

use canopy_common::{BoundingBox, CanopyConfig, ViewportState};
use projection::viewport_bounds;
use viewport_sync::{ArcGisFeatureSource, FeatureStore, FetchOutcome, SpatialFeatureClient};

use crate::report::{build_report, FilterArgs, ListingArgs, Report};

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Viewport center longitude
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    /// Viewport center latitude
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Zoom level
    #[arg(long, default_value_t = 17.0)]
    pub zoom: f64,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1280.0)]
    pub width: f64,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 720.0)]
    pub height: f64,

    #[command(flatten)]
    pub filters: FilterArgs,

    #[command(flatten)]
    pub listing: ListingArgs,
}

#[derive(Serialize)]
struct SnapshotOutput {
    viewport: ViewportState,
    bounds: BoundingBox,
    queried: bool,
    #[serde(flatten)]
    report: Report,
}

pub async fn run(args: SnapshotArgs, config: &CanopyConfig) -> Result<()> {
    let viewport = ViewportState::new(args.lon, args.lat, args.zoom, args.width, args.height);
    let bounds = viewport_bounds(&viewport);

    let store = Arc::new(FeatureStore::new());
    let queried = viewport.zoom >= config.zoom_threshold;

    if queried {
        let source = Arc::new(ArcGisFeatureSource::from_config(config)?);
        let client = SpatialFeatureClient::new(source, store.clone());
        match client.refresh(bounds, client.begin_request()).await {
            FetchOutcome::Applied { features } => info!(features = features, "Loaded features"),
            FetchOutcome::Retained(e) => bail!("Feature query failed: {}", e),
            FetchOutcome::Superseded => bail!("Feature query was superseded"),
        }
    } else {
        info!(
            zoom = viewport.zoom,
            threshold = config.zoom_threshold,
            "Zoom below threshold, nothing queried"
        );
    }

    let features = store.get();
    let output = SnapshotOutput {
        viewport,
        bounds,
        queried,
        report: build_report(&features, &args.filters, Some(&args.listing), config, Utc::now()),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
