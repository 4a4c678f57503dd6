//! Network seams of the pipeline.
//!
//! The HTTP implementations live next to their consumers; tests substitute
//! scripted sources.

use async_trait::async_trait;

use crate::{BoundingBox, CanopyResult, FeatureSet, PageSummary};

/// Provider of point features intersecting a bounding box.
#[async_trait]
pub trait FeatureSource: Send + Sync {
    /// Fetch every feature intersecting `bounds`, in provider order.
    async fn query(&self, bounds: &BoundingBox) -> CanopyResult<FeatureSet>;
}

/// Provider of descriptive summaries keyed by a page title.
#[async_trait]
pub trait SummarySource: Send + Sync {
    /// Fetch the summary for an already resolved, unescaped title.
    async fn fetch_summary(&self, title: &str) -> CanopyResult<PageSummary>;
}
