//! Keeps a feature set in step with a moving map viewport.
//!
//! Viewport changes go through [`QueryDebouncer`], which emits at most one
//! query per idle window. [`SpatialFeatureClient`] runs the query against a
//! [`FeatureSource`](canopy_common::FeatureSource) and publishes the result
//! to a [`FeatureStore`], discarding responses that were overtaken by a newer
//! request. [`ViewportSync`] wires the three together on a background task.

pub mod client;
pub mod debouncer;
pub mod pipeline;
pub mod query;
pub mod response;
pub mod store;

pub use client::{ArcGisFeatureSource, FetchOutcome, SpatialFeatureClient};
pub use debouncer::{DebounceState, QueryDebouncer, QueryEvent};
pub use pipeline::ViewportSync;
pub use query::build_query_url;
pub use response::parse_feature_collection;
pub use store::{FeatureStore, RequestToken};
