//! Common types and utilities shared across all canopy crates.

pub mod bbox;
pub mod config;
pub mod criteria;
pub mod error;
pub mod feature;
pub mod source;
pub mod summary;
pub mod timer;
pub mod viewport;

pub use bbox::BoundingBox;
pub use config::{CanopyConfig, FieldNames, CONDITION_DOMAIN};
pub use criteria::{Facet, FilterCriteria};
pub use error::{CanopyError, CanopyResult};
pub use feature::{FeatureId, FeatureSet, PropertyValue, SpatialFeature};
pub use source::{FeatureSource, SummarySource};
pub use summary::PageSummary;
pub use timer::DebounceTimer;
pub use viewport::ViewportState;
