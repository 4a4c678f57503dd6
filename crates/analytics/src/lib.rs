//! Derived views over a visible feature set.
//!
//! Everything here is pure and synchronous: the same inputs always give the
//! same output and inputs are never mutated. Functions borrow features and
//! return references so a filter chain never copies attribute maps.

pub mod aggregation;
pub mod facets;
pub mod filter;
pub mod format;
pub mod listing;

pub use aggregation::{aggregate, genus_histogram, AggregationSnapshot, GenusCount};
pub use facets::{facet_options, FacetOption};
pub use filter::{filter, matches, visible, within_bounds, VisibilityOptions};
pub use listing::{list, ListingPage, SortKey, SortOrder};
