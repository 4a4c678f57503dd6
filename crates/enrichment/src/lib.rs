//! Per-tree enrichment lookups.
//!
//! The selected tree's scientific name keys an [`EnrichmentCache`]. Lookups
//! are debounced, a lookup for a new key cancels the one in flight, and
//! every real answer (success or failure) is kept for the life of the cache.

pub mod cache;
pub mod entries;
pub mod title;
pub mod wikipedia;

pub use cache::{EnrichmentCache, LookupOutcome};
pub use entries::{EnrichmentEntry, EntryTable};
pub use title::{cleanup_scientific_name, TitleResolver};
pub use wikipedia::WikipediaSummarySource;
