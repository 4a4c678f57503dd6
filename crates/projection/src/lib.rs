//! Map projections for turning a camera state into geographic bounds.
//!
//! Implemented from scratch without external dependencies.

pub mod web_mercator;

pub use web_mercator::{viewport_bounds, WebMercatorViewport, TILE_SIZE};
