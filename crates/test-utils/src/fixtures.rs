//! Common test fixtures for canopy tests.
//!
//! Attribute names follow the default `FieldNames` mapping.

use canopy_common::{FeatureId, PropertyValue, SpatialFeature};

/// Fixed camera states.
pub mod viewport {
    use canopy_common::ViewportState;

    /// Pike Place area, the default start view.
    pub const SEATTLE_CENTER: (f64, f64) = (-122.335167, 47.608013);

    /// Downtown Seattle at the given zoom on a 1280x720 window.
    pub fn downtown_seattle(zoom: f64) -> ViewportState {
        ViewportState::new(SEATTLE_CENTER.0, SEATTLE_CENTER.1, zoom, 1280.0, 720.0)
    }
}

/// Common bounding box definitions for testing, as (west, south, east, north).
pub mod bbox {
    /// A few downtown blocks
    pub const DOWNTOWN: (f64, f64, f64, f64) = (-122.3420, 47.6050, -122.3280, 47.6110);

    /// City of Seattle
    pub const SEATTLE: (f64, f64, f64, f64) = (-122.4360, 47.4950, -122.2360, 47.7340);

    /// Single point (degenerate bbox)
    pub const POINT: (f64, f64, f64, f64) = (-122.3351, 47.6080, -122.3351, 47.6080);
}

/// Epoch milliseconds helpers.
pub mod time {
    pub const MS_PER_YEAR: f64 = 1000.0 * 60.0 * 60.0 * 24.0 * 365.25;

    /// 2026-01-01T00:00:00Z
    pub const REFERENCE_NOW_MS: i64 = 1_767_225_600_000;

    /// Planting timestamp `years` before the reference time.
    pub fn planted_years_ago(years: f64) -> f64 {
        REFERENCE_NOW_MS as f64 - years * MS_PER_YEAR
    }
}

/// Builder for tree features.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    feature: SpatialFeature,
}

impl FeatureBuilder {
    pub fn new(id: impl Into<FeatureId>) -> Self {
        let (lon, lat) = viewport::SEATTLE_CENTER;
        Self {
            feature: SpatialFeature::new(id, lon, lat),
        }
    }

    pub fn at(mut self, lon: f64, lat: f64) -> Self {
        self.feature.position = [lon, lat];
        self
    }

    pub fn text(mut self, key: &str, value: &str) -> Self {
        self.feature
            .properties
            .insert(key.to_string(), PropertyValue::Text(value.to_string()));
        self
    }

    pub fn number(mut self, key: &str, value: f64) -> Self {
        self.feature
            .properties
            .insert(key.to_string(), PropertyValue::Number(value));
        self
    }

    pub fn null(mut self, key: &str) -> Self {
        self.feature
            .properties
            .insert(key.to_string(), PropertyValue::Null);
        self
    }

    pub fn genus(self, genus: &str) -> Self {
        self.text("GENUS", genus)
    }

    pub fn status(self, status: &str) -> Self {
        self.text("CURRENT_STATUS", status)
    }

    pub fn ownership(self, ownership: &str) -> Self {
        self.text("OWNERSHIP", ownership)
    }

    pub fn diameter(self, inches: f64) -> Self {
        self.number("DIAM", inches)
    }

    pub fn planted_ms(self, epoch_ms: f64) -> Self {
        self.number("PLANTED_DATE", epoch_ms)
    }

    pub fn condition(self, rating: &str) -> Self {
        self.text("CONDITION_RATING", rating)
    }

    pub fn common_name(self, name: &str) -> Self {
        self.text("COMMON_NAME", name)
    }

    pub fn scientific_name(self, name: &str) -> Self {
        self.text("SCIENTIFIC_NAME", name)
    }

    pub fn build(self) -> SpatialFeature {
        self.feature
    }
}

/// Features with only a genus set.
pub fn trees_with_genera(genera: &[&str]) -> Vec<SpatialFeature> {
    genera
        .iter()
        .enumerate()
        .map(|(i, g)| FeatureBuilder::new(i as i64 + 1).genus(g).build())
        .collect()
}

/// Features with only an ownership set.
pub fn trees_with_ownership(owners: &[&str]) -> Vec<SpatialFeature> {
    owners
        .iter()
        .enumerate()
        .map(|(i, o)| FeatureBuilder::new(i as i64 + 1).ownership(o).build())
        .collect()
}
