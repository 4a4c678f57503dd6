//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in WGS84 degrees.
///
/// The model is a plain lon/lat rectangle: boxes crossing the antimeridian
/// are not represented.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Create a new bounding box from its edges.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// A zero-area box collapsed onto a single point.
    pub fn degenerate(lon: f64, lat: f64) -> Self {
        Self::new(lon, lat, lon, lat)
    }

    /// Width of the box in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height of the box in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// True when the box encloses no area.
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Check if a point is contained within this bbox (edges inclusive).
    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        lon >= self.west && lon <= self.east && lat >= self.south && lat <= self.north
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate() {
        let point = BoundingBox::degenerate(-122.3, 47.6);
        assert!(point.is_degenerate());
        assert!(point.contains_point(-122.3, 47.6));
        assert!(!BoundingBox::new(0.0, 0.0, 1.0, 1.0).is_degenerate());
    }
}
