//! Map camera state.

use serde::{Deserialize, Serialize};

/// Snapshot of the map camera: center, zoom, orientation and pixel size.
///
/// A value of this type is never mutated in place by the pipeline; every
/// user interaction produces a new snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub bearing: f64,
    #[serde(alias = "width")]
    pub pixel_width: f64,
    #[serde(alias = "height")]
    pub pixel_height: f64,
}

impl ViewportState {
    /// Create a flat, north-up viewport.
    pub fn new(longitude: f64, latitude: f64, zoom: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            longitude,
            latitude,
            zoom,
            pitch: 0.0,
            bearing: 0.0,
            pixel_width,
            pixel_height,
        }
    }

    /// Same camera with a different pixel size (window resize).
    pub fn with_size(self, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            pixel_width,
            pixel_height,
            ..self
        }
    }

    /// Same camera recentered on a new position.
    pub fn recentered(self, longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            ..self
        }
    }

    /// True when the viewport covers at least one pixel in each direction.
    pub fn has_area(&self) -> bool {
        self.pixel_width > 0.0 && self.pixel_height > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_short_size_names() {
        let json = r#"{"longitude":-122.33,"latitude":47.6,"zoom":17,"width":800,"height":600}"#;
        let vp: ViewportState = serde_json::from_str(json).unwrap();
        assert_eq!(vp.pixel_width, 800.0);
        assert_eq!(vp.pixel_height, 600.0);
        assert_eq!(vp.pitch, 0.0);
    }

    #[test]
    fn test_with_size_keeps_camera() {
        let vp = ViewportState::new(-122.33, 47.6, 17.0, 800.0, 600.0).with_size(1024.0, 768.0);
        assert_eq!(vp.longitude, -122.33);
        assert_eq!(vp.zoom, 17.0);
        assert_eq!(vp.pixel_width, 1024.0);
        assert!(vp.has_area());
        assert!(!vp.with_size(0.0, 768.0).has_area());
    }
}
