//! Web Mercator viewport projection.
//!
//! World coordinates follow the common web-map convention: the whole world
//! is a `TILE_SIZE` square at zoom 0, x grows east, y grows north, and each
//! zoom level doubles the scale. Screen pixels have their origin at the
//! top-left corner of the viewport with y growing down.
//!
//! Pitch and bearing are ignored: bounds are computed as if the camera looks
//! straight down with north up.

use std::f64::consts::PI;

use canopy_common::{BoundingBox, ViewportState};

/// World size in pixels at zoom 0.
pub const TILE_SIZE: f64 = 512.0;

/// Latitude limit of the Web Mercator square.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Project lon/lat degrees to world coordinates at zoom 0.
pub fn lnglat_to_world(lon: f64, lat: f64) -> (f64, f64) {
    let lambda = lon.to_radians();
    let phi = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = TILE_SIZE * (lambda + PI) / (2.0 * PI);
    let y = TILE_SIZE * (PI + (PI / 4.0 + phi / 2.0).tan().ln()) / (2.0 * PI);
    (x, y)
}

/// Inverse of [`lnglat_to_world`].
pub fn world_to_lnglat(x: f64, y: f64) -> (f64, f64) {
    let lambda = x / TILE_SIZE * 2.0 * PI - PI;
    let phi = 2.0 * ((y / TILE_SIZE * 2.0 * PI - PI).exp().atan() - PI / 4.0);
    (lambda.to_degrees(), phi.to_degrees())
}

/// A flat, north-up Web Mercator viewport.
#[derive(Debug, Clone, Copy)]
pub struct WebMercatorViewport {
    center: (f64, f64),
    scale: f64,
    width: f64,
    height: f64,
}

impl WebMercatorViewport {
    pub fn new(state: &ViewportState) -> Self {
        let (cx, cy) = lnglat_to_world(state.longitude, state.latitude);
        let scale = 2f64.powf(state.zoom);
        Self {
            center: (cx * scale, cy * scale),
            scale,
            width: state.pixel_width.max(0.0),
            height: state.pixel_height.max(0.0),
        }
    }

    /// Screen pixel of a lon/lat position.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (wx, wy) = lnglat_to_world(lon, lat);
        let px = wx * self.scale - self.center.0 + self.width / 2.0;
        let py = self.center.1 - wy * self.scale + self.height / 2.0;
        (px, py)
    }

    /// Lon/lat position under a screen pixel.
    pub fn unproject(&self, px: f64, py: f64) -> (f64, f64) {
        let wx = (self.center.0 + px - self.width / 2.0) / self.scale;
        let wy = (self.center.1 - (py - self.height / 2.0)) / self.scale;
        world_to_lnglat(wx, wy)
    }

    /// Enclosing lon/lat rectangle of the viewport.
    ///
    /// With bearing and pitch at zero, the top-left and bottom-right corners
    /// are enough to span it.
    pub fn bounds(&self) -> BoundingBox {
        let (west, north) = self.unproject(0.0, 0.0);
        let (east, south) = self.unproject(self.width, self.height);
        BoundingBox::new(west, south, east, north)
    }
}

/// Geographic bounds of a viewport.
///
/// A viewport without area (zero width or height) yields a zero-area box at
/// the viewport center rather than an error.
pub fn viewport_bounds(state: &ViewportState) -> BoundingBox {
    if !state.has_area() {
        return BoundingBox::degenerate(state.longitude, state.latitude);
    }
    WebMercatorViewport::new(state).bounds()
}
