//! Viewport bounds checked against an independent spherical-Mercator
//! computation in meters.

use canopy_common::ViewportState;
use projection::{viewport_bounds, TILE_SIZE};
use test_utils::{assert_approx_eq, fixtures};

const EARTH_RADIUS: f64 = 6_378_137.0;

/// Bounds from the meters-per-pixel formulation of the same projection.
fn reference_bounds(state: &ViewportState) -> (f64, f64, f64, f64) {
    let resolution = 2.0 * std::f64::consts::PI * EARTH_RADIUS / (TILE_SIZE * 2f64.powf(state.zoom));
    let x = EARTH_RADIUS * state.longitude.to_radians();
    let y = EARTH_RADIUS
        * (std::f64::consts::FRAC_PI_4 + state.latitude.to_radians() / 2.0)
            .tan()
            .ln();

    let half_w = state.pixel_width / 2.0 * resolution;
    let half_h = state.pixel_height / 2.0 * resolution;

    let to_lon = |x: f64| (x / EARTH_RADIUS).to_degrees();
    let to_lat = |y: f64| (y / EARTH_RADIUS).sinh().atan().to_degrees();

    (to_lon(x - half_w), to_lat(y - half_h), to_lon(x + half_w), to_lat(y + half_h))
}

#[test]
fn test_zoom_17_matches_reference() {
    let state = fixtures::viewport::downtown_seattle(17.0);
    let bbox = viewport_bounds(&state);
    let (west, south, east, north) = reference_bounds(&state);

    assert_approx_eq!(bbox.west, west, 1e-9);
    assert_approx_eq!(bbox.south, south, 1e-9);
    assert_approx_eq!(bbox.east, east, 1e-9);
    assert_approx_eq!(bbox.north, north, 1e-9);
}

#[test]
fn test_zoom_17_span_is_a_few_blocks() {
    let state = fixtures::viewport::downtown_seattle(17.0);
    let bbox = viewport_bounds(&state);
    // 1280px at zoom 17 with 512px tiles: 360 * 1280 / (512 * 2^17) degrees
    let expected_width = 360.0 * state.pixel_width / (TILE_SIZE * 2f64.powi(17));
    assert_approx_eq!(bbox.width(), expected_width, 1e-9);
    assert!(bbox.height() > 0.0);
}

#[test]
fn test_higher_zoom_shrinks_bounds() {
    let wide = viewport_bounds(&fixtures::viewport::downtown_seattle(16.0));
    let narrow = viewport_bounds(&fixtures::viewport::downtown_seattle(18.0));
    assert!(narrow.width() < wide.width());
    assert!(narrow.height() < wide.height());
    assert_approx_eq!(wide.width() / narrow.width(), 4.0, 1e-6);
}

#[test]
fn test_non_degenerate_viewports_are_ordered() {
    for zoom in [0.0, 3.5, 10.0, 16.0, 20.0] {
        for &(w, h) in &[(1.0, 1.0), (320.0, 640.0), (1920.0, 1080.0)] {
            let state = ViewportState::new(-122.335167, 47.608013, zoom, w, h);
            let bbox = viewport_bounds(&state);
            assert!(bbox.west < bbox.east, "zoom {} size {}x{}", zoom, w, h);
            assert!(bbox.south < bbox.north, "zoom {} size {}x{}", zoom, w, h);
        }
    }
}

#[test]
fn test_bounds_ignore_pitch_and_bearing() {
    let flat = fixtures::viewport::downtown_seattle(17.0);
    let tilted = ViewportState {
        pitch: 45.0,
        bearing: 30.0,
        ..flat
    };
    assert_eq!(viewport_bounds(&flat), viewport_bounds(&tilted));
}

#[test]
fn test_zero_height_is_degenerate() {
    let state = fixtures::viewport::downtown_seattle(17.0).with_size(800.0, 0.0);
    let bbox = viewport_bounds(&state);
    assert_eq!(bbox.width(), 0.0);
    assert_eq!(bbox.height(), 0.0);
}
