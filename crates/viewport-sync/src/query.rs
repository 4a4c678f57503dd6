//! Feature layer query URL construction.

use reqwest::Url;
use serde_json::json;

use canopy_common::{BoundingBox, CanopyError, CanopyResult};

/// WGS84 spatial reference id.
pub const WGS84_WKID: u32 = 4326;

/// Build the envelope-intersects query for `bounds` against a feature layer
/// `/query` endpoint. All attribute fields are requested, as GeoJSON in WGS84.
pub fn build_query_url(base: &str, bounds: &BoundingBox) -> CanopyResult<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| CanopyError::InvalidConfig(format!("bad feature service URL {}: {}", base, e)))?;

    let geometry = json!({
        "xmin": bounds.west,
        "ymin": bounds.south,
        "xmax": bounds.east,
        "ymax": bounds.north,
        "spatialReference": { "wkid": WGS84_WKID },
    });

    url.query_pairs_mut()
        .append_pair("geometry", &geometry.to_string())
        .append_pair("geometryType", "esriGeometryEnvelope")
        .append_pair("spatialRel", "esriSpatialRelIntersects")
        .append_pair("outFields", "*")
        .append_pair("outSR", &WGS84_WKID.to_string())
        .append_pair("f", "geojson");

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio_test::assert_err;

    const BASE: &str = "https://services.example.com/arcgis/rest/services/Trees/FeatureServer/0/query";

    fn params(url: &Url) -> HashMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    #[test]
    fn test_query_parameters() {
        let url = build_query_url(BASE, &BoundingBox::new(-122.34, 47.60, -122.33, 47.61)).unwrap();
        let p = params(&url);

        assert_eq!(p["geometryType"], "esriGeometryEnvelope");
        assert_eq!(p["spatialRel"], "esriSpatialRelIntersects");
        assert_eq!(p["outFields"], "*");
        assert_eq!(p["outSR"], "4326");
        assert_eq!(p["f"], "geojson");
        assert!(url.path().ends_with("/FeatureServer/0/query"));
    }

    #[test]
    fn test_geometry_is_envelope_json() {
        let url = build_query_url(BASE, &BoundingBox::new(-122.34, 47.60, -122.33, 47.61)).unwrap();
        let geometry: serde_json::Value = serde_json::from_str(&params(&url)["geometry"]).unwrap();

        assert_eq!(geometry["xmin"], -122.34);
        assert_eq!(geometry["ymin"], 47.60);
        assert_eq!(geometry["xmax"], -122.33);
        assert_eq!(geometry["ymax"], 47.61);
        assert_eq!(geometry["spatialReference"]["wkid"], 4326);
    }

    #[test]
    fn test_bad_base_url() {
        let err = assert_err!(build_query_url("not a url", &BoundingBox::degenerate(0.0, 0.0)));
        assert!(matches!(err, CanopyError::InvalidConfig(_)));
    }
}
