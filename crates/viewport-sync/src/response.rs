//! GeoJSON feature collection parsing.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use canopy_common::{CanopyError, CanopyResult, FeatureId, FeatureSet, PropertyValue, SpatialFeature};

#[derive(Debug, Deserialize)]
struct RawCollection {
    #[serde(default)]
    features: Option<Vec<RawFeature>>,
    #[serde(default)]
    error: Option<ServiceError>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    id: Option<FeatureId>,
    #[serde(default)]
    geometry: Option<RawGeometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(default)]
    coordinates: Vec<f64>,
}

/// Error body some feature services return with a 200 status.
#[derive(Debug, Deserialize)]
struct ServiceError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

/// Parse a GeoJSON feature collection into a [`FeatureSet`].
///
/// Features keep response order. A missing `features` key is an empty set.
/// Features without a point position are skipped; features without an id
/// get `#<position in the response>`, which no numeric id can equal. Array and object attribute
/// values are dropped.
pub fn parse_feature_collection(body: &str) -> CanopyResult<FeatureSet> {
    let raw: RawCollection = serde_json::from_str(body)?;

    if let Some(err) = raw.error {
        return Err(CanopyError::Parse(format!(
            "service error {}: {}",
            err.code.unwrap_or_default(),
            err.message.unwrap_or_default()
        )));
    }

    let raw_features = raw.features.unwrap_or_default();
    let mut skipped = 0usize;
    let mut features = Vec::with_capacity(raw_features.len());

    for (index, raw) in raw_features.into_iter().enumerate() {
        let position = raw
            .geometry
            .as_ref()
            .and_then(|g| g.coordinates.get(0..2))
            .map(|c| [c[0], c[1]]);

        let Some([lon, lat]) = position else {
            skipped += 1;
            continue;
        };

        let id = raw
            .id
            .unwrap_or_else(|| FeatureId::Text(format!("#{}", index)));
        let mut feature = SpatialFeature::new(id, lon, lat);
        for (name, value) in raw.properties.unwrap_or_default() {
            if let Some(value) = PropertyValue::from_json(value) {
                feature.properties.insert(name, value);
            }
        }
        features.push(feature);
    }

    if skipped > 0 {
        debug!(skipped = skipped, kept = features.len(), "Skipped features without a point geometry");
    }

    Ok(FeatureSet::new(features))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collection() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "id": 17,
                 "geometry": {"type": "Point", "coordinates": [-122.3351, 47.6080]},
                 "properties": {"GENUS": "Acer", "DIAM": 12.5, "PLANTED_DATE": null, "TAGS": ["a"]}},
                {"type": "Feature", "id": 18,
                 "geometry": {"type": "Point", "coordinates": [-122.3340, 47.6091]},
                 "properties": {"GENUS": "Quercus"}}
            ]
        }"#;
        let set = parse_feature_collection(body).unwrap();

        assert_eq!(set.len(), 2);
        let first = &set[0];
        assert_eq!(first.id, FeatureId::Number(17));
        assert_eq!(first.lon(), -122.3351);
        assert_eq!(first.text("GENUS"), Some("Acer"));
        assert_eq!(first.number("DIAM"), Some(12.5));
        assert!(first.property("PLANTED_DATE").is_none());
        assert!(!first.properties.contains_key("TAGS"));
        assert_eq!(set[1].text("GENUS"), Some("Quercus"));
    }

    #[test]
    fn test_missing_features_is_empty() {
        let set = parse_feature_collection(r#"{"type": "FeatureCollection"}"#).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_skips_features_without_position() {
        let body = r#"{"features": [
            {"id": 1, "geometry": null, "properties": {}},
            {"id": 2, "geometry": {"coordinates": [1.0]}},
            {"geometry": {"coordinates": [1.0, 2.0]}}
        ]}"#;
        let set = parse_feature_collection(body).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].id, FeatureId::Text("#2".to_string()));
    }

    #[test]
    fn test_fallback_id_does_not_collide_with_numeric_ids() {
        let body = r#"{"features": [
            {"id": 1, "geometry": {"coordinates": [1.0, 2.0]}},
            {"geometry": {"coordinates": [3.0, 4.0]}}
        ]}"#;
        let set = parse_feature_collection(body).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set[0].id, FeatureId::Number(1));
        assert_eq!(set[1].id, FeatureId::Text("#1".to_string()));
        assert_ne!(set[0].id, set[1].id);
    }

    #[test]
    fn test_service_error_body() {
        let body = r#"{"error": {"code": 400, "message": "Invalid geometry"}}"#;
        let err = parse_feature_collection(body).unwrap_err();
        assert!(matches!(err, CanopyError::Parse(ref m) if m.contains("Invalid geometry")));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            parse_feature_collection("<html>"),
            Err(CanopyError::Parse(_))
        ));
    }
}
