//! Point features returned by the spatial query.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;

/// Identifier of a feature, unique within one result set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureId {
    Number(i64),
    Text(String),
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureId::Number(n) => write!(f, "{}", n),
            FeatureId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FeatureId {
    fn from(n: i64) -> Self {
        FeatureId::Number(n)
    }
}

impl From<&str> for FeatureId {
    fn from(s: &str) -> Self {
        FeatureId::Text(s.to_string())
    }
}

/// A scalar attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl PropertyValue {
    /// Convert a JSON value, dropping arrays and objects (not scalars).
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(PropertyValue::Null),
            serde_json::Value::Bool(b) => Some(PropertyValue::Bool(b)),
            serde_json::Value::Number(n) => n.as_f64().map(PropertyValue::Number),
            serde_json::Value::String(s) => Some(PropertyValue::Text(s)),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    /// Numeric value, only for `Number`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text value, only for `Text`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Canonical string form used for facet membership and bucket lookup.
    ///
    /// Integral numbers render without a fractional part so `3.0` and `"3"`
    /// compare equal. `Null` has no key.
    pub fn as_key(&self) -> Option<Cow<'_, str>> {
        match self {
            PropertyValue::Null => None,
            PropertyValue::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            PropertyValue::Number(n) if n.fract() == 0.0 && n.is_finite() => {
                Some(Cow::Owned(format!("{}", *n as i64)))
            }
            PropertyValue::Number(n) => Some(Cow::Owned(n.to_string())),
            PropertyValue::Text(s) => Some(Cow::Borrowed(s)),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        PropertyValue::Number(n)
    }
}

/// A single point feature (a tree) with its attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialFeature {
    pub id: FeatureId,
    /// `[longitude, latitude]` in degrees.
    pub position: [f64; 2],
    pub properties: BTreeMap<String, PropertyValue>,
}

impl SpatialFeature {
    pub fn new(id: impl Into<FeatureId>, lon: f64, lat: f64) -> Self {
        Self {
            id: id.into(),
            position: [lon, lat],
            properties: BTreeMap::new(),
        }
    }

    pub fn lon(&self) -> f64 {
        self.position[0]
    }

    pub fn lat(&self) -> f64 {
        self.position[1]
    }

    /// Attribute value; `None` when missing or explicitly null.
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name).filter(|v| !v.is_null())
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.property(name).and_then(PropertyValue::as_str)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.property(name).and_then(PropertyValue::as_f64)
    }
}

/// Ordered features from one fetch, in provider response order.
///
/// Replaced wholesale on every successful fetch, never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet(Vec<SpatialFeature>);

impl FeatureSet {
    pub fn new(features: Vec<SpatialFeature>) -> Self {
        Self(features)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn into_inner(self) -> Vec<SpatialFeature> {
        self.0
    }
}

impl Deref for FeatureSet {
    type Target = [SpatialFeature];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<SpatialFeature> for FeatureSet {
    fn from_iter<T: IntoIterator<Item = SpatialFeature>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<SpatialFeature>> for FeatureSet {
    fn from(features: Vec<SpatialFeature>) -> Self {
        Self(features)
    }
}

impl<'a> IntoIterator for &'a FeatureSet {
    type Item = &'a SpatialFeature;
    type IntoIter = std::slice::Iter<'a, SpatialFeature>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_normalizes_integral_numbers() {
        assert_eq!(PropertyValue::Number(3.0).as_key().as_deref(), Some("3"));
        assert_eq!(PropertyValue::Number(2.5).as_key().as_deref(), Some("2.5"));
        assert_eq!(PropertyValue::from("PRIV").as_key().as_deref(), Some("PRIV"));
        assert_eq!(PropertyValue::Null.as_key(), None);
    }

    #[test]
    fn test_from_json_drops_non_scalars() {
        assert_eq!(
            PropertyValue::from_json(serde_json::json!(12)),
            Some(PropertyValue::Number(12.0))
        );
        assert_eq!(PropertyValue::from_json(serde_json::json!([1, 2])), None);
        assert_eq!(PropertyValue::from_json(serde_json::json!({"a": 1})), None);
    }

    #[test]
    fn test_null_property_reads_as_missing() {
        let mut f = SpatialFeature::new(1, -122.3, 47.6);
        f.properties.insert("DIAM".into(), PropertyValue::Null);
        assert!(f.property("DIAM").is_none());
        assert!(f.number("DIAM").is_none());
    }

    #[test]
    fn test_feature_id_display() {
        assert_eq!(FeatureId::from(42).to_string(), "42");
        assert_eq!(FeatureId::from("abc").to_string(), "abc");
    }
}
