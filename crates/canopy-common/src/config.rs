//! Startup configuration.
//!
//! Values are fixed once the pipeline starts. They come from defaults, an
//! optional YAML file and `CANOPY_*` environment variables, in that order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::error::{CanopyError, CanopyResult};

/// Condition rating buckets. Values outside this domain are ignored.
pub const CONDITION_DOMAIN: [u8; 5] = [1, 2, 3, 4, 5];

const DEFAULT_FEATURE_SERVICE_URL: &str = "https://services.arcgis.com/ZOyb2t4B0UYuYNYH/arcgis/rest/services/SDOT_Trees_CDL/FeatureServer/0/query";
const DEFAULT_SUMMARY_SERVICE_URL: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";

/// Configuration shared by every pipeline component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanopyConfig {
    /// Feature layer query endpoint.
    pub feature_service_url: String,

    /// Page summary endpoint; the title is appended as a path segment.
    pub summary_service_url: String,

    /// Below this zoom no spatial query is issued.
    pub zoom_threshold: f64,

    /// Idle window before a viewport change becomes a query.
    pub viewport_debounce_ms: u64,

    /// Idle window before an enrichment key becomes a lookup.
    pub enrichment_debounce_ms: u64,

    /// Per-request HTTP timeout.
    pub request_timeout_secs: u64,

    /// Genus entries in summary views.
    pub summary_top_n: usize,

    /// Maximum values offered per facet.
    pub facet_option_limit: usize,

    /// Provider attribute names.
    pub fields: FieldNames,

    /// Scientific name -> summary title, checked before name cleanup.
    pub title_overrides: BTreeMap<String, String>,
}

impl Default for CanopyConfig {
    fn default() -> Self {
        Self {
            feature_service_url: DEFAULT_FEATURE_SERVICE_URL.to_string(),
            summary_service_url: DEFAULT_SUMMARY_SERVICE_URL.to_string(),
            zoom_threshold: 16.0,
            viewport_debounce_ms: 300,
            enrichment_debounce_ms: 500,
            request_timeout_secs: 30,
            summary_top_n: 3,
            facet_option_limit: 20,
            fields: FieldNames::default(),
            title_overrides: BTreeMap::new(),
        }
    }
}

impl CanopyConfig {
    /// Defaults overlaid with environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load a YAML file; missing keys keep their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> CanopyResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> CanopyResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Apply `CANOPY_*` environment variables on top of `self`.
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok());
        self
    }

    /// Apply overrides from an arbitrary key lookup. Unparseable values are
    /// ignored and the previous value kept.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("CANOPY_FEATURE_SERVICE_URL") {
            self.feature_service_url = val;
        }

        if let Some(val) = lookup("CANOPY_SUMMARY_SERVICE_URL") {
            self.summary_service_url = val;
        }

        if let Some(val) = lookup("CANOPY_ZOOM_THRESHOLD") {
            if let Ok(zoom) = val.parse() {
                self.zoom_threshold = zoom;
            }
        }

        if let Some(val) = lookup("CANOPY_VIEWPORT_DEBOUNCE_MS") {
            if let Ok(ms) = val.parse() {
                self.viewport_debounce_ms = ms;
            }
        }

        if let Some(val) = lookup("CANOPY_ENRICHMENT_DEBOUNCE_MS") {
            if let Ok(ms) = val.parse() {
                self.enrichment_debounce_ms = ms;
            }
        }

        if let Some(val) = lookup("CANOPY_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.request_timeout_secs = secs;
            }
        }

        if let Some(val) = lookup("CANOPY_SUMMARY_TOP_N") {
            if let Ok(n) = val.parse() {
                self.summary_top_n = n;
            }
        }

        if let Some(val) = lookup("CANOPY_FACET_OPTION_LIMIT") {
            if let Ok(n) = val.parse() {
                self.facet_option_limit = n;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> CanopyResult<()> {
        if self.feature_service_url.trim().is_empty() {
            return Err(CanopyError::InvalidConfig(
                "feature_service_url must not be empty".to_string(),
            ));
        }

        if self.summary_service_url.trim().is_empty() {
            return Err(CanopyError::InvalidConfig(
                "summary_service_url must not be empty".to_string(),
            ));
        }

        if !self.zoom_threshold.is_finite() || self.zoom_threshold < 0.0 {
            return Err(CanopyError::InvalidConfig(
                "zoom_threshold must be >= 0".to_string(),
            ));
        }

        if self.viewport_debounce_ms == 0 || self.enrichment_debounce_ms == 0 {
            return Err(CanopyError::InvalidConfig(
                "debounce delays must be > 0".to_string(),
            ));
        }

        if self.summary_top_n == 0 {
            return Err(CanopyError::InvalidConfig(
                "summary_top_n must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn viewport_debounce(&self) -> Duration {
        Duration::from_millis(self.viewport_debounce_ms)
    }

    pub fn enrichment_debounce(&self) -> Duration {
        Duration::from_millis(self.enrichment_debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Provider attribute names for the logical tree fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub genus: String,
    pub status: String,
    pub ownership: String,
    pub diameter: String,
    pub planted: String,
    pub condition: String,
    pub common_name: String,
    pub scientific_name: String,
    pub last_verified: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            genus: "GENUS".to_string(),
            status: "CURRENT_STATUS".to_string(),
            ownership: "OWNERSHIP".to_string(),
            diameter: "DIAM".to_string(),
            planted: "PLANTED_DATE".to_string(),
            condition: "CONDITION_RATING".to_string(),
            common_name: "COMMON_NAME".to_string(),
            scientific_name: "SCIENTIFIC_NAME".to_string(),
            last_verified: "LAST_VERIFY_DATE".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_defaults_are_valid() {
        let config = CanopyConfig::default();
        assert_ok!(config.validate());
        assert_eq!(config.viewport_debounce(), Duration::from_millis(300));
        assert_eq!(config.summary_top_n, 3);
        assert_eq!(config.fields.diameter, "DIAM");
    }

    #[test]
    fn test_overrides_skip_unparseable_values() {
        let vars: HashMap<&str, &str> = [
            ("CANOPY_ZOOM_THRESHOLD", "15.5"),
            ("CANOPY_VIEWPORT_DEBOUNCE_MS", "not-a-number"),
            ("CANOPY_SUMMARY_TOP_N", "5"),
        ]
        .into_iter()
        .collect();

        let mut config = CanopyConfig::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.zoom_threshold, 15.5);
        assert_eq!(config.viewport_debounce_ms, 300);
        assert_eq!(config.summary_top_n, 5);
    }

    #[test]
    fn test_validate_rejects_zero_debounce() {
        let config = CanopyConfig {
            viewport_debounce_ms: 0,
            ..Default::default()
        };
        assert_err!(config.validate());
    }

    #[test]
    fn test_yaml_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "zoom_threshold: 14\nfields:\n  genus: GENUS_NAME\ntitle_overrides:\n  Acer: Maple"
        )
        .unwrap();

        let config = CanopyConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.zoom_threshold, 14.0);
        assert_eq!(config.fields.genus, "GENUS_NAME");
        assert_eq!(config.fields.status, "CURRENT_STATUS");
        assert_eq!(config.title_overrides.get("Acer").map(String::as_str), Some("Maple"));
        assert_eq!(config.enrichment_debounce_ms, 500);
    }

    #[test]
    fn test_yaml_type_error_is_config_error() {
        let err = CanopyConfig::from_yaml_str("zoom_threshold: [1, 2]").unwrap_err();
        assert!(matches!(err, CanopyError::InvalidConfig(_)));
    }
}
