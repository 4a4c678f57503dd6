//! Multi-facet filtering and visibility toggles.

use serde::{Deserialize, Serialize};

use canopy_common::{BoundingBox, FieldNames, FilterCriteria, SpatialFeature};

const STATUS_REMOVED: &str = "REMOVED";
const STATUS_PLANNED: &str = "PLANNED";
const OWNERSHIP_PRIVATE: &str = "PRIV";

/// True if `feature` satisfies every active facet of `criteria`.
///
/// A feature without a value for an active facet does not pass it.
pub fn matches(feature: &SpatialFeature, criteria: &FilterCriteria, fields: &FieldNames) -> bool {
    criteria.active_facets().all(|facet| {
        feature
            .property(facet.field(fields))
            .and_then(|value| value.as_key())
            .is_some_and(|key| criteria.allowed(facet).contains(&*key))
    })
}

/// Features passing `criteria`, in input order.
///
/// With no active facet every feature passes.
pub fn filter<'a, I>(features: I, criteria: &FilterCriteria, fields: &FieldNames) -> Vec<&'a SpatialFeature>
where
    I: IntoIterator<Item = &'a SpatialFeature>,
{
    features
        .into_iter()
        .filter(|f| matches(f, criteria, fields))
        .collect()
}

/// Features whose position lies inside `bounds`, edges included.
pub fn within_bounds<'a, I>(features: I, bounds: &BoundingBox) -> Vec<&'a SpatialFeature>
where
    I: IntoIterator<Item = &'a SpatialFeature>,
{
    features
        .into_iter()
        .filter(|f| bounds.contains_point(f.lon(), f.lat()))
        .collect()
}

/// Coarse display toggles hiding whole classes of trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityOptions {
    pub show_removed: bool,
    pub show_private: bool,
    pub show_planned: bool,
}

impl Default for VisibilityOptions {
    fn default() -> Self {
        Self {
            show_removed: false,
            show_private: true,
            show_planned: false,
        }
    }
}

impl VisibilityOptions {
    /// Everything visible.
    pub fn all() -> Self {
        Self {
            show_removed: true,
            show_private: true,
            show_planned: true,
        }
    }

    pub fn is_visible(&self, feature: &SpatialFeature, fields: &FieldNames) -> bool {
        let status = feature.text(&fields.status);
        if !self.show_removed && status == Some(STATUS_REMOVED) {
            return false;
        }
        if !self.show_planned && status == Some(STATUS_PLANNED) {
            return false;
        }
        if !self.show_private && feature.text(&fields.ownership) == Some(OWNERSHIP_PRIVATE) {
            return false;
        }
        true
    }
}

/// Features not hidden by `options`, in input order.
pub fn visible<'a, I>(features: I, options: &VisibilityOptions, fields: &FieldNames) -> Vec<&'a SpatialFeature>
where
    I: IntoIterator<Item = &'a SpatialFeature>,
{
    features
        .into_iter()
        .filter(|f| options.is_visible(f, fields))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_common::Facet;
    use test_utils::FeatureBuilder;

    fn fields() -> FieldNames {
        FieldNames::default()
    }

    #[test]
    fn test_empty_criteria_passes_everything() {
        let features = vec![
            FeatureBuilder::new(1).genus("Acer").build(),
            FeatureBuilder::new(2).build(),
        ];
        let out = filter(&features, &FilterCriteria::new(), &fields());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_or_within_facet() {
        let features = vec![
            FeatureBuilder::new(1).genus("Acer").build(),
            FeatureBuilder::new(2).genus("Quercus").build(),
            FeatureBuilder::new(3).genus("Tilia").build(),
        ];
        let criteria = FilterCriteria::new().with(Facet::Genus, ["Acer", "Tilia"]);
        let ids: Vec<String> = filter(&features, &criteria, &fields())
            .iter()
            .map(|f| f.id.to_string())
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_and_across_facets() {
        let features = vec![
            FeatureBuilder::new(1).genus("Acer").ownership("PRIV").build(),
            FeatureBuilder::new(2).genus("Acer").ownership("SDOT").build(),
            FeatureBuilder::new(3).genus("Quercus").ownership("PRIV").build(),
        ];
        let criteria = FilterCriteria::new()
            .with(Facet::Genus, ["Acer"])
            .with(Facet::Ownership, ["PRIV"]);
        let out = filter(&features, &criteria, &fields());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id.to_string(), "1");
    }

    #[test]
    fn test_missing_value_fails_active_facet() {
        let features = vec![FeatureBuilder::new(1).null("GENUS").build()];
        let criteria = FilterCriteria::new().with(Facet::Genus, ["Acer"]);
        assert!(filter(&features, &criteria, &fields()).is_empty());
    }

    #[test]
    fn test_default_visibility_hides_removed_and_planned() {
        let features = vec![
            FeatureBuilder::new(1).status("INSVC").ownership("PRIV").build(),
            FeatureBuilder::new(2).status("REMOVED").build(),
            FeatureBuilder::new(3).status("PLANNED").build(),
            FeatureBuilder::new(4).build(),
        ];
        let out = visible(&features, &VisibilityOptions::default(), &fields());
        let ids: Vec<String> = out.iter().map(|f| f.id.to_string()).collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[test]
    fn test_hide_private() {
        let features = vec![
            FeatureBuilder::new(1).ownership("PRIV").build(),
            FeatureBuilder::new(2).ownership("SDOT").build(),
        ];
        let options = VisibilityOptions {
            show_private: false,
            ..VisibilityOptions::all()
        };
        assert_eq!(visible(&features, &options, &fields()).len(), 1);
    }

    #[test]
    fn test_within_bounds_inclusive() {
        let features = vec![
            FeatureBuilder::new(1).at(0.0, 0.0).build(),
            FeatureBuilder::new(2).at(1.0, 1.0).build(),
            FeatureBuilder::new(3).at(1.5, 0.5).build(),
        ];
        let out = within_bounds(&features, &BoundingBox::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(out.len(), 2);
    }
}
