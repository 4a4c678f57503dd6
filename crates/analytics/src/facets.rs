//! Selectable values per facet.

use serde::Serialize;
use std::collections::HashMap;

use canopy_common::{Facet, FieldNames, SpatialFeature};

/// Placeholder genus used by the provider for empty planting sites.
const PLACEHOLDER_GENUS: &str = "Planting";

/// A value offered for selection along with how many features carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetOption {
    pub value: String,
    pub count: usize,
}

/// Distinct values of `facet` in `features`, most frequent first.
///
/// Ties keep first-seen order. The genus placeholder is dropped before the
/// list is cut to `limit`.
pub fn facet_options<'a, I>(
    features: I,
    facet: Facet,
    fields: &FieldNames,
    limit: usize,
) -> Vec<FacetOption>
where
    I: IntoIterator<Item = &'a SpatialFeature>,
{
    let field = facet.field(fields);
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut options: Vec<FacetOption> = Vec::new();

    for key in features
        .into_iter()
        .filter_map(|f| f.property(field).and_then(|v| v.as_key()))
    {
        if key.is_empty() || (facet == Facet::Genus && key == PLACEHOLDER_GENUS) {
            continue;
        }
        match index.get(&*key) {
            Some(&i) => options[i].count += 1,
            None => {
                index.insert(key.to_string(), options.len());
                options.push(FacetOption {
                    value: key.into_owned(),
                    count: 1,
                });
            }
        }
    }

    options.sort_by(|a, b| b.count.cmp(&a.count));
    options.truncate(limit);
    options
}
