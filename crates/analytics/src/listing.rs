//! Sorted, paginated feature listing.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use canopy_common::{FieldNames, SpatialFeature};

/// Column a listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Common name, case-insensitive.
    #[default]
    Name,
    /// Trunk diameter.
    Size,
    /// Planting date.
    Planted,
    /// Last verification date.
    LastUpdated,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "name" => Ok(SortKey::Name),
            "size" | "diameter" => Ok(SortKey::Size),
            "planted" => Ok(SortKey::Planted),
            "last-updated" | "lastupdated" => Ok(SortKey::LastUpdated),
            other => Err(format!("unknown sort key: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

/// One page of a sorted listing.
#[derive(Debug, Clone)]
pub struct ListingPage<'a> {
    pub items: Vec<&'a SpatialFeature>,
    /// Features across all pages.
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
}

impl ListingPage<'_> {
    pub fn page_count(&self) -> usize {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(self.per_page)
    }
}

fn compare(a: &SpatialFeature, b: &SpatialFeature, key: SortKey, fields: &FieldNames) -> Ordering {
    let number = |f: &SpatialFeature, field: &str| f.number(field).unwrap_or(0.0);
    match key {
        SortKey::Name => {
            let name = |f: &SpatialFeature| f.text(&fields.common_name).unwrap_or("").to_lowercase();
            name(a).cmp(&name(b))
        }
        SortKey::Size => number(a, &fields.diameter).total_cmp(&number(b, &fields.diameter)),
        SortKey::Planted => number(a, &fields.planted).total_cmp(&number(b, &fields.planted)),
        SortKey::LastUpdated => {
            number(a, &fields.last_verified).total_cmp(&number(b, &fields.last_verified))
        }
    }
}

/// Sort `features` by `key` and return page `page` (zero-based).
///
/// Missing values sort as zero or as the empty name. The sort is stable so
/// equal keys keep input order in both directions. A page past the end is
/// empty but still reports the total.
pub fn list<'a, I>(
    features: I,
    key: SortKey,
    order: SortOrder,
    page: usize,
    per_page: usize,
    fields: &FieldNames,
) -> ListingPage<'a>
where
    I: IntoIterator<Item = &'a SpatialFeature>,
{
    let mut sorted: Vec<&'a SpatialFeature> = features.into_iter().collect();
    sorted.sort_by(|a, b| {
        let ord = compare(a, b, key, fields);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });

    let total = sorted.len();
    let start = page.saturating_mul(per_page).min(total);
    let end = start.saturating_add(per_page).min(total);

    ListingPage {
        items: sorted[start..end].to_vec(),
        total,
        page,
        per_page,
    }
}
