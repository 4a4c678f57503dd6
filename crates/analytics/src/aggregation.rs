//! Summary statistics over a filtered feature set.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use canopy_common::{FieldNames, SpatialFeature, CONDITION_DOMAIN};

/// Milliseconds in a 365.25-day year.
pub const MS_PER_YEAR: f64 = 1000.0 * 60.0 * 60.0 * 24.0 * 365.25;

/// Occurrences of one genus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenusCount {
    pub name: String,
    pub count: usize,
}

/// Statistics for one filtered set.
///
/// Averages are `None` when no feature carries a usable value; an empty set
/// produces a snapshot with total 0, no averages and all-zero buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationSnapshot {
    pub total: usize,
    pub average_diameter: Option<f64>,
    pub average_age_years: Option<f64>,
    /// Full genus distribution, count descending, ties in first-seen order.
    pub genus_counts: Vec<GenusCount>,
    /// One bucket per rating in [`CONDITION_DOMAIN`].
    pub condition_histogram: BTreeMap<u8, usize>,
}

impl AggregationSnapshot {
    pub fn empty() -> Self {
        Self {
            total: 0,
            average_diameter: None,
            average_age_years: None,
            genus_counts: Vec::new(),
            condition_histogram: empty_histogram(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// The `n` most common genera.
    pub fn top_genera(&self, n: usize) -> &[GenusCount] {
        &self.genus_counts[..n.min(self.genus_counts.len())]
    }

    pub fn condition_count(&self, rating: u8) -> usize {
        self.condition_histogram.get(&rating).copied().unwrap_or(0)
    }

    /// Share of all features (not only rated ones) in a bucket, in percent.
    pub fn condition_percentage(&self, rating: u8) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.condition_count(rating) as f64 / self.total as f64 * 100.0
    }

    /// Percentages for every bucket, best rating first.
    pub fn condition_percentages(&self) -> Vec<(u8, f64)> {
        CONDITION_DOMAIN
            .iter()
            .rev()
            .map(|&r| (r, self.condition_percentage(r)))
            .collect()
    }
}

impl Default for AggregationSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

fn empty_histogram() -> BTreeMap<u8, usize> {
    CONDITION_DOMAIN.iter().map(|&r| (r, 0)).collect()
}

#[derive(Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Compute the snapshot for `features` as of `now`.
pub fn aggregate<'a, I>(features: I, fields: &FieldNames, now: DateTime<Utc>) -> AggregationSnapshot
where
    I: IntoIterator<Item = &'a SpatialFeature>,
{
    let now_ms = now.timestamp_millis() as f64;

    let mut total = 0;
    let mut diameter = Mean::default();
    let mut age = Mean::default();
    let mut genera = GenusTally::default();
    let mut condition_histogram = empty_histogram();

    for feature in features {
        total += 1;

        if let Some(d) = feature.number(&fields.diameter) {
            if d > 0.0 {
                diameter.add(d);
            }
        }

        if let Some(planted) = feature.number(&fields.planted) {
            let years = (now_ms - planted) / MS_PER_YEAR;
            if years > 0.0 {
                age.add(years);
            }
        }

        if let Some(genus) = feature.text(&fields.genus) {
            genera.add(genus);
        }

        if let Some(rating) = condition_rating(feature, &fields.condition) {
            if let Some(bucket) = condition_histogram.get_mut(&rating) {
                *bucket += 1;
            }
        }
    }

    AggregationSnapshot {
        total,
        average_diameter: diameter.value(),
        average_age_years: age.value(),
        genus_counts: genera.into_sorted(),
        condition_histogram,
    }
}

/// Genus distribution alone, for full distribution views.
pub fn genus_histogram<'a, I>(features: I, genus_field: &str) -> Vec<GenusCount>
where
    I: IntoIterator<Item = &'a SpatialFeature>,
{
    let mut genera = GenusTally::default();
    for genus in features.into_iter().filter_map(|f| f.text(genus_field)) {
        genera.add(genus);
    }
    genera.into_sorted()
}

/// Trimmed rating, if it parses as an integer.
fn condition_rating(feature: &SpatialFeature, field: &str) -> Option<u8> {
    let key = feature.property(field)?.as_key()?;
    key.trim().parse().ok()
}

/// Counts in first-seen order.
#[derive(Default)]
struct GenusTally {
    index: HashMap<String, usize>,
    counts: Vec<GenusCount>,
}

impl GenusTally {
    fn add(&mut self, genus: &str) {
        if genus.is_empty() {
            return;
        }
        match self.index.get(genus) {
            Some(&i) => self.counts[i].count += 1,
            None => {
                self.index.insert(genus.to_string(), self.counts.len());
                self.counts.push(GenusCount {
                    name: genus.to_string(),
                    count: 1,
                });
            }
        }
    }

    fn into_sorted(mut self) -> Vec<GenusCount> {
        // stable: equal counts keep first-seen order
        self.counts.sort_by(|a, b| b.count.cmp(&a.count));
        self.counts
    }
}
