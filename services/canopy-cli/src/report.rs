//! JSON report for a feature set under the current filters.

use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use std::collections::BTreeMap;

use analytics::{
    aggregate, facet_options, filter, format, list, visible, FacetOption, GenusCount, SortKey,
    SortOrder, VisibilityOptions,
};
use canopy_common::{CanopyConfig, Facet, FeatureSet, FilterCriteria, SpatialFeature, CONDITION_DOMAIN};

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Allowed genus values (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub genus: Vec<String>,

    /// Allowed status codes, e.g. INSVC
    #[arg(long, value_delimiter = ',')]
    pub status: Vec<String>,

    /// Allowed ownership codes, e.g. PRIV,SDOT
    #[arg(long, value_delimiter = ',')]
    pub ownership: Vec<String>,

    /// Include removed trees
    #[arg(long)]
    pub show_removed: bool,

    /// Exclude privately owned trees
    #[arg(long)]
    pub hide_private: bool,

    /// Include planned plantings
    #[arg(long)]
    pub show_planned: bool,

    /// Include selectable values per facet in the output
    #[arg(long)]
    pub facets: bool,
}

impl FilterArgs {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria::new()
            .with(Facet::Genus, self.genus.iter().cloned())
            .with(Facet::Status, self.status.iter().cloned())
            .with(Facet::Ownership, self.ownership.iter().cloned())
    }

    pub fn visibility(&self) -> VisibilityOptions {
        VisibilityOptions {
            show_removed: self.show_removed,
            show_private: !self.hide_private,
            show_planned: self.show_planned,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ListingArgs {
    /// Rows per listing page; 0 disables the listing
    #[arg(long, default_value_t = 0)]
    pub per_page: usize,

    /// Zero-based listing page
    #[arg(long, default_value_t = 0)]
    pub page: usize,

    /// Listing order: name, size, planted, last-updated
    #[arg(long, default_value = "name")]
    pub sort: SortKey,

    /// asc or desc
    #[arg(long, default_value = "asc")]
    pub order: SortOrder,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub loaded: usize,
    pub visible: usize,
    pub matching: usize,
    pub average_diameter: Option<f64>,
    pub average_age_years: Option<f64>,
    pub display: DisplaySummary,
    pub top_genera: Vec<GenusCount>,
    pub condition: Vec<ConditionRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facets: Option<BTreeMap<Facet, Vec<FacetOption>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing: Option<ListingReport>,
}

#[derive(Debug, Serialize)]
pub struct DisplaySummary {
    pub average_diameter: String,
    pub average_age: String,
}

#[derive(Debug, Serialize)]
pub struct ConditionRow {
    pub rating: u8,
    pub label: &'static str,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Serialize)]
pub struct ListingReport {
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
    pub rows: Vec<ListingRow>,
}

#[derive(Debug, Serialize)]
pub struct ListingRow {
    pub id: String,
    pub name: Option<String>,
    pub size: Option<String>,
    pub planted: Option<String>,
    pub last_updated: Option<String>,
    pub status: Option<String>,
    pub ownership: Option<String>,
    pub longitude: String,
    pub latitude: String,
    pub street_view: String,
}

pub fn build_report(
    features: &FeatureSet,
    filters: &FilterArgs,
    listing: Option<&ListingArgs>,
    config: &CanopyConfig,
    now: DateTime<Utc>,
) -> Report {
    let fields = &config.fields;
    let shown = visible(features, &filters.visibility(), fields);
    let matching = filter(shown.iter().copied(), &filters.criteria(), fields);
    let snapshot = aggregate(matching.iter().copied(), fields, now);

    let condition = CONDITION_DOMAIN
        .iter()
        .rev()
        .map(|&rating| ConditionRow {
            rating,
            label: format::condition_label(rating).unwrap_or_default(),
            count: snapshot.condition_count(rating),
            percent: snapshot.condition_percentage(rating),
        })
        .collect();

    let facets = filters.facets.then(|| {
        Facet::ALL
            .iter()
            .map(|&facet| {
                let options = facet_options(shown.iter().copied(), facet, fields, config.facet_option_limit);
                (facet, options)
            })
            .collect()
    });

    let listing = listing.filter(|l| l.per_page > 0).map(|l| {
        let page = list(matching.iter().copied(), l.sort, l.order, l.page, l.per_page, fields);
        ListingReport {
            total: page.total,
            page: page.page,
            page_count: page.page_count(),
            rows: page.items.iter().map(|f| listing_row(f, config)).collect(),
        }
    });

    Report {
        loaded: features.len(),
        visible: shown.len(),
        matching: matching.len(),
        average_diameter: snapshot.average_diameter,
        average_age_years: snapshot.average_age_years,
        display: DisplaySummary {
            average_diameter: format::average(snapshot.average_diameter),
            average_age: format::average(snapshot.average_age_years),
        },
        top_genera: snapshot.top_genera(config.summary_top_n).to_vec(),
        condition,
        facets,
        listing,
    }
}

fn listing_row(feature: &SpatialFeature, config: &CanopyConfig) -> ListingRow {
    let fields = &config.fields;
    ListingRow {
        id: feature.id.to_string(),
        name: feature.text(&fields.common_name).map(str::to_string),
        size: feature.number(&fields.diameter).map(format::diameter),
        planted: feature.number(&fields.planted).and_then(format::date),
        last_updated: feature.number(&fields.last_verified).and_then(format::date),
        status: feature
            .text(&fields.status)
            .map(|s| format::status_label(s).to_string()),
        ownership: feature
            .text(&fields.ownership)
            .map(|s| format::ownership_label(s).to_string()),
        longitude: format::coordinate(feature.lon()),
        latitude: format::coordinate(feature.lat()),
        street_view: format::street_view_url(feature.lon(), feature.lat()),
    }
}
