//! Multi-facet filter criteria.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::config::FieldNames;

/// One independent filter dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    Genus,
    Status,
    Ownership,
}

impl Facet {
    pub const ALL: [Facet; 3] = [Facet::Genus, Facet::Status, Facet::Ownership];

    /// Provider attribute holding this facet's value.
    pub fn field<'a>(&self, fields: &'a FieldNames) -> &'a str {
        match self {
            Facet::Genus => &fields.genus,
            Facet::Status => &fields.status,
            Facet::Ownership => &fields.ownership,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Facet::Genus => "genus",
            Facet::Status => "status",
            Facet::Ownership => "ownership",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Facet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "genus" => Ok(Facet::Genus),
            "status" => Ok(Facet::Status),
            "ownership" => Ok(Facet::Ownership),
            other => Err(format!("unknown facet: {}", other)),
        }
    }
}

/// Allowed values per facet.
///
/// An empty set leaves the facet inactive. A feature passes when, for every
/// active facet, its value is in that facet's set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub genus: BTreeSet<String>,
    #[serde(default)]
    pub status: BTreeSet<String>,
    #[serde(default)]
    pub ownership: BTreeSet<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form: restrict `facet` to `values`.
    pub fn with<I, S>(mut self, facet: Facet, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_mut(facet)
            .extend(values.into_iter().map(Into::into));
        self
    }

    pub fn allowed(&self, facet: Facet) -> &BTreeSet<String> {
        match facet {
            Facet::Genus => &self.genus,
            Facet::Status => &self.status,
            Facet::Ownership => &self.ownership,
        }
    }

    pub fn allowed_mut(&mut self, facet: Facet) -> &mut BTreeSet<String> {
        match facet {
            Facet::Genus => &mut self.genus,
            Facet::Status => &mut self.status,
            Facet::Ownership => &mut self.ownership,
        }
    }

    /// Add `value` to the facet, or remove it if already selected.
    /// Returns whether the value is selected afterwards.
    pub fn toggle(&mut self, facet: Facet, value: &str) -> bool {
        let set = self.allowed_mut(facet);
        if set.remove(value) {
            false
        } else {
            set.insert(value.to_string());
            true
        }
    }

    pub fn clear(&mut self, facet: Facet) {
        self.allowed_mut(facet).clear();
    }

    pub fn clear_all(&mut self) {
        for facet in Facet::ALL {
            self.clear(facet);
        }
    }

    pub fn is_active(&self, facet: Facet) -> bool {
        !self.allowed(facet).is_empty()
    }

    pub fn active_facets(&self) -> impl Iterator<Item = Facet> + '_ {
        Facet::ALL.into_iter().filter(|f| self.is_active(*f))
    }

    /// True when no facet restricts anything.
    pub fn is_unrestricted(&self) -> bool {
        self.active_facets().next().is_none()
    }
}
