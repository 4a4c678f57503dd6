//! Summary page title resolution from scientific names.

use std::collections::BTreeMap;

use canopy_common::CanopyConfig;

/// Tokens that end the usable part of a name: infraspecific ranks,
/// unspecified species and hybrid markers.
const STOP_TOKENS: [&str; 7] = ["var.", "ssp.", "subsp.", "spp.", "sp.", "x", "×"];

/// Reduce a scientific name to the binomial (or genus) a summary page is
/// likely to exist for.
///
/// Quoted cultivar names and everything from the first rank or hybrid
/// marker on are dropped; whitespace is collapsed.
///
/// ```
/// use enrichment::cleanup_scientific_name;
///
/// assert_eq!(cleanup_scientific_name("Acer rubrum 'Armstrong'"), "Acer rubrum");
/// assert_eq!(cleanup_scientific_name("Gleditsia triacanthos var. inermis"), "Gleditsia triacanthos");
/// ```
pub fn cleanup_scientific_name(name: &str) -> String {
    let mut words: Vec<&str> = Vec::new();
    for token in name.split_whitespace() {
        if token.starts_with('\'') || token.starts_with('"') || token.starts_with('‘') {
            break;
        }
        if STOP_TOKENS.iter().any(|stop| token.eq_ignore_ascii_case(stop)) {
            break;
        }
        words.push(token);
    }
    words.join(" ")
}

/// Maps scientific names to summary titles.
#[derive(Debug, Clone, Default)]
pub struct TitleResolver {
    overrides: BTreeMap<String, String>,
}

impl TitleResolver {
    pub fn new(overrides: BTreeMap<String, String>) -> Self {
        Self { overrides }
    }

    pub fn from_config(config: &CanopyConfig) -> Self {
        Self::new(config.title_overrides.clone())
    }

    /// Override if configured, otherwise the cleaned-up name.
    pub fn resolve(&self, scientific_name: &str) -> String {
        match self.overrides.get(scientific_name) {
            Some(title) => title.clone(),
            None => cleanup_scientific_name(scientific_name),
        }
    }
}
