//! Enrichment payload for a selected feature.

use serde::{Deserialize, Serialize};

/// Page summary returned by the enrichment lookup.
///
/// Every field is optional. A summary without thumbnail or extract is a
/// valid answer meaning "no enrichment data", not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Thumbnail>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract_html: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_urls: Option<ContentUrls>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentUrls {
    #[serde(default)]
    pub desktop: Option<PageLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLink {
    pub page: String,
}

impl PageSummary {
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail.as_ref().map(|t| t.source.as_str())
    }

    pub fn extract_html(&self) -> Option<&str> {
        self.extract_html.as_deref()
    }

    pub fn page_url(&self) -> Option<&str> {
        self.content_urls
            .as_ref()
            .and_then(|c| c.desktop.as_ref())
            .map(|d| d.page.as_str())
    }

    /// True when there is something to show besides a link.
    pub fn has_enrichment(&self) -> bool {
        self.thumbnail.is_some() || self.extract_html.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_summary() {
        let json = r#"{
            "title": "Acer",
            "thumbnail": {"source": "https://upload.example/acer.jpg", "width": 320},
            "extract_html": "<p><b>Acer</b> is a genus of trees.</p>",
            "content_urls": {"desktop": {"page": "https://en.wikipedia.org/wiki/Acer"}}
        }"#;
        let summary: PageSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.thumbnail_url(), Some("https://upload.example/acer.jpg"));
        assert_eq!(summary.page_url(), Some("https://en.wikipedia.org/wiki/Acer"));
        assert!(summary.has_enrichment());
    }

    #[test]
    fn test_empty_summary_is_valid() {
        let summary: PageSummary = serde_json::from_str(r#"{"type": "https://mediawiki.org/wiki/HyperSwitch/errors/not_found"}"#).unwrap();
        assert!(!summary.has_enrichment());
        assert_eq!(summary.page_url(), None);
    }
}
