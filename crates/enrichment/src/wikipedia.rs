//! Wikipedia REST page summary source.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use tracing::{debug, instrument};

use canopy_common::{CanopyConfig, CanopyError, CanopyResult, PageSummary, SummarySource};

const USER_AGENT: &str = concat!("canopy/", env!("CARGO_PKG_VERSION"));

/// Fetches `<base>/<escaped title>` summaries.
///
/// A 404 means there is no page for the title, which is answered with an
/// empty summary rather than an error.
#[derive(Debug)]
pub struct WikipediaSummarySource {
    client: Client,
    base_url: Url,
}

impl WikipediaSummarySource {
    pub fn new(base_url: &str, timeout: Duration) -> CanopyResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CanopyError::InvalidConfig(format!("bad summary service URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CanopyError::InvalidConfig(format!(
                "summary service URL cannot take a path: {}",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &CanopyConfig) -> CanopyResult<Self> {
        Self::new(&config.summary_service_url, config.request_timeout())
    }

    /// Summary URL for `title`, escaped as a single path segment.
    pub fn summary_url(&self, title: &str) -> CanopyResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CanopyError::InvalidConfig(format!("cannot append to {}", self.base_url)))?
            .pop_if_empty()
            .push(title);
        Ok(url)
    }
}

#[async_trait]
impl SummarySource for WikipediaSummarySource {
    #[instrument(skip(self))]
    async fn fetch_summary(&self, title: &str) -> CanopyResult<PageSummary> {
        let url = self.summary_url(title)?;
        let response = self.client.get(url.clone()).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!(url = %url, "No summary page");
                Ok(PageSummary::default())
            }
            status if status.is_success() => {
                let body = response.text().await?;
                Ok(serde_json::from_str(&body)?)
            }
            status => Err(CanopyError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_err;

    fn source() -> WikipediaSummarySource {
        WikipediaSummarySource::new(
            "https://en.wikipedia.org/api/rest_v1/page/summary",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_title_is_one_escaped_segment() {
        let url = source().summary_url("Platanus × hispanica").unwrap();
        assert_eq!(
            url.as_str(),
            "https://en.wikipedia.org/api/rest_v1/page/summary/Platanus%20%C3%97%20hispanica"
        );

        let url = source().summary_url("AC/DC").unwrap();
        assert!(url.as_str().ends_with("/summary/AC%2FDC"));
    }

    #[test]
    fn test_trailing_slash_in_base() {
        let source = WikipediaSummarySource::new("https://example.org/summary/", Duration::from_secs(5)).unwrap();
        assert_eq!(source.summary_url("Acer").unwrap().as_str(), "https://example.org/summary/Acer");
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert_err!(WikipediaSummarySource::new("mailto:someone@example.org", Duration::from_secs(5)));
    }
}
