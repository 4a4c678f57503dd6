//! Spatial feature fetching.

use async_trait::async_trait;
use metrics::counter;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use canopy_common::{
    BoundingBox, CanopyConfig, CanopyError, CanopyResult, FeatureSet, FeatureSource,
};

use crate::query::build_query_url;
use crate::response::parse_feature_collection;
use crate::store::{FeatureStore, RequestToken};

/// Feature source backed by an ArcGIS feature layer returning GeoJSON.
pub struct ArcGisFeatureSource {
    client: Client,
    query_url: String,
}

impl ArcGisFeatureSource {
    pub fn new(query_url: impl Into<String>, timeout: Duration) -> CanopyResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            query_url: query_url.into(),
        })
    }

    pub fn from_config(config: &CanopyConfig) -> CanopyResult<Self> {
        Self::new(config.feature_service_url.clone(), config.request_timeout())
    }
}

#[async_trait]
impl FeatureSource for ArcGisFeatureSource {
    #[instrument(skip(self))]
    async fn query(&self, bounds: &BoundingBox) -> CanopyResult<FeatureSet> {
        let url = build_query_url(&self.query_url, bounds)?;
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CanopyError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let features = parse_feature_collection(&body)?;
        debug!(count = features.len(), bytes = body.len(), "Parsed feature collection");
        Ok(features)
    }
}

/// Result of one [`SpatialFeatureClient::refresh`].
#[derive(Debug)]
pub enum FetchOutcome {
    /// The response replaced the current set.
    Applied { features: usize },
    /// A newer request (or a clear) was issued meanwhile; the response was dropped.
    Superseded,
    /// The query failed; the previous set is kept.
    Retained(CanopyError),
}

/// Runs bounded queries and publishes results to a [`FeatureStore`].
///
/// There is no retry: on any failure the previous set stays in place until
/// the next viewport change produces a new query.
pub struct SpatialFeatureClient {
    source: Arc<dyn FeatureSource>,
    store: Arc<FeatureStore>,
}

impl SpatialFeatureClient {
    pub fn new(source: Arc<dyn FeatureSource>, store: Arc<FeatureStore>) -> Self {
        Self { source, store }
    }

    pub fn store(&self) -> &Arc<FeatureStore> {
        &self.store
    }

    /// Take the token for the next query. Call this when the query is
    /// decided, not when it starts running, so tokens follow issue order.
    pub fn begin_request(&self) -> RequestToken {
        self.store.begin_request()
    }

    /// Query `bounds` and install the result if no newer query was issued
    /// after `token`.
    pub async fn refresh(&self, bounds: BoundingBox, token: RequestToken) -> FetchOutcome {
        if !self.store.is_current(token) {
            counter!("canopy_feature_responses_discarded_total").increment(1);
            debug!(token = token.value(), "Query superseded before it was sent");
            return FetchOutcome::Superseded;
        }

        counter!("canopy_feature_queries_total").increment(1);
        info!(
            token = token.value(),
            west = bounds.west,
            south = bounds.south,
            east = bounds.east,
            north = bounds.north,
            "Issuing feature query"
        );

        match self.source.query(&bounds).await {
            Ok(features) => {
                let count = features.len();
                if self.store.complete(token, features) {
                    debug!(token = token.value(), count = count, "Feature set replaced");
                    FetchOutcome::Applied { features: count }
                } else {
                    counter!("canopy_feature_responses_discarded_total").increment(1);
                    debug!(token = token.value(), "Response superseded by a newer request");
                    FetchOutcome::Superseded
                }
            }
            Err(e) => {
                counter!("canopy_feature_query_failures_total").increment(1);
                warn!(
                    token = token.value(),
                    error = %e,
                    kind = e.kind(),
                    "Feature query failed, keeping previous features"
                );
                FetchOutcome::Retained(e)
            }
        }
    }

    /// Empty the current set and invalidate queries in flight.
    pub fn clear(&self) {
        self.store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{FeatureBuilder, MockFeatureSource, MockResponse};

    fn trees(ids: &[i64]) -> FeatureSet {
        ids.iter().map(|&id| FeatureBuilder::new(id).build()).collect()
    }

    #[tokio::test]
    async fn test_success_replaces_set() {
        let source = Arc::new(MockFeatureSource::new());
        source.push(Duration::ZERO, MockResponse::Ok(trees(&[1, 2])));
        let client = SpatialFeatureClient::new(source.clone(), Arc::new(FeatureStore::new()));

        let outcome = client
            .refresh(BoundingBox::new(0.0, 0.0, 1.0, 1.0), client.begin_request())
            .await;

        assert!(matches!(outcome, FetchOutcome::Applied { features: 2 }));
        assert_eq!(client.store().get().len(), 2);
        assert_eq!(source.requested_bounds(), vec![BoundingBox::new(0.0, 0.0, 1.0, 1.0)]);
    }

    #[tokio::test]
    async fn test_failures_keep_previous_set() {
        let source = Arc::new(MockFeatureSource::new());
        source.push(Duration::ZERO, MockResponse::Ok(trees(&[1, 2, 3])));
        source.push(Duration::ZERO, MockResponse::NetworkError);
        source.push(Duration::ZERO, MockResponse::ParseError);
        source.push(Duration::ZERO, MockResponse::HttpStatus(500));
        let client = SpatialFeatureClient::new(source.clone(), Arc::new(FeatureStore::new()));
        let bounds = BoundingBox::new(0.0, 0.0, 1.0, 1.0);

        client.refresh(bounds, client.begin_request()).await;
        for _ in 0..3 {
            let outcome = client.refresh(bounds, client.begin_request()).await;
            assert!(matches!(outcome, FetchOutcome::Retained(_)));
        }

        assert_eq!(client.store().get().len(), 3);
        assert_eq!(source.calls(), 4);
    }

    #[tokio::test]
    async fn test_stale_token_skips_network_call() {
        let source = Arc::new(MockFeatureSource::new().with_fallback(trees(&[1])));
        let client = SpatialFeatureClient::new(source.clone(), Arc::new(FeatureStore::new()));

        let older = client.begin_request();
        let newer = client.begin_request();
        let bounds = BoundingBox::new(0.0, 0.0, 1.0, 1.0);

        assert!(matches!(client.refresh(bounds, older).await, FetchOutcome::Superseded));
        assert_eq!(source.calls(), 0);
        assert!(matches!(client.refresh(bounds, newer).await, FetchOutcome::Applied { features: 1 }));
        assert_eq!(source.calls(), 1);
    }
}
