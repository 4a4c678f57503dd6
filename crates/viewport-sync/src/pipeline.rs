//! Background task tying the debouncer to the feature client.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info};

use canopy_common::{CanopyConfig, FeatureSet, FeatureSource, ViewportState};

use crate::client::{FetchOutcome, SpatialFeatureClient};
use crate::debouncer::{DebounceState, QueryDebouncer, QueryEvent};
use crate::store::FeatureStore;

/// Viewport-driven feature synchronization.
///
/// Viewport changes are fed in through [`update_viewport`](Self::update_viewport)
/// and [`resize`](Self::resize); the resulting feature set is read with
/// [`features`](Self::features) or watched with [`subscribe`](Self::subscribe).
/// Queries run concurrently on a background task, and only the response to
/// the latest query is ever installed.
pub struct ViewportSync {
    debouncer: QueryDebouncer,
    store: Arc<FeatureStore>,
    worker: JoinHandle<()>,
}

impl ViewportSync {
    /// Start syncing from `initial`. The initial viewport goes through the
    /// debouncer like any other change.
    pub fn spawn(source: Arc<dyn FeatureSource>, config: &CanopyConfig, initial: ViewportState) -> Self {
        let store = Arc::new(FeatureStore::new());
        let client = Arc::new(SpatialFeatureClient::new(source, store.clone()));
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let worker = tokio::spawn(run_event_loop(client, events_rx));

        let mut debouncer = QueryDebouncer::from_config(initial, config, events_tx);
        debouncer.update(initial);

        info!(
            zoom_threshold = config.zoom_threshold,
            debounce_ms = config.viewport_debounce_ms,
            "Viewport sync started"
        );

        Self {
            debouncer,
            store,
            worker,
        }
    }

    pub fn update_viewport(&mut self, viewport: ViewportState) {
        self.debouncer.update(viewport);
    }

    pub fn resize(&mut self, pixel_width: f64, pixel_height: f64) {
        self.debouncer.resize(pixel_width, pixel_height);
    }

    pub fn viewport(&self) -> ViewportState {
        self.debouncer.latest()
    }

    pub fn debounce_state(&self) -> DebounceState {
        self.debouncer.state()
    }

    pub fn features(&self) -> Arc<FeatureSet> {
        self.store.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<FeatureSet>> {
        self.store.subscribe()
    }

    pub fn store(&self) -> &Arc<FeatureStore> {
        &self.store
    }

    /// Stop the background task, aborting any pending or running query.
    pub async fn shutdown(mut self) {
        self.debouncer.cancel();
        self.worker.abort();
        let _ = (&mut self.worker).await;
        debug!("Viewport sync stopped");
    }
}

impl Drop for ViewportSync {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn run_event_loop(client: Arc<SpatialFeatureClient>, mut events: mpsc::UnboundedReceiver<QueryEvent>) {
    let mut fetches: JoinSet<FetchOutcome> = JoinSet::new();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(QueryEvent::Issue { bounds, .. }) => {
                    // token taken here so a later Empty or Issue supersedes it
                    let token = client.begin_request();
                    let client = client.clone();
                    fetches.spawn(async move { client.refresh(bounds, token).await });
                }
                Some(QueryEvent::Empty) => {
                    debug!("Below zoom threshold, clearing features");
                    client.clear();
                }
                None => break,
            },
            Some(joined) = fetches.join_next(), if !fetches.is_empty() => {
                if let Ok(outcome) = joined {
                    debug!(outcome = ?outcome, "Feature fetch finished");
                }
            }
        }
    }

    // Sender side is gone; let outstanding fetches settle.
    while fetches.join_next().await.is_some() {}
}
