//! Latest-wins store for the current feature set.
//!
//! Every query takes a [`RequestToken`] before it starts. Only a response
//! carrying the most recently issued token may replace the stored set, so a
//! slow response for an old viewport can never overwrite a newer one.
//!
//! Concurrency: the token counter is atomic, and the token comparison and the
//! write happen together under the watch channel's lock. A `clear`
//! issues a fresh token first, which also invalidates any fetch in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use canopy_common::FeatureSet;

/// Sequence number of an issued query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Holder of the feature set shown for the current viewport.
pub struct FeatureStore {
    latest: watch::Sender<Arc<FeatureSet>>,
    issued: AtomicU64,
}

impl FeatureStore {
    pub fn new() -> Self {
        let (latest, _) = watch::channel(Arc::new(FeatureSet::empty()));
        Self {
            latest,
            issued: AtomicU64::new(0),
        }
    }

    /// Current feature set.
    pub fn get(&self) -> Arc<FeatureSet> {
        self.latest.borrow().clone()
    }

    /// Receiver notified whenever the set is replaced.
    pub fn subscribe(&self) -> watch::Receiver<Arc<FeatureSet>> {
        self.latest.subscribe()
    }

    /// Issue the token for a new query. Outstanding tokens become stale.
    pub fn begin_request(&self) -> RequestToken {
        RequestToken(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True if no newer query was issued (and no clear happened) since `token`.
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.issued.load(Ordering::SeqCst) == token.0
    }

    /// Install `features` if `token` is still the latest. Returns whether it was.
    pub fn complete(&self, token: RequestToken, features: FeatureSet) -> bool {
        let applied = self.latest.send_if_modified(|current| {
            if self.issued.load(Ordering::SeqCst) != token.0 {
                return false;
            }
            *current = Arc::new(features);
            true
        });
        if !applied {
            debug!(token = token.0, "Discarding stale feature response");
        }
        applied
    }

    /// Empty the set, superseding queries in flight.
    pub fn clear(&self) {
        self.begin_request();
        self.latest.send_replace(Arc::new(FeatureSet::empty()));
    }
}

impl Default for FeatureStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::FeatureBuilder;

    fn one_tree(id: i64) -> FeatureSet {
        FeatureSet::new(vec![FeatureBuilder::new(id).build()])
    }

    #[test]
    fn test_tokens_increase() {
        let store = FeatureStore::new();
        let a = store.begin_request();
        let b = store.begin_request();
        assert!(b > a);
        assert!(!store.is_current(a));
        assert!(store.is_current(b));
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let store = FeatureStore::new();
        let old = store.begin_request();
        let new = store.begin_request();

        assert!(store.complete(new, one_tree(2)));
        assert!(!store.complete(old, one_tree(1)));
        assert_eq!(store.get()[0].id.to_string(), "2");
    }

    #[test]
    fn test_clear_supersedes_in_flight() {
        let store = FeatureStore::new();
        let token = store.begin_request();
        store.clear();
        assert!(!store.complete(token, one_tree(1)));
        assert!(store.get().is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_replacements() {
        let store = FeatureStore::new();
        let mut rx = store.subscribe();

        let token = store.begin_request();
        store.complete(token, one_tree(7));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().len(), 1);
    }
}
