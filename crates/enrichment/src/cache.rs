//! Debounced, cancellable, memoized enrichment lookups.
//!
//! At most one lookup is in flight at a time. Requesting a different key
//! cancels it: the scheduled or running task is aborted and its pending
//! entry removed, so a cancelled key can be looked up again later. Real
//! answers, successes and failures alike, stay in the table for good.

use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use canopy_common::{CanopyConfig, DebounceTimer, PageSummary, SummarySource};

use crate::entries::{EnrichmentEntry, EntryTable};
use crate::title::TitleResolver;

/// What a caller waiting on [`EnrichmentCache::lookup`] gets back.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Resolved(Arc<PageSummary>),
    /// The lookup failed; present as "no data".
    Failed,
    /// Superseded by a lookup for another key before it finished.
    Cancelled,
}

struct InFlight {
    key: String,
    timer: DebounceTimer,
}

struct Inner {
    source: Arc<dyn SummarySource>,
    titles: TitleResolver,
    debounce: Duration,
    entries: EntryTable,
    in_flight: Mutex<Option<InFlight>>,
}

/// Enrichment lookups keyed by scientific name. Cheap to clone.
#[derive(Clone)]
pub struct EnrichmentCache {
    inner: Arc<Inner>,
}

impl EnrichmentCache {
    pub fn new(source: Arc<dyn SummarySource>, titles: TitleResolver, debounce: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                titles,
                debounce,
                entries: EntryTable::new(),
                in_flight: Mutex::new(None),
            }),
        }
    }

    pub fn from_config(source: Arc<dyn SummarySource>, config: &CanopyConfig) -> Self {
        Self::new(source, TitleResolver::from_config(config), config.enrichment_debounce())
    }

    /// Current entry for `key`, without triggering anything.
    pub async fn entry(&self, key: &str) -> Option<EnrichmentEntry> {
        self.inner.entries.get(key).await
    }

    /// Start (or join) the lookup for `key` and return its entry right away.
    ///
    /// A settled entry is returned as is with no network call. Otherwise the
    /// entry is [`EnrichmentEntry::Pending`] until the debounced fetch lands.
    pub async fn request(&self, key: &str) -> EnrichmentEntry {
        if let Some(entry) = self.settled(key).await {
            return entry;
        }

        let mut in_flight = self.inner.in_flight.lock().await;

        // the lock serializes requests, so re-check after waiting for it
        if let Some(entry) = self.settled(key).await {
            return entry;
        }

        if let Some(current) = in_flight.as_mut() {
            if current.key == key && current.timer.is_pending() {
                debug!(key = %key, "Joining lookup already in flight");
                return EnrichmentEntry::Pending;
            }
            if current.timer.cancel() {
                counter!("canopy_enrichment_cancellations_total").increment(1);
                info!(cancelled = %current.key, requested = %key, "Cancelled enrichment lookup");
            }
            self.inner.entries.remove_pending(&current.key).await;
        }

        self.inner.entries.set(key, EnrichmentEntry::Pending).await;

        let mut timer = DebounceTimer::new();
        let inner = self.inner.clone();
        let owned_key = key.to_string();
        timer.schedule(self.inner.debounce, async move {
            inner.fetch(owned_key).await;
        });
        *in_flight = Some(InFlight {
            key: key.to_string(),
            timer,
        });

        EnrichmentEntry::Pending
    }

    /// Request `key` and wait until its lookup settles or is cancelled.
    pub async fn lookup(&self, key: &str) -> LookupOutcome {
        let mut changes = self.inner.entries.subscribe();

        let mut entry = Some(self.request(key).await);
        loop {
            match entry {
                Some(EnrichmentEntry::Resolved(summary)) => return LookupOutcome::Resolved(summary),
                Some(EnrichmentEntry::Failed) => return LookupOutcome::Failed,
                None => return LookupOutcome::Cancelled,
                Some(EnrichmentEntry::Pending) => {
                    if changes.changed().await.is_err() {
                        return LookupOutcome::Cancelled;
                    }
                    entry = self.inner.entries.get(key).await;
                }
            }
        }
    }

    /// Abort any lookup in flight, leaving no entry for it.
    pub async fn cancel(&self) -> bool {
        let mut in_flight = self.inner.in_flight.lock().await;
        let Some(mut current) = in_flight.take() else {
            return false;
        };
        let cancelled = current.timer.cancel();
        self.inner.entries.remove_pending(&current.key).await;
        if cancelled {
            counter!("canopy_enrichment_cancellations_total").increment(1);
            debug!(key = %current.key, "Cancelled enrichment lookup");
        }
        cancelled
    }

    /// Forget everything, aborting any lookup in flight.
    pub async fn clear(&self) {
        self.cancel().await;
        self.inner.entries.clear().await;
    }

    async fn settled(&self, key: &str) -> Option<EnrichmentEntry> {
        let entry = self.inner.entries.get(key).await?;
        if entry.is_settled() {
            counter!("canopy_enrichment_cache_hits_total").increment(1);
            debug!(key = %key, "Enrichment cache hit");
            Some(entry)
        } else {
            None
        }
    }
}

impl Inner {
    /// Runs inside the debounce task. Aborting the task drops this future
    /// before anything is written.
    async fn fetch(&self, key: String) {
        let title = self.titles.resolve(&key);
        if title.is_empty() {
            debug!(key = %key, "Nothing left of the name to look up");
            self.entries
                .set(&key, EnrichmentEntry::Resolved(Arc::new(PageSummary::default())))
                .await;
            return;
        }

        counter!("canopy_enrichment_fetches_total").increment(1);
        debug!(key = %key, title = %title, "Fetching summary");

        let entry = match self.source.fetch_summary(&title).await {
            Ok(summary) => {
                debug!(key = %key, has_enrichment = summary.has_enrichment(), "Summary resolved");
                EnrichmentEntry::Resolved(Arc::new(summary))
            }
            Err(e) if e.is_cancelled() => {
                self.entries.remove_pending(&key).await;
                return;
            }
            Err(e) => {
                warn!(key = %key, title = %title, error = %e, "Summary lookup failed");
                EnrichmentEntry::Failed
            }
        };
        self.entries.set(&key, entry).await;
    }
}
