//! Enrichment entry table.
//!
//! Entries never expire. Access goes through a tokio `RwLock`; every change
//! bumps a revision counter so waiters can react without polling.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

use canopy_common::PageSummary;

/// State of one key.
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentEntry {
    /// A lookup is scheduled or running.
    Pending,
    /// The lookup answered. The summary may still carry no data.
    Resolved(Arc<PageSummary>),
    /// The lookup failed. Shown as "no data", never retried.
    Failed,
}

impl EnrichmentEntry {
    /// Resolved or failed.
    pub fn is_settled(&self) -> bool {
        !matches!(self, EnrichmentEntry::Pending)
    }
}

/// Key to entry map with change notification.
pub struct EntryTable {
    entries: RwLock<HashMap<String, EnrichmentEntry>>,
    revision: watch::Sender<u64>,
}

impl EntryTable {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            entries: RwLock::new(HashMap::new()),
            revision,
        }
    }

    pub async fn get(&self, key: &str) -> Option<EnrichmentEntry> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn set(&self, key: &str, entry: EnrichmentEntry) {
        self.entries.write().await.insert(key.to_string(), entry);
        self.bump();
    }

    /// Remove `key` only while it is still pending.
    pub async fn remove_pending(&self, key: &str) -> bool {
        let mut entries = self.entries.write().await;
        if entries.get(key) == Some(&EnrichmentEntry::Pending) {
            entries.remove(key);
            drop(entries);
            self.bump();
            return true;
        }
        false
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
        self.bump();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Receiver woken after every change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }
}

impl Default for EntryTable {
    fn default() -> Self {
        Self::new()
    }
}
