use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};

use crate::models::coin::{MarketBatch, MarketSnapshot};

/// Latest successful market batch, shared between the poller that writes it
/// and any number of readers.
///
/// Replaced wholesale on each refresh; a failed refresh leaves the previous
/// batch in place.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCache {
    latest: Arc<RwLock<Option<MarketBatch>>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&self, batch: MarketBatch) {
        *self.latest.write().unwrap_or_else(|e| e.into_inner()) = Some(batch);
    }

    pub fn latest(&self) -> Option<MarketBatch> {
        self.latest.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Snapshots of the latest batch, empty before the first success.
    pub fn snapshots(&self) -> Vec<MarketSnapshot> {
        self.latest
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|b| b.snapshots.clone())
            .unwrap_or_default()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.latest
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|b| b.fetched_at)
    }
}
