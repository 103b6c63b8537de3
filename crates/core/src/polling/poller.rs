use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::cache::SnapshotCache;
use crate::errors::CoreError;
use crate::models::coin::MarketBatch;
use crate::models::settings::MarketQuery;
use crate::providers::traits::MarketDataSource;

/// Batches buffered for a subscriber that is not keeping up.
const DELIVERY_BUFFER: usize = 16;

/// Lifecycle of a [`Subscription`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Timer running, batches being delivered
    Active,
    /// Terminal; subscribe again to restart
    Stopped,
}

/// Non-blocking status signal for the feed, suitable for a status line.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedStatus {
    /// No fetch has completed yet
    Loading,
    /// Last fetch succeeded
    Ready {
        fetched_at: DateTime<Utc>,
        coins: usize,
    },
    /// Last fetch failed; the previous batch (if any) is still cached
    Failed { at: DateTime<Utc>, message: String },
}

/// Periodically pulls market data from one source into a [`SnapshotCache`].
pub struct MarketPoller {
    source: Arc<dyn MarketDataSource>,
    query: MarketQuery,
    cache: SnapshotCache,
}

impl MarketPoller {
    pub fn new(source: Arc<dyn MarketDataSource>, query: MarketQuery) -> Self {
        Self {
            source,
            query,
            cache: SnapshotCache::new(),
        }
    }

    /// Handle on the cache this poller writes to.
    pub fn cache(&self) -> SnapshotCache {
        self.cache.clone()
    }

    pub fn query(&self) -> &MarketQuery {
        &self.query
    }

    /// One fetch outside of any subscription. Updates the cache on success.
    pub async fn fetch_once(&self) -> Result<MarketBatch, CoreError> {
        let snapshots = self.source.fetch_markets(&self.query).await?;
        let batch = MarketBatch::now(snapshots);
        self.cache.replace(batch.clone());
        Ok(batch)
    }

    /// Start delivering a batch every `interval`, beginning immediately.
    ///
    /// Must be called from within a tokio runtime. A failed fetch skips that
    /// tick; the subscription keeps running until [`Subscription::stop`] or drop.
    pub fn subscribe(&self, interval: Duration) -> Subscription {
        let period = interval.max(Duration::from_millis(1));
        let (batch_tx, batch_rx) = mpsc::channel(DELIVERY_BUFFER);
        let (status_tx, status_rx) = watch::channel(FeedStatus::Loading);

        info!(
            source = self.source.name(),
            interval_ms = period.as_millis() as u64,
            "market subscription started"
        );

        let task = tokio::spawn(poll_loop(
            Arc::clone(&self.source),
            self.query.clone(),
            self.cache.clone(),
            period,
            batch_tx,
            status_tx,
        ));

        Subscription {
            batches: batch_rx,
            status: status_rx,
            task: Some(task),
        }
    }
}

async fn poll_loop(
    source: Arc<dyn MarketDataSource>,
    query: MarketQuery,
    cache: SnapshotCache,
    period: Duration,
    batches: mpsc::Sender<MarketBatch>,
    status: watch::Sender<FeedStatus>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match source.fetch_markets(&query).await {
            Ok(snapshots) => {
                let batch = MarketBatch::now(snapshots);
                debug!(source = source.name(), coins = batch.len(), "market batch received");
                cache.replace(batch.clone());
                status.send_replace(FeedStatus::Ready {
                    fetched_at: batch.fetched_at,
                    coins: batch.len(),
                });

                match batches.try_send(batch) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        warn!(source = source.name(), "subscriber lagging; batch dropped");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        debug!(source = source.name(), "subscriber gone; poll loop exiting");
                        break;
                    }
                }
            }
            Err(e) => {
                warn!(source = source.name(), error = %e, "market refresh failed; keeping previous batch");
                status.send_replace(FeedStatus::Failed {
                    at: Utc::now(),
                    message: e.to_string(),
                });
            }
        }
    }
}

/// A running market feed. Stopped explicitly with [`Subscription::stop`] or
/// implicitly on drop.
pub struct Subscription {
    batches: mpsc::Receiver<MarketBatch>,
    status: watch::Receiver<FeedStatus>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Wait for the next batch. Returns `None` once stopped.
    pub async fn next(&mut self) -> Option<MarketBatch> {
        if self.task.is_none() {
            return None;
        }
        self.batches.recv().await
    }

    pub fn state(&self) -> PollState {
        match &self.task {
            Some(task) if !task.is_finished() => PollState::Active,
            _ => PollState::Stopped,
        }
    }

    /// Current feed status.
    pub fn status(&self) -> FeedStatus {
        self.status.borrow().clone()
    }

    /// A receiver that is notified every time the status changes.
    pub fn status_watch(&self) -> watch::Receiver<FeedStatus> {
        self.status.clone()
    }

    /// Cancel the timer. Idempotent; buffered batches are discarded.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            self.batches.close();
            info!("market subscription stopped");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.stop();
    }
}
