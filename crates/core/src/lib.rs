pub mod errors;
pub mod models;
pub mod polling;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::{DateTime, Utc};
use models::{
    coin::{MarketBatch, MarketSnapshot, MarketSort},
    portfolio::{AddEntryRequest, PortfolioEntry},
    valuation::PortfolioValuation,
};
use services::{
    market_service::MarketService, portfolio_service::PortfolioService,
    valuation_service::ValuationService,
};
use storage::{backend::StorageBackend, store::PortfolioStore};

use errors::CoreError;

/// Main entry point for the CryptoPulse core library.
///
/// Owns the portfolio store and the latest market batch, and is handed to
/// whatever front end needs them instead of living in global state. Market
/// polling stays outside: feed it batches with [`CryptoPulse::apply_batch`].
#[must_use]
pub struct CryptoPulse {
    store: PortfolioStore,
    market: Option<MarketBatch>,
    portfolio_service: PortfolioService,
    valuation_service: ValuationService,
    market_service: MarketService,
}

impl std::fmt::Debug for CryptoPulse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoPulse")
            .field("entries", &self.store.len())
            .field("coins", &self.market.as_ref().map_or(0, |b| b.len()))
            .field("last_updated", &self.last_updated())
            .finish()
    }
}

impl CryptoPulse {
    /// Open the portfolio persisted in `backend` (empty if there is none).
    pub fn open(backend: impl StorageBackend + 'static) -> Self {
        Self {
            store: PortfolioStore::open(backend),
            market: None,
            portfolio_service: PortfolioService::new(),
            valuation_service: ValuationService::new(),
            market_service: MarketService::new(),
        }
    }

    // ── Portfolio ───────────────────────────────────────────────────

    /// Validate `request` against the loaded market data and append it.
    ///
    /// Invalid input is rejected before the store is touched. A persistence
    /// failure still leaves the entry in memory.
    pub fn add_entry(&mut self, request: &AddEntryRequest) -> Result<&PortfolioEntry, CoreError> {
        let entry = self
            .portfolio_service
            .build_entry(request, self.snapshots())?;
        self.store.append(entry)?;
        let last = self.store.len() - 1;
        self.store
            .get(last)
            .ok_or_else(|| CoreError::PersistenceWrite("entry vanished after append".into()))
    }

    /// Remove the entry at `index`. Out of range is a no-op returning `Ok(None)`.
    pub fn remove_entry(&mut self, index: usize) -> Result<Option<PortfolioEntry>, CoreError> {
        self.store.remove_at(index)
    }

    #[must_use]
    pub fn entries(&self) -> &[PortfolioEntry] {
        self.store.entries()
    }

    /// Re-read the persisted list, discarding the in-memory copy.
    pub fn reload(&mut self) -> &[PortfolioEntry] {
        self.store.load()
    }

    // ── Market data ─────────────────────────────────────────────────

    /// Replace the market snapshot wholesale with `batch`.
    pub fn apply_batch(&mut self, batch: MarketBatch) {
        self.market = Some(batch);
    }

    /// Snapshots of the latest batch (empty before the first one).
    #[must_use]
    pub fn snapshots(&self) -> &[MarketSnapshot] {
        self.market
            .as_ref()
            .map(|b| b.snapshots.as_slice())
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.market.as_ref().map(|b| b.fetched_at)
    }

    /// Market rows filtered by name and optionally sorted.
    #[must_use]
    pub fn market_list(&self, search: &str, sort: Option<MarketSort>) -> Vec<MarketSnapshot> {
        self.market_service.listing(self.snapshots(), search, sort)
    }

    #[must_use]
    pub fn find_coin(&self, coin_id: &str) -> Option<&MarketSnapshot> {
        self.market_service.find(self.snapshots(), coin_id)
    }

    // ── Valuation ───────────────────────────────────────────────────

    /// Value the current entries against the latest batch.
    #[must_use]
    pub fn valuation(&self) -> PortfolioValuation {
        self.valuation_service
            .valuate(self.store.entries(), self.snapshots())
    }
}
