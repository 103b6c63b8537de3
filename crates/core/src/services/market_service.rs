use std::cmp::Ordering;

use crate::models::coin::{MarketSnapshot, MarketSort};

/// Sorting, searching and lookup over a snapshot batch.
pub struct MarketService;

impl MarketService {
    pub fn new() -> Self {
        Self
    }

    /// Stable in-place sort. NaN prices compare equal to everything.
    pub fn sort(&self, snapshots: &mut [MarketSnapshot], order: MarketSort) {
        let cmp = |a: f64, b: f64| a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        match order {
            MarketSort::PriceAsc => {
                snapshots.sort_by(|a, b| cmp(a.current_price, b.current_price))
            }
            MarketSort::PriceDesc => {
                snapshots.sort_by(|a, b| cmp(b.current_price, a.current_price))
            }
            MarketSort::MarketCapAsc => snapshots.sort_by(|a, b| cmp(a.market_cap, b.market_cap)),
            MarketSort::MarketCapDesc => {
                snapshots.sort_by(|a, b| cmp(b.market_cap, a.market_cap))
            }
        }
    }

    /// Snapshots whose name contains `term`, case-insensitively.
    /// An empty term matches everything.
    pub fn search<'a>(&self, snapshots: &'a [MarketSnapshot], term: &str) -> Vec<&'a MarketSnapshot> {
        let needle = term.trim().to_lowercase();
        snapshots
            .iter()
            .filter(|s| needle.is_empty() || s.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// First snapshot with `coin_id`.
    pub fn find<'a>(&self, snapshots: &'a [MarketSnapshot], coin_id: &str) -> Option<&'a MarketSnapshot> {
        snapshots.iter().find(|s| s.coin_id == coin_id)
    }

    /// Search, then optionally sort, returning owned rows ready for display.
    pub fn listing(
        &self,
        snapshots: &[MarketSnapshot],
        term: &str,
        order: Option<MarketSort>,
    ) -> Vec<MarketSnapshot> {
        let mut rows: Vec<MarketSnapshot> = self.search(snapshots, term).into_iter().cloned().collect();
        if let Some(order) = order {
            self.sort(&mut rows, order);
        }
        rows
    }
}

impl Default for MarketService {
    fn default() -> Self {
        Self::new()
    }
}
