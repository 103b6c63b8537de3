use std::collections::HashMap;

use crate::models::coin::MarketSnapshot;
use crate::models::portfolio::PortfolioEntry;
use crate::models::valuation::{EntryValuation, PortfolioValuation};

/// Values portfolio entries against a batch of market snapshots.
///
/// Pure business logic with no I/O. Inputs are never mutated, so it is safe to
/// re-run on every refresh or store mutation.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// Join `entries` with `snapshots` by coin id and compute per-entry and
    /// aggregate invested value, current value and profit/loss.
    ///
    /// The first snapshot carrying a coin id wins. Entries without a snapshot
    /// are valued at a price of 0 instead of failing.
    pub fn valuate(
        &self,
        entries: &[PortfolioEntry],
        snapshots: &[MarketSnapshot],
    ) -> PortfolioValuation {
        let mut prices: HashMap<&str, f64> = HashMap::with_capacity(snapshots.len());
        for snapshot in snapshots {
            prices
                .entry(snapshot.coin_id.as_str())
                .or_insert(snapshot.current_price);
        }

        let mut total_invested = 0.0;
        let mut total_current = 0.0;

        let valued: Vec<EntryValuation> = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let price = prices.get(entry.coin_id.as_str()).copied();
                let current_price = price.unwrap_or(0.0);
                let invested_value = entry.invested_value();
                let current_value = entry.quantity * current_price;
                let profit = current_value - invested_value;

                total_invested += invested_value;
                total_current += current_value;

                EntryValuation {
                    index,
                    coin_id: entry.coin_id.clone(),
                    name: entry.name.clone(),
                    symbol: entry.symbol.clone(),
                    quantity: entry.quantity,
                    buy_price: entry.buy_price,
                    current_price,
                    matched: price.is_some(),
                    invested_value,
                    current_value,
                    profit,
                    profit_percent: percent_of(profit, invested_value),
                }
            })
            .collect();

        let total_profit = total_current - total_invested;

        PortfolioValuation {
            entries: valued,
            total_invested,
            total_current,
            total_profit,
            total_profit_percent: percent_of(total_profit, total_invested),
        }
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}

/// `part / whole × 100`, or 0 unless `whole` is strictly positive.
fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}
