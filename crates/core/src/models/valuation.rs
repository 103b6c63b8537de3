use serde::{Deserialize, Serialize};

/// Valuation of a single portfolio entry against the latest market batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryValuation {
    /// Position of the entry in the store (what `remove_at` expects)
    pub index: usize,

    pub coin_id: String,
    pub name: String,
    pub symbol: String,
    pub quantity: f64,
    pub buy_price: f64,

    /// Matched market price, or 0 when no snapshot carries this coin id
    pub current_price: f64,

    /// Whether a snapshot was found for the entry
    pub matched: bool,

    /// quantity × buy_price
    pub invested_value: f64,

    /// quantity × current_price
    pub current_value: f64,

    /// current_value − invested_value
    pub profit: f64,

    /// profit / invested_value × 100, or 0 when nothing was invested
    pub profit_percent: f64,
}

/// Per-entry results plus portfolio-wide totals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioValuation {
    pub entries: Vec<EntryValuation>,

    pub total_invested: f64,

    pub total_current: f64,

    /// total_current − total_invested
    pub total_profit: f64,

    /// total_profit / total_invested × 100, or 0 when nothing was invested
    pub total_profit_percent: f64,
}

impl PortfolioValuation {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries that found no snapshot in the batch they were valued against.
    pub fn unmatched(&self) -> impl Iterator<Item = &EntryValuation> {
        self.entries.iter().filter(|e| !e.matched)
    }
}
