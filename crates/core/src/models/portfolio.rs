use serde::{Deserialize, Serialize};

use super::coin::MarketSnapshot;

/// A user-recorded holding: some quantity of a coin bought at a given price.
///
/// This is the exact record written to the `portfolio` storage slot, so the
/// field names on the wire are camelCase (`coinId`, `buyPrice`).
/// `name` and `symbol` are copied from the market snapshot when the entry is
/// created and never re-synchronized afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioEntry {
    /// Market source coin id. Older payloads stored this under `id`.
    #[serde(alias = "id")]
    pub coin_id: String,

    pub name: String,

    pub symbol: String,

    /// Units held
    pub quantity: f64,

    /// Per-unit cost basis at acquisition
    pub buy_price: f64,
}

impl PortfolioEntry {
    pub fn new(
        coin_id: impl Into<String>,
        name: impl Into<String>,
        symbol: impl Into<String>,
        quantity: f64,
        buy_price: f64,
    ) -> Self {
        Self {
            coin_id: coin_id.into(),
            name: name.into(),
            symbol: symbol.into(),
            quantity,
            buy_price,
        }
    }

    /// Build an entry for `snapshot`, copying its identity fields.
    pub fn from_snapshot(snapshot: &MarketSnapshot, quantity: f64, buy_price: f64) -> Self {
        Self::new(
            snapshot.coin_id.clone(),
            snapshot.name.clone(),
            snapshot.symbol.clone(),
            quantity,
            buy_price,
        )
    }

    /// Cost basis of the whole position.
    pub fn invested_value(&self) -> f64 {
        self.quantity * self.buy_price
    }
}

/// Raw "add coin" form input, exactly as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddEntryRequest {
    pub coin_id: String,
    pub quantity: String,
    pub buy_price: String,
}

impl AddEntryRequest {
    pub fn new(
        coin_id: impl Into<String>,
        quantity: impl Into<String>,
        buy_price: impl Into<String>,
    ) -> Self {
        Self {
            coin_id: coin_id.into(),
            quantity: quantity.into(),
            buy_price: buy_price.into(),
        }
    }
}
