use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point-in-time market record for one coin.
///
/// Held in memory only and replaced wholesale on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Source-specific stable id (e.g., "bitcoin")
    pub coin_id: String,

    /// Display name (e.g., "Bitcoin")
    pub name: String,

    /// Ticker as reported by the source (e.g., "btc")
    pub symbol: String,

    /// Latest price in the queried currency. A null from the API reads as 0.
    pub current_price: f64,

    /// Market capitalization in the queried currency. A null reads as 0.
    pub market_cap: f64,

    /// Logo URL, if the source provides one
    #[serde(default)]
    pub image_url: Option<String>,

    /// Price change over the last 24 hours, in percent
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

impl MarketSnapshot {
    pub fn new(
        coin_id: impl Into<String>,
        name: impl Into<String>,
        symbol: impl Into<String>,
        current_price: f64,
        market_cap: f64,
    ) -> Self {
        Self {
            coin_id: coin_id.into(),
            name: name.into(),
            symbol: symbol.into(),
            current_price,
            market_cap,
            image_url: None,
            price_change_percentage_24h: None,
        }
    }
}

/// Client-side ordering for market listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketSort {
    /// Cheapest first
    PriceAsc,
    /// Most expensive first
    PriceDesc,
    /// Smallest market cap first
    #[serde(rename = "marketcap_asc")]
    MarketCapAsc,
    /// Largest market cap first
    #[serde(rename = "marketcap_desc")]
    MarketCapDesc,
}

impl std::fmt::Display for MarketSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketSort::PriceAsc => write!(f, "price_asc"),
            MarketSort::PriceDesc => write!(f, "price_desc"),
            MarketSort::MarketCapAsc => write!(f, "marketcap_asc"),
            MarketSort::MarketCapDesc => write!(f, "marketcap_desc"),
        }
    }
}

impl std::str::FromStr for MarketSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "price_asc" => Ok(MarketSort::PriceAsc),
            "price_desc" => Ok(MarketSort::PriceDesc),
            "marketcap_asc" | "market_cap_asc" => Ok(MarketSort::MarketCapAsc),
            "marketcap_desc" | "market_cap_desc" => Ok(MarketSort::MarketCapDesc),
            other => Err(format!(
                "unknown sort {other:?} (expected price_asc, price_desc, marketcap_asc, marketcap_desc)"
            )),
        }
    }
}

/// The result of one successful market fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketBatch {
    pub fetched_at: DateTime<Utc>,
    pub snapshots: Vec<MarketSnapshot>,
}

impl MarketBatch {
    /// Stamp a freshly fetched list with the current time.
    pub fn now(snapshots: Vec<MarketSnapshot>) -> Self {
        Self {
            fetched_at: Utc::now(),
            snapshots,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
