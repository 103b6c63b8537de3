use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::CoreError;

/// Parameters of one `/coins/markets`-style request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketQuery {
    /// Quote currency, lowercase (e.g., "usd", "eur")
    pub vs_currency: String,

    /// Server-side ordering (e.g., "market_cap_desc")
    pub order: String,

    /// Page size
    pub per_page: u32,

    /// 1-based page number
    pub page: u32,
}

impl Default for MarketQuery {
    fn default() -> Self {
        Self {
            vs_currency: "usd".to_string(),
            order: "market_cap_desc".to_string(),
            per_page: 100,
            page: 1,
        }
    }
}

/// User-configurable settings.
///
/// Resolved in layers by the front end: defaults, then environment
/// (`Settings::from_env`), then explicit overrides such as command-line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Registry name of the market data source ("coingecko", "coincap")
    pub source: String,

    /// Overrides the source's default base URL
    #[serde(default)]
    pub api_base: Option<String>,

    /// Optional API key for sources that accept one
    #[serde(default)]
    pub api_key: Option<String>,

    pub vs_currency: String,
    pub order: String,
    pub per_page: u32,
    pub page: u32,

    /// Seconds between two market refreshes
    pub poll_interval_secs: u64,

    /// Directory holding the persisted portfolio slot
    #[serde(default)]
    pub data_dir: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let query = MarketQuery::default();
        Self {
            source: "coingecko".to_string(),
            api_base: None,
            api_key: None,
            vs_currency: query.vs_currency,
            order: query.order,
            per_page: query.per_page,
            page: query.page,
            poll_interval_secs: 30,
            data_dir: None,
        }
    }
}

impl Settings {
    /// Read settings from `CRYPTOPULSE_*` environment variables on top of the defaults.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Settings::from_env`], but with an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(source) = get("CRYPTOPULSE_SOURCE") {
            settings.source = source.to_lowercase();
        }
        settings.api_base = get("CRYPTOPULSE_API_BASE");
        settings.api_key = get("CRYPTOPULSE_API_KEY");
        if let Some(currency) = get("CRYPTOPULSE_VS_CURRENCY") {
            settings.vs_currency = currency.to_lowercase();
        }
        if let Some(order) = get("CRYPTOPULSE_ORDER") {
            settings.order = order;
        }
        if let Some(raw) = get("CRYPTOPULSE_PER_PAGE") {
            settings.per_page = parse_positive("CRYPTOPULSE_PER_PAGE", &raw)?;
        }
        if let Some(raw) = get("CRYPTOPULSE_PAGE") {
            settings.page = parse_positive("CRYPTOPULSE_PAGE", &raw)?;
        }
        if let Some(raw) = get("CRYPTOPULSE_POLL_SECS") {
            settings.poll_interval_secs =
                u64::from(parse_positive::<u32>("CRYPTOPULSE_POLL_SECS", &raw)?);
        }
        settings.data_dir = get("CRYPTOPULSE_DATA_DIR");

        Ok(settings)
    }

    /// The market request these settings describe.
    pub fn market_query(&self) -> MarketQuery {
        MarketQuery {
            vs_currency: self.vs_currency.clone(),
            order: self.order.clone(),
            per_page: self.per_page,
            page: self.page,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

fn parse_positive<T>(key: &str, raw: &str) -> Result<T, CoreError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    raw.parse::<T>()
        .ok()
        .filter(|v| *v > T::default())
        .ok_or_else(|| CoreError::InvalidSetting {
            key: key.to_string(),
            value: raw.to_string(),
        })
}
