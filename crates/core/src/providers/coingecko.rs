use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::traits::MarketDataSource;
use crate::errors::CoreError;
use crate::models::coin::MarketSnapshot;
use crate::models::settings::MarketQuery;

/// Public and demo API (demo keys start with "CG-")
const PUBLIC_BASE_URL: &str = "https://api.coingecko.com/api/v3";
/// Pro API (paid keys)
const PRO_BASE_URL: &str = "https://pro-api.coingecko.com/api/v3";

const NAME: &str = "CoinGecko";

/// CoinGecko `/coins/markets` source.
///
/// - **Free**: works without a key at 10-30 calls/minute.
/// - **Keys**: demo keys (`CG-...`) go in `x-cg-demo-api-key`,
///   anything else is treated as a pro key (`x-cg-pro-api-key`, pro host).
pub struct CoinGeckoSource {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoSource {
    pub fn new(api_key: Option<String>) -> Self {
        let base_url = match api_key.as_deref() {
            Some(key) if !key.starts_with("CG-") => PRO_BASE_URL,
            _ => PUBLIC_BASE_URL,
        };
        Self::with_base_url(base_url, api_key)
    }

    /// Point the source at a different host (proxies, mirrors, tests).
    pub fn with_base_url(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full request URL for `query`.
    pub fn markets_url(&self, query: &MarketQuery) -> String {
        format!(
            "{}/coins/markets?vs_currency={}&order={}&per_page={}&page={}&sparkline=false",
            self.base_url,
            query.vs_currency.to_lowercase(),
            query.order,
            query.per_page,
            query.page
        )
    }

    /// Decode a `/coins/markets` response body.
    pub fn parse_markets(body: &str) -> Result<Vec<MarketSnapshot>, CoreError> {
        let coins: Vec<CoinMarket> =
            serde_json::from_str(body).map_err(|e| CoreError::DataFetch {
                source_name: NAME.into(),
                message: format!("Failed to parse markets response: {e}"),
            })?;
        Ok(coins.into_iter().map(MarketSnapshot::from).collect())
    }
}

impl Default for CoinGeckoSource {
    fn default() -> Self {
        Self::new(None)
    }
}

// ── CoinGecko API response types ────────────────────────────────────

#[derive(Deserialize)]
struct CoinMarket {
    id: String,
    name: String,
    symbol: String,
    current_price: Option<f64>,
    market_cap: Option<f64>,
    image: Option<String>,
    price_change_percentage_24h: Option<f64>,
}

impl From<CoinMarket> for MarketSnapshot {
    fn from(c: CoinMarket) -> Self {
        MarketSnapshot {
            coin_id: c.id,
            name: c.name,
            symbol: c.symbol,
            current_price: c.current_price.unwrap_or(0.0),
            market_cap: c.market_cap.unwrap_or(0.0),
            image_url: c.image,
            price_change_percentage_24h: c.price_change_percentage_24h,
        }
    }
}

#[async_trait]
impl MarketDataSource for CoinGeckoSource {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch_markets(&self, query: &MarketQuery) -> Result<Vec<MarketSnapshot>, CoreError> {
        let url = self.markets_url(query);
        debug!(source = NAME, page = query.page, per_page = query.per_page, "fetching markets");

        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(key) = &self.api_key {
            if key.starts_with("CG-") {
                request = request.header("x-cg-demo-api-key", key);
            } else {
                request = request.header("x-cg-pro-api-key", key);
            }
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::DataFetch {
                source_name: NAME.into(),
                message: format!("HTTP {status}"),
            });
        }

        let body = response.text().await?;
        Self::parse_markets(&body)
    }
}
