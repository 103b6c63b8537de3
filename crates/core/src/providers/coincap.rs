use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::traits::MarketDataSource;
use crate::errors::CoreError;
use crate::models::coin::MarketSnapshot;
use crate::models::settings::MarketQuery;

const BASE_URL: &str = "https://api.coincap.io/v2";

const NAME: &str = "CoinCap";

/// CoinCap `/assets` source.
///
/// - **Free**: No API key required.
/// - **Data**: assets ranked by market cap, prices in USD only.
///
/// Note: CoinCap ids ("bitcoin", "binance-coin") are not CoinGecko ids, so a
/// portfolio built against one source only values correctly against that source.
pub struct CoinCapSource {
    client: Client,
    base_url: String,
}

impl CoinCapSource {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Request URL for `query`. CoinCap pages by offset rather than page number.
    pub fn assets_url(&self, query: &MarketQuery) -> String {
        let offset = query.page.saturating_sub(1) as u64 * query.per_page as u64;
        format!(
            "{}/assets?limit={}&offset={}",
            self.base_url, query.per_page, offset
        )
    }

    /// Decode an `/assets` response body.
    ///
    /// CoinCap encodes every number as a string; unparsable or null prices read as 0.
    pub fn parse_assets(body: &str) -> Result<Vec<MarketSnapshot>, CoreError> {
        let resp: AssetsResponse = serde_json::from_str(body).map_err(|e| CoreError::DataFetch {
            source_name: NAME.into(),
            message: format!("Failed to parse assets response: {e}"),
        })?;

        Ok(resp
            .data
            .into_iter()
            .map(|a| {
                let icon = format!(
                    "https://assets.coincap.io/assets/icons/{}@2x.png",
                    a.symbol.to_lowercase()
                );
                MarketSnapshot {
                    coin_id: a.id,
                    name: a.name,
                    symbol: a.symbol,
                    current_price: parse_number(a.price_usd.as_deref()).unwrap_or(0.0),
                    market_cap: parse_number(a.market_cap_usd.as_deref()).unwrap_or(0.0),
                    image_url: Some(icon),
                    price_change_percentage_24h: parse_number(a.change_percent_24hr.as_deref()),
                }
            })
            .collect())
    }
}

impl Default for CoinCapSource {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw?.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ── CoinCap API response types ──────────────────────────────────────

#[derive(Deserialize)]
struct AssetsResponse {
    data: Vec<AssetEntry>,
}

#[derive(Deserialize)]
struct AssetEntry {
    id: String,
    symbol: String,
    name: String,
    #[serde(rename = "priceUsd")]
    price_usd: Option<String>,
    #[serde(rename = "marketCapUsd")]
    market_cap_usd: Option<String>,
    #[serde(rename = "changePercent24Hr")]
    change_percent_24hr: Option<String>,
}

#[async_trait]
impl MarketDataSource for CoinCapSource {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch_markets(&self, query: &MarketQuery) -> Result<Vec<MarketSnapshot>, CoreError> {
        if !query.vs_currency.eq_ignore_ascii_case("usd") {
            return Err(CoreError::DataFetch {
                source_name: NAME.into(),
                message: format!("only USD quotes are available, got {}", query.vs_currency),
            });
        }

        let url = self.assets_url(query);
        debug!(source = NAME, page = query.page, per_page = query.per_page, "fetching assets");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::DataFetch {
                source_name: NAME.into(),
                message: format!("HTTP {status}"),
            });
        }

        let body = response.text().await?;
        Self::parse_assets(&body)
    }
}
