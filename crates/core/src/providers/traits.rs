use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::coin::MarketSnapshot;
use crate::models::settings::MarketQuery;

/// A read-only market data API.
///
/// Each implementation turns one page of the source's "markets" listing into
/// `MarketSnapshot`s. Sources never retry; the poller decides what a failure
/// means.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch one page of coin snapshots, in the order the source returns them.
    async fn fetch_markets(&self, query: &MarketQuery) -> Result<Vec<MarketSnapshot>, CoreError>;
}
