use std::sync::Arc;

use super::coincap::CoinCapSource;
use super::coingecko::CoinGeckoSource;
use super::traits::MarketDataSource;
use crate::errors::CoreError;
use crate::models::settings::Settings;

/// Registry of market data sources, looked up by name.
///
/// Sources are selected, never chained as fallbacks: each one has its own
/// coin id space and portfolio entries are keyed by those ids.
pub struct SourceRegistry {
    sources: Vec<(String, Arc<dyn MarketDataSource>)>,
}

impl SourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Create a registry with the built-in sources, configured from `settings`.
    ///
    /// `api_base` and `api_key` only apply to the source `settings.source` names.
    pub fn new_with_defaults(settings: &Settings) -> Self {
        let mut registry = Self::new();
        let selected = settings.source.to_lowercase();

        let coingecko = match (&settings.api_base, selected == "coingecko") {
            (Some(base), true) => CoinGeckoSource::with_base_url(base, settings.api_key.clone()),
            (None, true) => CoinGeckoSource::new(settings.api_key.clone()),
            _ => CoinGeckoSource::default(),
        };
        registry.register("coingecko", Arc::new(coingecko));

        let coincap = match (&settings.api_base, selected == "coincap") {
            (Some(base), true) => CoinCapSource::with_base_url(base),
            _ => CoinCapSource::new(),
        };
        registry.register("coincap", Arc::new(coincap));

        registry
    }

    /// Register a source under `name` (case-insensitive). A later registration
    /// under the same name replaces the earlier one.
    pub fn register(&mut self, name: &str, source: Arc<dyn MarketDataSource>) {
        let key = name.to_lowercase();
        self.sources.retain(|(n, _)| *n != key);
        self.sources.push((key, source));
    }

    /// Look up a source by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn MarketDataSource>, CoreError> {
        let key = name.to_lowercase();
        self.sources
            .iter()
            .find(|(n, _)| *n == key)
            .map(|(_, s)| Arc::clone(s))
            .ok_or_else(|| CoreError::UnknownSource(name.to_string()))
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(|(n, _)| n.as_str()).collect()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
