use crate::errors::CoreError;
use crate::models::coin::MarketSnapshot;
use crate::models::portfolio::{AddEntryRequest, PortfolioEntry};

/// Turns "add coin" input into portfolio entries.
///
/// Pure business logic, no I/O. Validation happens here, before anything
/// reaches the store, so a rejected add never changes persisted state.
pub struct PortfolioService;

impl PortfolioService {
    pub fn new() -> Self {
        Self
    }

    /// Validate `request` against the currently loaded `snapshots` and build
    /// the entry to append.
    ///
    /// Rules:
    /// - A coin must be selected, and it must be in the loaded batch
    /// - Quantity and buy price must be finite numbers greater than zero
    pub fn build_entry(
        &self,
        request: &AddEntryRequest,
        snapshots: &[MarketSnapshot],
    ) -> Result<PortfolioEntry, CoreError> {
        let coin_id = request.coin_id.trim();
        if coin_id.is_empty() {
            return Err(CoreError::InvalidAddInput("no coin selected".into()));
        }

        let quantity = parse_amount("quantity", &request.quantity)?;
        let buy_price = parse_amount("buy price", &request.buy_price)?;

        let snapshot = snapshots
            .iter()
            .find(|s| s.coin_id == coin_id)
            .ok_or_else(|| {
                CoreError::InvalidAddInput(format!(
                    "coin {coin_id:?} is not in the loaded market data"
                ))
            })?;

        Ok(PortfolioEntry::from_snapshot(snapshot, quantity, buy_price))
    }
}

impl Default for PortfolioService {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_amount(field: &str, raw: &str) -> Result<f64, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidAddInput(format!("{field} is required")));
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|_| CoreError::InvalidAddInput(format!("{field} {trimmed:?} is not a number")))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(CoreError::InvalidAddInput(format!(
            "{field} must be greater than zero, got {trimmed}"
        )));
    }
    Ok(value)
}
