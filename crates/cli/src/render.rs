use chrono::{DateTime, Utc};
use cryptopulse_core::models::coin::MarketSnapshot;
use cryptopulse_core::polling::poller::FeedStatus;
use cryptopulse_core::models::valuation::PortfolioValuation;
use cryptopulse_core::services::display;

pub fn market_table(rows: &[MarketSnapshot]) -> String {
    let mut out = format!(
        "{:<4} {:<24} {:<8} {:>16} {:>9} {:>20}\n",
        "#", "Coin", "Symbol", "Price", "24h", "Market Cap"
    );
    for (i, coin) in rows.iter().enumerate() {
        let change = coin
            .price_change_percentage_24h
            .map(display::percent)
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<4} {:<24} {:<8} {:>16} {:>9} {:>20}\n",
            i + 1,
            truncate(&coin.name, 24),
            coin.symbol.to_uppercase(),
            display::money(coin.current_price),
            change,
            display::money(coin.market_cap),
        ));
    }
    out
}

pub fn portfolio_table(valuation: &PortfolioValuation) -> String {
    if valuation.is_empty() {
        return "No coins added yet.\n".to_string();
    }

    let mut out = format!(
        "{:<4} {:<28} {:>14} {:>16} {:>16} {:>26}\n",
        "#", "Coin", "Qty", "Invested", "Current", "P/L"
    );
    for e in &valuation.entries {
        let label = format!("{} ({})", e.name, e.symbol);
        let marker = if e.matched { "" } else { " *" };
        out.push_str(&format!(
            "{:<4} {:<28} {:>14} {:>16} {:>16} {:>26}{}\n",
            e.index,
            truncate(&label, 28),
            e.quantity,
            display::money(e.invested_value),
            display::money(e.current_value),
            display::profit_with_percent(e.profit, e.profit_percent),
            marker,
        ));
    }

    out.push('\n');
    out.push_str(&format!(
        "Total Invested: {}\n",
        display::money(valuation.total_invested)
    ));
    out.push_str(&format!(
        "Total Current:  {}\n",
        display::money(valuation.total_current)
    ));
    out.push_str(&format!(
        "Total P/L:      {}\n",
        display::profit_with_percent(valuation.total_profit, valuation.total_profit_percent)
    ));
    if valuation.unmatched().next().is_some() {
        out.push_str("* no live price in the current market data; valued at 0\n");
    }
    out
}

/// One-line notice for a failed refresh; `None` for every other status.
pub fn feed_status_line(status: &FeedStatus, last_good: Option<DateTime<Utc>>) -> Option<String> {
    let FeedStatus::Failed { at, message } = status else {
        return None;
    };
    let fallback = match last_good {
        Some(t) => format!("showing prices from {}", t.format("%H:%M:%S UTC")),
        None => "no prices loaded yet".to_string(),
    };
    Some(format!(
        "!! refresh failed at {}: {message} ({fallback})",
        at.format("%H:%M:%S UTC")
    ))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
        t.push('…');
        t
    }
}
