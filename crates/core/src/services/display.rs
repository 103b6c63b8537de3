//! Number formatting shared by front ends.

/// `$1234.50` style, two decimals. Negative values keep their sign after `$`.
pub fn money(value: f64) -> String {
    format!("${value:.2}")
}

/// Two decimals with an explicit `+` for zero and gains.
pub fn signed(value: f64) -> String {
    if value >= 0.0 {
        format!("+{value:.2}")
    } else {
        format!("{value:.2}")
    }
}

/// `20.00%` style.
pub fn percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// Profit with its percentage, e.g. `+16000.00 (20.00%)`.
pub fn profit_with_percent(profit: f64, profit_percent: f64) -> String {
    format!("{} ({})", signed(profit), percent(profit_percent))
}
