pub mod coin;
pub mod portfolio;
pub mod settings;
pub mod valuation;
