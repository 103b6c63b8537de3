pub mod display;
pub mod market_service;
pub mod portfolio_service;
pub mod valuation_service;
