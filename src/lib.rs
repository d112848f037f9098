//! Terminal viewer for CoinGecko market data: a coin table, a price chart,
//! free-text search and a top-N listing.

pub mod app;
pub mod config;
pub mod data;
pub mod logging;
pub mod ui;
