//! Turns a batch of social-media posts into per-symbol price charts.
//!
//! Posts are scanned for ticker-like tokens, mentions are indexed per symbol, and
//! every symbol gets a 30-day close-price chart written to the output directory.

pub mod analyzer;
pub mod chart;
pub mod config;
pub mod logging;
pub mod market;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod source;
pub mod utils;
