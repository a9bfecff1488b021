//! Core domain types and logic.

pub mod analysis;
pub mod config;
pub mod decision;
pub mod error;
pub mod indicator;
pub mod market;
pub mod memo;
pub mod ohlcv;
pub mod period;
pub mod price_table;
pub mod resolver;
pub mod risk_profile;
pub mod sentiment;
pub mod symbol_cache;
pub mod symbol_guess;
pub mod universe;
