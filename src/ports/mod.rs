//! Port traits: the boundaries between the signal pipeline and its data sources.

pub mod config_port;
pub mod lexicon_port;
pub mod mapping_store;
pub mod membership_port;
pub mod news_port;
pub mod quote_port;
