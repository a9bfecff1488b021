//! Concrete adapter implementations for ports.

pub mod cached;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod google_news_adapter;
pub mod http;
pub mod json_state_store;
pub mod vader_lexicon;
pub mod wikipedia_membership_adapter;
pub mod yahoo_adapter;
