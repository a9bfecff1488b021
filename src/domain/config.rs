//! Application settings read from a [`ConfigPort`] and validated up front.
//!
//! Every key is optional; an absent file or key means the built-in default.

use crate::domain::error::SignalError;
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_TIMEOUT_SECS: i64 = 15;
pub const DEFAULT_NEWS_LANG: &str = "fr";
pub const DEFAULT_NEWS_ITEMS: i64 = 6;
pub const DEFAULT_HISTORY_DAYS: i64 = 120;
pub const DEFAULT_TOP_N: i64 = 10;
/// MA20 plus the 30-bar change need at least this much daily history.
pub const MIN_HISTORY_DAYS: i64 = 31;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
    pub news_lang: String,
    pub news_max_items: usize,
    pub lexicon_path: Option<PathBuf>,
    pub history_days: u32,
    pub top_n: usize,
    pub csv_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            timeout_secs: DEFAULT_TIMEOUT_SECS as u64,
            user_agent: None,
            news_lang: DEFAULT_NEWS_LANG.to_string(),
            news_max_items: DEFAULT_NEWS_ITEMS as usize,
            lexicon_path: None,
            history_days: DEFAULT_HISTORY_DAYS as u32,
            top_n: DEFAULT_TOP_N as usize,
            csv_dir: None,
        }
    }
}

impl AppConfig {
    pub fn from_port(config: &dyn ConfigPort) -> Result<Self, SignalError> {
        let timeout = ranged(config, "network", "timeout_secs", DEFAULT_TIMEOUT_SECS, 1, 60)?;
        let max_items = ranged(config, "news", "max_items", DEFAULT_NEWS_ITEMS, 1, 20)?;
        let history_days = ranged(
            config,
            "market",
            "history_days",
            DEFAULT_HISTORY_DAYS,
            MIN_HISTORY_DAYS,
            i64::from(u32::MAX),
        )?;
        let top_n = ranged(config, "market", "top_n", DEFAULT_TOP_N, 1, 500)?;

        Ok(Self {
            data_dir: non_empty(config, "data", "dir")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            timeout_secs: timeout as u64,
            user_agent: non_empty(config, "network", "user_agent"),
            news_lang: validate_lang(config)?,
            news_max_items: max_items as usize,
            lexicon_path: non_empty(config, "sentiment", "lexicon_path").map(PathBuf::from),
            history_days: history_days as u32,
            top_n: top_n as usize,
            csv_dir: non_empty(config, "quotes", "csv_dir").map(PathBuf::from),
        })
    }
}

fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Integer key within `min..=max`. A present but non-numeric value is rejected
/// rather than silently replaced by the default.
fn ranged(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
    min: i64,
    max: i64,
) -> Result<i64, SignalError> {
    let invalid = |reason: String| SignalError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    };
    let value = match non_empty(config, section, key) {
        None => default,
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| invalid(format!("'{}' is not an integer", raw)))?,
    };
    if value < min || value > max {
        return Err(invalid(format!("{} must be between {} and {}", key, min, max)));
    }
    Ok(value)
}

fn validate_lang(config: &dyn ConfigPort) -> Result<String, SignalError> {
    let lang = non_empty(config, "news", "lang")
        .unwrap_or_else(|| DEFAULT_NEWS_LANG.to_string())
        .to_lowercase();
    if lang.len() != 2 || !lang.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(SignalError::ConfigInvalid {
            section: "news".to_string(),
            key: "lang".to_string(),
            reason: format!("'{}' is not a two-letter language code", lang),
        });
    }
    Ok(lang)
}
