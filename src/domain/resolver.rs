//! Identifier resolution: raw user input → canonical market symbol.
//!
//! Order, stopping at the first success:
//! 1. normalise (trim, uppercase)
//! 2. symbol cache lookup (no network)
//! 3. heuristic guess from [`guess_canonical`]
//! 4. verification probe: a 5-day daily history fetch for the guess; a non-empty
//!    answer commits the mapping to the cache
//!
//! Failing to resolve is a normal outcome (`None`), the cue to ask the user to
//! disambiguate, for instance from [`IdentifierResolver::suggest`].

use crate::domain::error::SignalError;
use crate::domain::period::{Interval, Period};
use crate::domain::price_table::normalize;
use crate::domain::symbol_cache::SymbolCache;
use crate::domain::symbol_guess::{guess_canonical, normalize_identifier};
use crate::ports::quote_port::QuotePort;
use std::fmt;
use tracing::{debug, info, warn};

pub const PROBE_PERIOD: Period = Period::Days(5);
pub const MAX_SUGGESTIONS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Cached,
    Heuristic,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Cached => f.write_str("cached"),
            Provenance::Heuristic => f.write_str("heuristic"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub symbol: String,
    pub provenance: Provenance,
}

/// One hit from the symbol search endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolCandidate {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    pub instrument_type: String,
}

pub struct IdentifierResolver<'a> {
    cache: &'a mut SymbolCache,
    quotes: &'a dyn QuotePort,
}

impl<'a> IdentifierResolver<'a> {
    pub fn new(cache: &'a mut SymbolCache, quotes: &'a dyn QuotePort) -> Self {
        Self { cache, quotes }
    }

    pub fn resolve(&mut self, raw: &str) -> Option<Resolution> {
        let key = normalize_identifier(raw);
        if key.is_empty() {
            return None;
        }

        if let Some(symbol) = self.cache.get(&key) {
            debug!("{key}: cache hit → {symbol}");
            return Some(Resolution {
                symbol: symbol.to_string(),
                provenance: Provenance::Cached,
            });
        }

        let guess = guess_canonical(&key)?;
        if !self.probe(&guess) {
            info!("{key}: guess {guess} did not verify");
            return None;
        }

        if let Err(e) = self.cache.put(&key, &guess) {
            warn!("{key}: resolved to {guess} but mapping was not persisted: {e}");
        }
        Some(Resolution {
            symbol: guess,
            provenance: Provenance::Heuristic,
        })
    }

    /// Cached mapping or heuristic guess, without touching the network.
    pub fn preview(&self, raw: &str) -> Option<String> {
        let key = normalize_identifier(raw);
        match self.cache.get(&key) {
            Some(symbol) => Some(symbol.to_string()),
            None => guess_canonical(&key),
        }
    }

    /// Stores a caller-chosen symbol for `raw`; later lookups come back as cached.
    pub fn assign(&mut self, raw: &str, symbol: &str) -> Result<(), SignalError> {
        self.cache.put(raw, symbol)
    }

    /// Search-endpoint candidates for an unresolved identifier. Never committed to
    /// the cache; a failed search yields no candidates.
    pub fn suggest(&self, raw: &str) -> Vec<SymbolCandidate> {
        let query = raw.trim();
        if query.is_empty() {
            return Vec::new();
        }
        match self.quotes.search(query) {
            Ok(mut found) => {
                found.truncate(MAX_SUGGESTIONS);
                found
            }
            Err(e) => {
                warn!("symbol search for {query} failed: {e}");
                Vec::new()
            }
        }
    }

    fn probe(&self, symbol: &str) -> bool {
        let requested = [symbol.to_string()];
        match self.quotes.history(&requested, PROBE_PERIOD, Interval::Daily) {
            Ok(response) => !normalize(&requested, response).is_empty(),
            Err(e) => {
                debug!("probe for {symbol} failed: {e}");
                false
            }
        }
    }
}
