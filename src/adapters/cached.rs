//! Memoising decorators over the fetch ports.
//!
//! Keys are canonical argument tuples, so the same request in a different symbol
//! order hits the same entry. Only successful fetches are kept.

use crate::domain::error::FetchResult;
use crate::domain::memo::MemoCache;
use crate::domain::period::{Interval, Period};
use crate::domain::price_table::ProviderResponse;
use crate::domain::resolver::SymbolCandidate;
use crate::domain::sentiment::NewsItem;
use crate::domain::universe::{RawTable, Universe};
use crate::ports::membership_port::MembershipPort;
use crate::ports::news_port::NewsPort;
use crate::ports::quote_port::QuotePort;
use tracing::debug;

pub type QuoteKey = (Vec<String>, Period, Interval);
pub type NewsKey = (String, String, usize);

/// Every process-lifetime fetch cache.
#[derive(Debug, Default)]
pub struct Caches {
    pub quotes: MemoCache<QuoteKey, ProviderResponse>,
    pub news: MemoCache<NewsKey, Vec<NewsItem>>,
    pub membership: MemoCache<Universe, Vec<RawTable>>,
}

impl Caches {
    /// Empties every fetch cache. The persisted identifier mapping is separate
    /// and untouched.
    pub fn clear_all(&self) {
        self.quotes.clear();
        self.news.clear();
        self.membership.clear();
    }

    pub fn len(&self) -> usize {
        self.quotes.len() + self.news.len() + self.membership.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct CachedQuotePort<'a> {
    inner: &'a dyn QuotePort,
    cache: &'a MemoCache<QuoteKey, ProviderResponse>,
}

impl<'a> CachedQuotePort<'a> {
    pub fn new(inner: &'a dyn QuotePort, cache: &'a MemoCache<QuoteKey, ProviderResponse>) -> Self {
        Self { inner, cache }
    }
}

impl QuotePort for CachedQuotePort<'_> {
    fn history(
        &self,
        symbols: &[String],
        period: Period,
        interval: Interval,
    ) -> FetchResult<ProviderResponse> {
        let mut key_symbols = symbols.to_vec();
        key_symbols.sort();
        key_symbols.dedup();
        let key = (key_symbols, period, interval);
        if let Some(hit) = self.cache.get(&key) {
            debug!("quote cache hit for {} symbol(s) over {period}", symbols.len());
            return Ok(hit);
        }
        let response = self.inner.history(symbols, period, interval)?;
        self.cache.put(key, response.clone());
        Ok(response)
    }

    fn search(&self, query: &str) -> FetchResult<Vec<SymbolCandidate>> {
        self.inner.search(query)
    }
}

pub struct CachedNewsPort<'a> {
    inner: &'a dyn NewsPort,
    cache: &'a MemoCache<NewsKey, Vec<NewsItem>>,
}

impl<'a> CachedNewsPort<'a> {
    pub fn new(inner: &'a dyn NewsPort, cache: &'a MemoCache<NewsKey, Vec<NewsItem>>) -> Self {
        Self { inner, cache }
    }
}

impl NewsPort for CachedNewsPort<'_> {
    fn headlines(&self, query: &str, lang: &str, limit: usize) -> FetchResult<Vec<NewsItem>> {
        let key = (query.trim().to_string(), lang.trim().to_lowercase(), limit);
        self.cache
            .get_or_try_insert_with(key, || self.inner.headlines(query, lang, limit))
    }
}

pub struct CachedMembershipPort<'a> {
    inner: &'a dyn MembershipPort,
    cache: &'a MemoCache<Universe, Vec<RawTable>>,
}

impl<'a> CachedMembershipPort<'a> {
    pub fn new(inner: &'a dyn MembershipPort, cache: &'a MemoCache<Universe, Vec<RawTable>>) -> Self {
        Self { inner, cache }
    }
}

impl MembershipPort for CachedMembershipPort<'_> {
    fn tables(&self, universe: Universe) -> FetchResult<Vec<RawTable>> {
        self.cache
            .get_or_try_insert_with(universe, || self.inner.tables(universe))
    }
}
