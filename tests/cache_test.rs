//! Memoising port decorators.

mod common;

use common::*;
use signaldesk::adapters::cached::{Caches, CachedMembershipPort, CachedNewsPort, CachedQuotePort};
use signaldesk::domain::error::FetchError;
use signaldesk::domain::period::{Interval, Period};
use signaldesk::domain::symbol_cache::SymbolCache;
use signaldesk::domain::universe::Universe;
use signaldesk::ports::membership_port::MembershipPort;
use signaldesk::ports::news_port::NewsPort;
use signaldesk::ports::quote_port::QuotePort;

fn syms(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn repeated_history_requests_hit_the_cache() {
    let inner = MockQuotePort::new()
        .with_bars("AIR.PA", generate_bars(date(2024, 1, 1), 5, 100.0, 1.0))
        .with_bars("MC.PA", generate_bars(date(2024, 1, 1), 5, 700.0, 1.0));
    let caches = Caches::default();
    let quotes = CachedQuotePort::new(&inner, &caches.quotes);

    let first = quotes
        .history(&syms(&["AIR.PA", "MC.PA"]), Period::Days(30), Interval::Daily)
        .unwrap();
    let reordered = quotes
        .history(&syms(&["MC.PA", "AIR.PA"]), Period::Days(30), Interval::Daily)
        .unwrap();
    assert_eq!(first, reordered);
    assert_eq!(inner.call_count(), 1);

    quotes
        .history(&syms(&["AIR.PA", "MC.PA"]), Period::Days(60), Interval::Daily)
        .unwrap();
    assert_eq!(inner.call_count(), 2);
    assert_eq!(caches.quotes.len(), 2);
}

#[test]
fn failed_fetches_are_not_memoised() {
    let inner = MockQuotePort::new().with_error("AIR.PA", FetchError::Timeout { seconds: 15 });
    let caches = Caches::default();
    let quotes = CachedQuotePort::new(&inner, &caches.quotes);

    for _ in 0..2 {
        let err = quotes
            .history(&syms(&["AIR.PA"]), Period::Days(5), Interval::Daily)
            .unwrap_err();
        assert_eq!(err, FetchError::Timeout { seconds: 15 });
    }
    assert_eq!(inner.call_count(), 2);
    assert!(caches.is_empty());
}

#[test]
fn search_is_never_cached() {
    let inner = MockQuotePort::new().with_candidates(vec![candidate("AIR.PA", "Airbus")]);
    let caches = Caches::default();
    let quotes = CachedQuotePort::new(&inner, &caches.quotes);
    quotes.search("airbus").unwrap();
    quotes.search("airbus").unwrap();
    assert_eq!(inner.searches.get(), 2);
}

#[test]
fn news_keyed_by_query_lang_and_limit() {
    let inner = MockNewsPort::new().with_headlines("airbus", &["a", "b", "c"]);
    let caches = Caches::default();
    let news = CachedNewsPort::new(&inner, &caches.news);

    assert_eq!(news.headlines("airbus", "fr", 6).unwrap().len(), 3);
    assert_eq!(news.headlines(" airbus ", "FR", 6).unwrap().len(), 3);
    assert_eq!(inner.asked().len(), 1);

    assert_eq!(news.headlines("airbus", "en", 6).unwrap().len(), 3);
    assert_eq!(news.headlines("airbus", "fr", 2).unwrap().len(), 2);
    assert_eq!(inner.asked().len(), 3);
}

#[test]
fn membership_cached_per_universe() {
    let inner = MockMembershipPort::new().with_members(Universe::Cac40, &[("AIR", "Airbus")]);
    let caches = Caches::default();
    let membership = CachedMembershipPort::new(&inner, &caches.membership);

    membership.tables(Universe::Cac40).unwrap();
    membership.tables(Universe::Cac40).unwrap();
    membership.tables(Universe::Dax40).unwrap();
    assert_eq!(inner.calls.get(), 2);
}

#[test]
fn clear_all_keeps_the_symbol_mapping() {
    let inner = MockNewsPort::new().with_headlines("airbus", &["a"]);
    let caches = Caches::default();
    let news = CachedNewsPort::new(&inner, &caches.news);
    news.headlines("airbus", "fr", 6).unwrap();

    let store = MemoryMappingStore::with_entry("AIRBUS", "AIR.PA");
    let symbols = SymbolCache::open(Box::new(store.clone()));

    caches.clear_all();
    assert!(caches.is_empty());
    assert_eq!(symbols.get("airbus"), Some("AIR.PA"));
    assert_eq!(store.get("AIRBUS").as_deref(), Some("AIR.PA"));

    news.headlines("airbus", "fr", 6).unwrap();
    assert_eq!(inner.asked().len(), 2);
}
