#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime};
use signaldesk::domain::error::{FetchError, FetchResult, SignalError};
use signaldesk::domain::period::{Interval, Period};
use signaldesk::domain::price_table::{ProviderResponse, RawBar};
use signaldesk::domain::resolver::SymbolCandidate;
use signaldesk::domain::sentiment::NewsItem;
use signaldesk::domain::universe::{RawTable, Universe};
use signaldesk::ports::mapping_store::MappingStore;
use signaldesk::ports::membership_port::MembershipPort;
use signaldesk::ports::news_port::NewsPort;
use signaldesk::ports::quote_port::QuotePort;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

pub type HistoryCall = (Vec<String>, Period, Interval);

/// Quote port answering from fixed per-symbol bars. Intraday requests read a
/// separate map, so a one-day horizon can be made to come back empty.
pub struct MockQuotePort {
    pub daily: HashMap<String, Vec<RawBar>>,
    pub intraday: HashMap<String, Vec<RawBar>>,
    pub errors: HashMap<String, FetchError>,
    pub candidates: Vec<SymbolCandidate>,
    pub calls: RefCell<Vec<HistoryCall>>,
    pub searches: Cell<usize>,
}

impl MockQuotePort {
    pub fn new() -> Self {
        Self {
            daily: HashMap::new(),
            intraday: HashMap::new(),
            errors: HashMap::new(),
            candidates: Vec::new(),
            calls: RefCell::new(Vec::new()),
            searches: Cell::new(0),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<RawBar>) -> Self {
        self.daily.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_intraday(mut self, symbol: &str, bars: Vec<RawBar>) -> Self {
        self.intraday.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, err: FetchError) -> Self {
        self.errors.insert(symbol.to_string(), err);
        self
    }

    pub fn with_candidates(mut self, candidates: Vec<SymbolCandidate>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn last_call(&self) -> Option<HistoryCall> {
        self.calls.borrow().last().cloned()
    }

    fn bars_for(&self, symbol: &str, interval: Interval) -> Vec<RawBar> {
        let source = match interval {
            Interval::Daily => &self.daily,
            Interval::FiveMinutes => &self.intraday,
        };
        source.get(symbol).cloned().unwrap_or_default()
    }
}

impl QuotePort for MockQuotePort {
    fn history(
        &self,
        symbols: &[String],
        period: Period,
        interval: Interval,
    ) -> FetchResult<ProviderResponse> {
        self.calls
            .borrow_mut()
            .push((symbols.to_vec(), period, interval));
        if let Some(err) = symbols.iter().find_map(|s| self.errors.get(s)) {
            return Err(err.clone());
        }
        if let [symbol] = symbols {
            return Ok(ProviderResponse::Flat(self.bars_for(symbol, interval)));
        }
        Ok(ProviderResponse::Grouped(
            symbols
                .iter()
                .map(|s| (s.clone(), self.bars_for(s, interval)))
                .collect(),
        ))
    }

    fn search(&self, _query: &str) -> FetchResult<Vec<SymbolCandidate>> {
        self.searches.set(self.searches.get() + 1);
        Ok(self.candidates.clone())
    }
}

/// News port with canned headlines per query and a log of the queries asked.
pub struct MockNewsPort {
    pub responses: HashMap<String, Vec<NewsItem>>,
    pub failing: HashSet<String>,
    pub queries: RefCell<Vec<(String, String, usize)>>,
}

impl MockNewsPort {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            failing: HashSet::new(),
            queries: RefCell::new(Vec::new()),
        }
    }

    pub fn with_headlines(mut self, query: &str, titles: &[&str]) -> Self {
        self.responses
            .insert(query.to_string(), titles.iter().map(|t| news_item(t)).collect());
        self
    }

    pub fn failing_on(mut self, query: &str) -> Self {
        self.failing.insert(query.to_string());
        self
    }

    pub fn asked(&self) -> Vec<String> {
        self.queries.borrow().iter().map(|(q, _, _)| q.clone()).collect()
    }
}

impl NewsPort for MockNewsPort {
    fn headlines(&self, query: &str, lang: &str, limit: usize) -> FetchResult<Vec<NewsItem>> {
        self.queries
            .borrow_mut()
            .push((query.to_string(), lang.to_string(), limit));
        if self.failing.contains(query) {
            return Err(FetchError::Network {
                reason: "connection reset".into(),
            });
        }
        let mut items = self.responses.get(query).cloned().unwrap_or_default();
        items.truncate(limit);
        Ok(items)
    }
}

/// Membership port returning fixed tables per universe.
pub struct MockMembershipPort {
    pub tables: HashMap<Universe, Vec<RawTable>>,
    pub failing: HashSet<Universe>,
    pub calls: Cell<usize>,
}

impl MockMembershipPort {
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
            failing: HashSet::new(),
            calls: Cell::new(0),
        }
    }

    pub fn with_members(mut self, universe: Universe, members: &[(&str, &str)]) -> Self {
        self.tables.insert(
            universe,
            vec![table(
                &["Company", "Ticker"],
                &members
                    .iter()
                    .map(|(ticker, name)| vec![*name, *ticker])
                    .collect::<Vec<_>>(),
            )],
        );
        self
    }

    pub fn failing_on(mut self, universe: Universe) -> Self {
        self.failing.insert(universe);
        self
    }
}

impl MembershipPort for MockMembershipPort {
    fn tables(&self, universe: Universe) -> FetchResult<Vec<RawTable>> {
        self.calls.set(self.calls.get() + 1);
        if self.failing.contains(&universe) {
            return Err(FetchError::Http {
                status: 503,
                endpoint: "en.wikipedia.org".into(),
            });
        }
        Ok(self.tables.get(&universe).cloned().unwrap_or_default())
    }
}

/// In-memory mapping store whose contents stay visible to the test after the
/// store itself has been boxed into a cache.
#[derive(Clone, Default)]
pub struct MemoryMappingStore {
    pub entries: Rc<RefCell<BTreeMap<String, String>>>,
    pub saves: Rc<Cell<usize>>,
}

impl MemoryMappingStore {
    pub fn with_entry(raw: &str, symbol: &str) -> Self {
        let store = Self::default();
        store
            .entries
            .borrow_mut()
            .insert(raw.to_string(), symbol.to_string());
        store
    }

    pub fn get(&self, raw: &str) -> Option<String> {
        self.entries.borrow().get(raw).cloned()
    }
}

impl MappingStore for MemoryMappingStore {
    fn load(&self) -> Result<BTreeMap<String, String>, SignalError> {
        Ok(self.entries.borrow().clone())
    }

    fn save(&self, mapping: &BTreeMap<String, String>) -> Result<(), SignalError> {
        *self.entries.borrow_mut() = mapping.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// `count` consecutive daily bars, close moving by `step` per bar, high one
/// above and low two below the close.
pub fn generate_bars(start: NaiveDate, count: usize, start_price: f64, step: f64) -> Vec<RawBar> {
    (0..count)
        .map(|i| {
            let close = start_price + step * i as f64;
            RawBar {
                date: start + chrono::Duration::days(i as i64),
                time: None,
                open: Some(close),
                high: Some(close + 1.0),
                low: Some(close - 2.0),
                close: Some(close),
            }
        })
        .collect()
}

/// `count` five-minute bars of one session opening at 09:00, shaped like
/// [`generate_bars`].
pub fn generate_session(day: NaiveDate, count: usize, start_price: f64, step: f64) -> Vec<RawBar> {
    let open = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    generate_bars(day, count, start_price, step)
        .into_iter()
        .enumerate()
        .map(|(i, bar)| RawBar {
            date: day,
            time: Some(open + chrono::Duration::minutes(5 * i as i64)),
            ..bar
        })
        .collect()
}

pub fn news_item(title: &str) -> NewsItem {
    NewsItem {
        title: title.to_string(),
        link: format!("https://news.example/{}", title.len()),
        published: None,
    }
}

pub fn candidate(symbol: &str, name: &str) -> SymbolCandidate {
    SymbolCandidate {
        symbol: symbol.to_string(),
        name: name.to_string(),
        exchange: "Paris".to_string(),
        instrument_type: "EQUITY".to_string(),
    }
}

pub fn table(headers: &[&str], rows: &[Vec<&str>]) -> RawTable {
    RawTable {
        headers: headers.iter().map(|h| h.to_string()).collect(),
        rows: rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
    }
}
