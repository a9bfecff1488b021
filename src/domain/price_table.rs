//! Long-format price table and the normaliser that builds it from provider output.
//!
//! Providers answer in one of two shapes: a flat bar list when a single symbol was
//! requested, or bars grouped per symbol. Both collapse into one table with a row per
//! (symbol, date, time), sorted by symbol then timestamp. Daily bars carry no time.

use crate::domain::ohlcv::PriceBar;
use chrono::{NaiveDate, NaiveTime};
use std::collections::{BTreeMap, HashSet};

/// A bar as delivered by a provider. Any price may be missing (halted sessions,
/// partial intraday rows).
#[derive(Debug, Clone, PartialEq)]
pub struct RawBar {
    pub date: NaiveDate,
    /// Time of day for intraday bars, `None` for daily ones.
    pub time: Option<NaiveTime>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderResponse {
    /// Single-symbol shape: bars carry no symbol label.
    Flat(Vec<RawBar>),
    /// Per-symbol shape.
    Grouped(BTreeMap<String, Vec<RawBar>>),
}

impl ProviderResponse {
    pub fn is_empty(&self) -> bool {
        match self {
            ProviderResponse::Flat(bars) => bars.is_empty(),
            ProviderResponse::Grouped(groups) => groups.values().all(|b| b.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    bars: Vec<PriceBar>,
}

impl PriceTable {
    /// Builds a table from arbitrary bars, enforcing (symbol, date, time) uniqueness and
    /// order. When a key repeats, the later bar wins.
    pub fn from_bars(bars: Vec<PriceBar>) -> Self {
        let mut keyed: BTreeMap<(String, NaiveDate, Option<NaiveTime>), PriceBar> = BTreeMap::new();
        for bar in bars {
            keyed.insert((bar.symbol.clone(), bar.date, bar.time), bar);
        }
        Self {
            bars: keyed.into_values().collect(),
        }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn symbols(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for bar in &self.bars {
            if out.last() != Some(&bar.symbol.as_str()) {
                out.push(&bar.symbol);
            }
        }
        out
    }

    /// Time-ordered bars of one symbol.
    pub fn series(&self, symbol: &str) -> &[PriceBar] {
        let start = self.bars.partition_point(|b| b.symbol.as_str() < symbol);
        let end = self.bars.partition_point(|b| b.symbol.as_str() <= symbol);
        &self.bars[start..end]
    }

    /// Every symbol's date-ordered slice, in symbol order.
    pub fn by_symbol(&self) -> impl Iterator<Item = (&str, &[PriceBar])> {
        self.bars
            .chunk_by(|a, b| a.symbol == b.symbol)
            .map(|chunk| (chunk[0].symbol.as_str(), chunk))
    }

    /// Calendar days covered by any symbol, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.bars.iter().map(|b| b.date).collect();
        dates.sort();
        dates.dedup();
        dates
    }
}

/// Reshapes a provider response for `requested` symbols into a [`PriceTable`].
///
/// A flat response is attributed to the first requested symbol. Grouped responses are
/// read for the requested symbols only; symbols with no usable bars are omitted.
/// Bars missing any of open/high/low/close are dropped.
pub fn normalize(requested: &[String], response: ProviderResponse) -> PriceTable {
    let mut bars = Vec::new();
    match response {
        ProviderResponse::Flat(raw) => {
            if let Some(symbol) = requested.first() {
                bars.extend(raw.iter().filter_map(|r| complete_bar(symbol, r)));
            }
        }
        ProviderResponse::Grouped(mut groups) => {
            let mut seen = HashSet::new();
            for symbol in requested {
                if !seen.insert(symbol.as_str()) {
                    continue;
                }
                if let Some(raw) = groups.remove(symbol) {
                    bars.extend(raw.iter().filter_map(|r| complete_bar(symbol, r)));
                }
            }
        }
    }
    PriceTable::from_bars(bars)
}

fn complete_bar(symbol: &str, raw: &RawBar) -> Option<PriceBar> {
    let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
    Some(PriceBar {
        symbol: symbol.to_string(),
        date: raw.date,
        time: raw.time,
        open: finite(raw.open)?,
        high: finite(raw.high)?,
        low: finite(raw.low)?,
        close: finite(raw.close)?,
    })
}
