//! Market universes (stock indices) and membership extraction.
//!
//! Membership pages are scraped into loosely-typed [`RawTable`]s; the ticker and
//! name columns are detected from the headers because page layouts drift.

use crate::domain::error::SignalError;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Universe {
    Cac40,
    Dax40,
    Nasdaq100,
    Sp500,
    DowJones,
}

impl Universe {
    pub const ALL: [Universe; 5] = [
        Universe::Cac40,
        Universe::Dax40,
        Universe::Nasdaq100,
        Universe::Sp500,
        Universe::DowJones,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Universe::Cac40 => "CAC 40",
            Universe::Dax40 => "DAX 40",
            Universe::Nasdaq100 => "NASDAQ 100",
            Universe::Sp500 => "S&P 500",
            Universe::DowJones => "Dow Jones",
        }
    }

    /// Page listing the constituents.
    pub fn source_url(&self) -> &'static str {
        match self {
            Universe::Cac40 => "https://en.wikipedia.org/wiki/CAC_40",
            Universe::Dax40 => "https://en.wikipedia.org/wiki/DAX",
            Universe::Nasdaq100 => "https://en.wikipedia.org/wiki/NASDAQ-100",
            Universe::Sp500 => "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies",
            Universe::DowJones => "https://en.wikipedia.org/wiki/Dow_Jones_Industrial_Average",
        }
    }

    /// Exchange suffix appended to bare tickers of European listings.
    pub fn exchange_suffix(&self) -> Option<&'static str> {
        match self {
            Universe::Cac40 => Some(".PA"),
            Universe::Dax40 => Some(".DE"),
            _ => None,
        }
    }
}

impl fmt::Display for Universe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Universe {
    type Err = SignalError;

    /// Accepts display labels ("CAC 40", "S&P 500") and compact forms ("cac40", "sp500").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match compact.as_str() {
            "cac40" | "cac" => Ok(Universe::Cac40),
            "dax40" | "dax" => Ok(Universe::Dax40),
            "nasdaq100" | "nasdaq" | "ndx" => Ok(Universe::Nasdaq100),
            "sp500" | "spx" => Ok(Universe::Sp500),
            "dowjones" | "dow" | "djia" => Ok(Universe::DowJones),
            _ => Err(SignalError::UnknownUniverse(s.to_string())),
        }
    }
}

/// One scraped table: header labels and cell text, row by row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub ticker: String,
    pub name: String,
}

fn has_identity_columns(table: &RawTable) -> bool {
    let cols: HashSet<String> = table.headers.iter().map(|h| h.trim().to_lowercase()).collect();
    (cols.contains("company") || cols.contains("name"))
        && (cols.contains("ticker") || cols.contains("symbol"))
}

fn find_column(headers: &[String], needles: &[&str], fallback: usize) -> usize {
    headers
        .iter()
        .position(|h| {
            let h = h.to_lowercase();
            needles.iter().any(|n| h.contains(n))
        })
        .unwrap_or(fallback)
}

/// Ticker/name pairs from the first table that carries both columns, else from
/// the first table. Tickers are trimmed, incomplete rows dropped, and duplicate
/// tickers keep their first occurrence.
pub fn extract_members(tables: &[RawTable]) -> Vec<Member> {
    let Some(table) = tables
        .iter()
        .find(|t| has_identity_columns(t))
        .or_else(|| tables.first())
    else {
        return Vec::new();
    };

    let ticker_col = find_column(&table.headers, &["ticker", "symbol"], 0);
    let name_col = find_column(&table.headers, &["company", "name"], 1);

    let mut seen = HashSet::new();
    let mut members = Vec::new();
    for row in &table.rows {
        let (Some(ticker), Some(name)) = (row.get(ticker_col), row.get(name_col)) else {
            continue;
        };
        let ticker = ticker.trim();
        let name = name.trim();
        if ticker.is_empty() || name.is_empty() {
            continue;
        }
        if seen.insert(ticker.to_string()) {
            members.push(Member {
                ticker: ticker.to_string(),
                name: name.to_string(),
            });
        }
    }
    members
}

/// [`extract_members`] plus the universe's exchange suffix on bare tickers.
pub fn universe_members(universe: Universe, tables: &[RawTable]) -> Vec<Member> {
    let mut members = extract_members(tables);
    if let Some(suffix) = universe.exchange_suffix() {
        for m in &mut members {
            if !m.ticker.contains('.') {
                m.ticker.push_str(suffix);
            }
        }
    }
    members
}
