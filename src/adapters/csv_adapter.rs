//! Offline quote source: one `<SYMBOL>.csv` file per symbol with a
//! `date,open,high,low,close` header (extra columns ignored).

use crate::domain::error::{FetchError, FetchResult};
use crate::domain::period::{Interval, Period};
use crate::domain::price_table::{ProviderResponse, RawBar};
use crate::domain::resolver::SymbolCandidate;
use crate::ports::quote_port::QuotePort;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, warn};

pub struct CsvQuoteAdapter {
    base_path: PathBuf,
}

impl CsvQuoteAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    /// Bars of the period counted back from the file's last date. A missing file
    /// means the symbol is unknown and gives no bars.
    fn read_symbol(&self, symbol: &str, period: Period) -> FetchResult<Vec<RawBar>> {
        let path = self.csv_path(symbol);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{}: no such file", path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(FetchError::Io {
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let mut bars = parse_bars(&content)?;
        bars.sort_by_key(|b| b.date);
        if let Some(last) = bars.last().map(|b| b.date) {
            let start = period.start_date(last);
            bars.retain(|b| b.date > start);
        }
        Ok(bars)
    }
}

fn cell(record: &csv::StringRecord, index: usize) -> Option<f64> {
    record
        .get(index)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}

pub fn parse_bars(content: &str) -> FetchResult<Vec<RawBar>> {
    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let mut bars = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| FetchError::Parse {
            reason: format!("CSV parse error: {}", e),
        })?;

        let date_str = record.get(0).ok_or_else(|| FetchError::Parse {
            reason: "missing date column".into(),
        })?;
        let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
            FetchError::Parse {
                reason: format!("invalid date '{}': {}", date_str, e),
            }
        })?;

        bars.push(RawBar {
            date,
            time: None,
            open: cell(&record, 1),
            high: cell(&record, 2),
            low: cell(&record, 3),
            close: cell(&record, 4),
        });
    }

    Ok(bars)
}

impl QuotePort for CsvQuoteAdapter {
    /// Daily bars only; an intraday request reads the same daily files.
    fn history(
        &self,
        symbols: &[String],
        period: Period,
        _interval: Interval,
    ) -> FetchResult<ProviderResponse> {
        if let [symbol] = symbols {
            return self.read_symbol(symbol, period).map(ProviderResponse::Flat);
        }
        let mut groups = BTreeMap::new();
        let mut first_error = None;
        for symbol in symbols {
            match self.read_symbol(symbol, period) {
                Ok(bars) => {
                    groups.insert(symbol.clone(), bars);
                }
                Err(e) => {
                    warn!("{symbol}: history unavailable: {e}");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) if groups.is_empty() => Err(e),
            _ => Ok(ProviderResponse::Grouped(groups)),
        }
    }

    /// Files whose stem contains the query, case-insensitively.
    fn search(&self, query: &str) -> FetchResult<Vec<SymbolCandidate>> {
        let needle = query.trim().to_uppercase();
        let entries = fs::read_dir(&self.base_path).map_err(|e| FetchError::Io {
            reason: format!("failed to list {}: {}", self.base_path.display(), e),
        })?;

        let mut found: Vec<SymbolCandidate> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension()? != "csv" {
                    return None;
                }
                let stem = path.file_stem()?.to_str()?.to_uppercase();
                stem.contains(&needle).then(|| SymbolCandidate {
                    symbol: stem.clone(),
                    name: stem,
                    exchange: "CSV".to_string(),
                    instrument_type: "EQUITY".to_string(),
                })
            })
            .collect();
        found.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(found)
    }
}
