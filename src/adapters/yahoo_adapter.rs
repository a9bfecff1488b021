//! Yahoo Finance quote adapter: chart endpoint for history, search endpoint for
//! disambiguation.

use crate::adapters::http::HttpClient;
use crate::domain::error::{FetchError, FetchResult};
use crate::domain::period::{Interval, Period};
use crate::domain::price_table::{ProviderResponse, RawBar};
use crate::domain::resolver::SymbolCandidate;
use crate::ports::quote_port::QuotePort;
use chrono::{NaiveTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const SEARCH_URL: &str = "https://query1.finance.yahoo.com/v1/finance/search";

pub struct YahooQuoteAdapter {
    http: HttpClient,
}

impl YahooQuoteAdapter {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    fn chart_url(symbol: &str, period: Period, interval: Interval) -> String {
        let now = Utc::now();
        let start = period
            .start_date(now.date_naive())
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp();
        format!(
            "{}/{}?period1={}&period2={}&interval={}",
            CHART_URL,
            urlencoding::encode(symbol),
            start,
            now.timestamp(),
            interval.as_str()
        )
    }

    fn fetch_symbol(&self, symbol: &str, period: Period, interval: Interval) -> FetchResult<Vec<RawBar>> {
        let url = Self::chart_url(symbol, period, interval);
        match self.http.get_json(&url) {
            Ok(data) => parse_chart(&data, interval),
            // unknown symbols answer 404 with a chart error body
            Err(FetchError::Http { status: 404, .. }) => {
                debug!("{symbol}: not listed");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}

impl QuotePort for YahooQuoteAdapter {
    fn history(
        &self,
        symbols: &[String],
        period: Period,
        interval: Interval,
    ) -> FetchResult<ProviderResponse> {
        if let [symbol] = symbols {
            return self.fetch_symbol(symbol, period, interval).map(ProviderResponse::Flat);
        }

        let mut groups = BTreeMap::new();
        let mut first_error = None;
        for symbol in symbols {
            match self.fetch_symbol(symbol, period, interval) {
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

    fn search(&self, query: &str) -> FetchResult<Vec<SymbolCandidate>> {
        let url = format!(
            "{}?q={}&quotesCount=10&newsCount=0",
            SEARCH_URL,
            urlencoding::encode(query)
        );
        let body = self.http.get_text(&url)?;
        parse_search(&body)
    }
}

/// Bars from a chart response. A `chart.error` object is reported as a parse
/// failure; null prices are kept as unknown. Timestamps are shifted to exchange
/// time with `meta.gmtoffset`; intraday bars keep their time of day.
pub fn parse_chart(data: &Value, interval: Interval) -> FetchResult<Vec<RawBar>> {
    let chart = data.get("chart").ok_or_else(|| FetchError::Parse {
        reason: "missing chart object".into(),
    })?;

    if let Some(error) = chart.get("error").and_then(|e| e.as_object()) {
        let code = error.get("code").and_then(|c| c.as_str()).unwrap_or("unknown");
        let desc = error
            .get("description")
            .and_then(|d| d.as_str())
            .unwrap_or("no description");
        return Err(FetchError::Parse {
            reason: format!("chart error {}: {}", code, desc),
        });
    }

    let Some(result) = chart.get("result").and_then(|r| r.get(0)) else {
        return Ok(Vec::new());
    };
    // no trading in the window: the result has no timestamp array
    let Some(timestamps) = result.get("timestamp").and_then(|t| t.as_array()) else {
        return Ok(Vec::new());
    };

    let quote = result
        .get("indicators")
        .and_then(|i| i.get("quote"))
        .and_then(|q| q.get(0));
    let column = |name: &str| quote.and_then(|q| q.get(name)).and_then(|c| c.as_array());
    let (opens, highs, lows, closes) = (column("open"), column("high"), column("low"), column("close"));
    let at = |col: Option<&Vec<Value>>, i: usize| col.and_then(|c| c.get(i)).and_then(|v| v.as_f64());

    let offset = result
        .get("meta")
        .and_then(|m| m.get("gmtoffset"))
        .and_then(|o| o.as_i64())
        .unwrap_or(0);

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(local) = ts
            .as_i64()
            .and_then(|t| chrono::DateTime::from_timestamp(t + offset, 0))
            .map(|dt| dt.naive_utc())
        else {
            continue;
        };
        bars.push(RawBar {
            date: local.date(),
            time: (interval == Interval::FiveMinutes).then(|| local.time()),
            open: at(opens, i),
            high: at(highs, i),
            low: at(lows, i),
            close: at(closes, i),
        });
    }
    Ok(bars)
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    quotes: Option<Vec<SearchQuote>>,
}

#[derive(Debug, Deserialize)]
struct SearchQuote {
    symbol: String,
    shortname: Option<String>,
    longname: Option<String>,
    #[serde(rename = "exchDisp")]
    exch_disp: Option<String>,
    exchange: Option<String>,
    #[serde(rename = "quoteType")]
    quote_type: Option<String>,
}

pub fn parse_search(body: &str) -> FetchResult<Vec<SymbolCandidate>> {
    let data: SearchResponse = serde_json::from_str(body).map_err(|e| FetchError::Parse {
        reason: format!("invalid search response: {}", e),
    })?;

    Ok(data
        .quotes
        .unwrap_or_default()
        .into_iter()
        .map(|q| SymbolCandidate {
            symbol: q.symbol,
            name: q.longname.or(q.shortname).unwrap_or_default(),
            exchange: q.exch_disp.or(q.exchange).unwrap_or_default(),
            instrument_type: q.quote_type.unwrap_or_else(|| "EQUITY".to_string()),
        })
        .collect())
}
