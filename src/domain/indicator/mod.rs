//! Indicator engine.
//!
//! Per symbol, on date-ordered bars:
//! - `ATR14`: rolling mean of true range over 14 bars, at least 5 known values
//! - `MA20` / `MA50`: rolling mean of close over 20 / 50 bars, at least 5 / 10 values
//! - `gap20` / `gap50`: `close / MA - 1`, unknown when the MA is unknown or zero
//! - `trend_score`: `0.6 * gap20 + 0.4 * gap50`
//! - `pct_1d` / `pct_7d` / `pct_30d`: change over 1 / 7 / 30 bars
//!
//! Fields that cannot be computed are `None`, never a placeholder number.

pub mod atr;
pub mod pct_change;
pub mod rolling;

use crate::domain::ohlcv::PriceBar;
use crate::domain::price_table::PriceTable;
use atr::calc_atr;
use chrono::NaiveDate;
use pct_change::calc_pct_change;
use rolling::rolling_mean;

pub const ATR_WINDOW: usize = 14;
pub const ATR_MIN_PERIODS: usize = 5;
pub const MA20_WINDOW: usize = 20;
pub const MA20_MIN_PERIODS: usize = 5;
pub const MA50_WINDOW: usize = 50;
pub const MA50_MIN_PERIODS: usize = 10;

/// Indicators for a single bar of a symbol's history.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub close: f64,
    pub atr14: Option<f64>,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
}

/// The derived state of a symbol at its most recent bar.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndicatorSnapshot {
    pub symbol: String,
    pub asof: Option<NaiveDate>,
    pub close: Option<f64>,
    pub atr14: Option<f64>,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
    pub gap20: Option<f64>,
    pub gap50: Option<f64>,
    pub trend_score: Option<f64>,
    pub pct_1d: Option<f64>,
    pub pct_7d: Option<f64>,
    pub pct_30d: Option<f64>,
}

impl IndicatorSnapshot {
    /// A snapshot carrying only a last price, for callers without enough history.
    pub fn from_close(symbol: &str, close: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            close: Some(close).filter(|c| c.is_finite()),
            ..Self::default()
        }
    }
}

/// `close / ma - 1`
pub fn gap(close: Option<f64>, ma: Option<f64>) -> Option<f64> {
    match (close, ma) {
        (Some(c), Some(m)) if m != 0.0 => Some(c / m - 1.0),
        _ => None,
    }
}

pub fn trend_score(gap20: Option<f64>, gap50: Option<f64>) -> Option<f64> {
    Some(0.6 * gap20? + 0.4 * gap50?)
}

/// Per-bar indicator rows for one symbol. `bars` must be date-ordered.
pub fn compute_series(bars: &[PriceBar]) -> Vec<IndicatorRow> {
    let closes: Vec<Option<f64>> = bars.iter().map(|b| Some(b.close)).collect();
    let atr14 = calc_atr(bars, ATR_WINDOW, ATR_MIN_PERIODS);
    let ma20 = rolling_mean(&closes, MA20_WINDOW, MA20_MIN_PERIODS);
    let ma50 = rolling_mean(&closes, MA50_WINDOW, MA50_MIN_PERIODS);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| IndicatorRow {
            date: bar.date,
            close: bar.close,
            atr14: atr14[i],
            ma20: ma20[i],
            ma50: ma50[i],
        })
        .collect()
}

/// Snapshot of one symbol's most recent bar, or `None` for an empty series.
pub fn compute_snapshot(symbol: &str, bars: &[PriceBar]) -> Option<IndicatorSnapshot> {
    let last = compute_series(bars).pop()?;
    let last_of = |series: Vec<Option<f64>>| series.last().copied().flatten();

    let close = Some(last.close);
    let gap20 = gap(close, last.ma20);
    let gap50 = gap(close, last.ma50);

    Some(IndicatorSnapshot {
        symbol: symbol.to_string(),
        asof: Some(last.date),
        close,
        atr14: last.atr14,
        ma20: last.ma20,
        ma50: last.ma50,
        gap20,
        gap50,
        trend_score: trend_score(gap20, gap50),
        pct_1d: last_of(calc_pct_change(bars, 1)),
        pct_7d: last_of(calc_pct_change(bars, 7)),
        pct_30d: last_of(calc_pct_change(bars, 30)),
    })
}

/// One snapshot per symbol in the table, in symbol order. An empty table gives
/// an empty result.
pub fn compute_snapshots(table: &PriceTable) -> Vec<IndicatorSnapshot> {
    table
        .by_symbol()
        .filter_map(|(symbol, bars)| compute_snapshot(symbol, bars))
        .collect()
}
