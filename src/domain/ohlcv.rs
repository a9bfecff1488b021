//! Price bar representation.

use chrono::{NaiveDate, NaiveTime};

/// One bar, uniquely identified by (symbol, date, time). Daily bars have no time.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    ///
    /// Unknown without a previous close, so the first bar of a series never has one.
    pub fn true_range(&self, prev_close: Option<f64>) -> Option<f64> {
        let prev_close = prev_close?;
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        Some(hl.max(hc).max(lc))
    }
}
