//! True range and simple-average ATR.
//!
//! TR[0] is unknown (no previous close); ATR is the rolling mean of the known TR values.

use crate::domain::indicator::rolling::rolling_mean;
use crate::domain::ohlcv::PriceBar;

pub fn true_range_series(bars: &[PriceBar]) -> Vec<Option<f64>> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let prev_close = i.checked_sub(1).map(|p| bars[p].close);
            bar.true_range(prev_close)
        })
        .collect()
}

pub fn calc_atr(bars: &[PriceBar], window: usize, min_periods: usize) -> Vec<Option<f64>> {
    rolling_mean(&true_range_series(bars), window, min_periods)
}
