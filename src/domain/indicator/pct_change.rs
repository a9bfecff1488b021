//! Percentage change over k bars.
//!
//! pct[i] = C[i] / C[i-k] - 1
//! Unknown for the first k bars and when C[i-k] == 0.

use crate::domain::ohlcv::PriceBar;

pub fn calc_pct_change(bars: &[PriceBar], k: usize) -> Vec<Option<f64>> {
    (0..bars.len())
        .map(|i| {
            let base = bars[i.checked_sub(k)?].close;
            if k == 0 || base == 0.0 {
                None
            } else {
                Some(bars[i].close / base - 1.0)
            }
        })
        .collect()
}
