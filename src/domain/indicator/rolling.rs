//! Trailing-window mean over a series with gaps.
//!
//! mean[i] = average of the known values among x[i-window+1..=i],
//! known only when at least `min_periods` of them are present.

pub fn rolling_mean(values: &[Option<f64>], window: usize, min_periods: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    let mut count = 0usize;

    for i in 0..values.len() {
        if let Some(v) = values[i] {
            sum += v;
            count += 1;
        }
        if i >= window {
            if let Some(old) = values[i - window] {
                sum -= old;
                count -= 1;
            }
        }
        if count >= min_periods.max(1) {
            out.push(Some(sum / count as f64));
        } else {
            out.push(None);
        }
    }

    out
}
