//! Recommendation classifier and entry/target/stop price levels.
//!
//! The classifier is a fixed scoring rule: trend (close against MA20/MA50), an
//! optional cost-basis term for held positions, and a volatility term (ATR/close
//! against the profile's `vol_max`). Thresholds are strict comparisons.

use crate::domain::indicator::IndicatorSnapshot;
use crate::domain::risk_profile::RiskProfile;
use std::fmt;

/// ATR/close assumed when either is unknown.
pub const FALLBACK_VOLATILITY: f64 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Buy,
    Hold,
    Sell,
    Avoid,
    Watch,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Decision::Buy => "Buy",
            Decision::Hold => "Hold",
            Decision::Sell => "Sell",
            Decision::Avoid => "Avoid",
            Decision::Watch => "Watch",
        };
        f.write_str(s)
    }
}

/// Position context for a classification.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Holding {
    pub held: bool,
    /// Average purchase price (PRU); only read when `held`.
    pub cost_basis: Option<f64>,
}

impl Holding {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn held(cost_basis: Option<f64>) -> Self {
        Self {
            held: true,
            cost_basis,
        }
    }
}

/// Volatility proxy: ATR14 / close, or [`FALLBACK_VOLATILITY`].
pub fn volatility(snapshot: &IndicatorSnapshot) -> f64 {
    match (snapshot.atr14, snapshot.close) {
        (Some(atr), Some(close)) if close > 0.0 => atr / close,
        _ => FALLBACK_VOLATILITY,
    }
}

/// Number of known moving averages the close sits at or above (0..=2).
pub fn trend_count(snapshot: &IndicatorSnapshot) -> u8 {
    let Some(close) = snapshot.close else {
        return 0;
    };
    [snapshot.ma20, snapshot.ma50]
        .iter()
        .filter(|ma| matches!(ma, Some(m) if close >= *m))
        .count() as u8
}

/// Raw score before thresholding, or `None` when the close is unknown.
pub fn score(snapshot: &IndicatorSnapshot, holding: Holding, vol_max: f64) -> Option<f64> {
    let close = snapshot.close?;

    let mut score = 0.5
        * match trend_count(snapshot) {
            2 => 1.0,
            1 => 0.0,
            _ => -1.0,
        };

    if holding.held {
        if let Some(basis) = holding.cost_basis.filter(|b| *b > 0.0) {
            score += 0.2
                * if close > basis * 1.02 {
                    1.0
                } else if close < basis * 0.98 {
                    -1.0
                } else {
                    0.0
                };
        }
    }

    score += 0.3 * if volatility(snapshot) > vol_max { -1.0 } else { 1.0 };
    Some(score)
}

/// Maps a snapshot to a recommendation. Pure: identical inputs give identical labels.
pub fn classify(snapshot: &IndicatorSnapshot, holding: Holding, vol_max: f64) -> Decision {
    let Some(score) = score(snapshot, holding, vol_max) else {
        return Decision::Watch;
    };

    if holding.held {
        if score > 0.5 {
            Decision::Buy
        } else if score < -0.2 {
            Decision::Sell
        } else {
            Decision::Hold
        }
    } else if score > 0.3 {
        Decision::Buy
    } else if score < -0.2 {
        Decision::Avoid
    } else {
        Decision::Watch
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceLevels {
    pub entry: f64,
    pub target: f64,
    pub stop: f64,
}

/// Rounds to cents, half-cent ties to the even cent.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

/// Entry/target/stop from MA20 (or the close when MA20 is unknown), scaled by the
/// profile multipliers and rounded to cents. `None` when neither base is known.
pub fn price_levels(snapshot: &IndicatorSnapshot, profile: &RiskProfile) -> Option<PriceLevels> {
    let base = snapshot.ma20.or(snapshot.close)?;
    Some(PriceLevels {
        entry: round2(base * profile.entry_mult),
        target: round2(base * profile.target_mult),
        stop: round2(base * profile.stop_mult),
    })
}
