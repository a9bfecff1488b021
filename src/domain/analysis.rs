//! Single-instrument analysis: resolve, fetch, indicators, recommendation,
//! price levels and headline sentiment in one report.

use crate::domain::decision::{classify, price_levels, score, Decision, Holding, PriceLevels};
use crate::domain::error::SignalError;
use crate::domain::indicator::{compute_snapshot, IndicatorSnapshot};
use crate::domain::period::Horizon;
use crate::domain::price_table::{normalize, PriceTable};
use crate::domain::resolver::{IdentifierResolver, Resolution};
use crate::domain::risk_profile::RiskProfile;
use crate::domain::sentiment::{NewsSentimentAggregator, SentimentResult};
use crate::ports::quote_port::QuotePort;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub identifier: String,
    pub horizon: Horizon,
    pub holding: Holding,
    pub profile: RiskProfile,
}

#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub identifier: String,
    pub resolution: Resolution,
    pub horizon: Horizon,
    pub bars: usize,
    pub snapshot: IndicatorSnapshot,
    pub score: Option<f64>,
    pub decision: Decision,
    pub levels: Option<PriceLevels>,
    pub sentiment: SentimentResult,
}

/// Daily or intraday history for one symbol over a horizon. The one-day horizon
/// retries with daily bars when the intraday request comes back empty or fails.
pub fn horizon_history(
    quotes: &dyn QuotePort,
    symbol: &str,
    horizon: Horizon,
) -> Result<PriceTable, SignalError> {
    let requested = [symbol.to_string()];
    let (period, interval) = horizon.request();

    let first = quotes
        .history(&requested, period, interval)
        .map(|r| normalize(&requested, r));

    let table = match (first, horizon.fallback()) {
        (Ok(table), _) if !table.is_empty() => table,
        (first, Some((period, interval))) => {
            if let Err(e) = &first {
                debug!("{symbol}: {horizon} request failed ({e}), falling back");
            }
            info!("{symbol}: no {horizon} bars, retrying {period} at {}", interval.as_str());
            normalize(&requested, quotes.history(&requested, period, interval)?)
        }
        (first, None) => first?,
    };

    if table.is_empty() {
        return Err(SignalError::NoData {
            symbol: symbol.to_string(),
        });
    }
    Ok(table)
}

pub fn analyze(
    resolver: &mut IdentifierResolver<'_>,
    quotes: &dyn QuotePort,
    news: &NewsSentimentAggregator<'_>,
    request: &AnalysisRequest,
) -> Result<AnalysisReport, SignalError> {
    let resolution = resolver
        .resolve(&request.identifier)
        .ok_or_else(|| SignalError::Unresolved {
            identifier: request.identifier.trim().to_string(),
        })?;
    let symbol = resolution.symbol.clone();

    let table = horizon_history(quotes, &symbol, request.horizon)?;
    let bars = table.series(&symbol);
    let snapshot = compute_snapshot(&symbol, bars).ok_or_else(|| SignalError::NoData {
        symbol: symbol.clone(),
    })?;

    let vol_max = request.profile.vol_max;
    let name = request.identifier.trim();
    let sentiment = if name.eq_ignore_ascii_case(&symbol) {
        news.summarize(&symbol, None)
    } else {
        news.summarize(name, Some(&symbol))
    };

    Ok(AnalysisReport {
        identifier: request.identifier.clone(),
        bars: bars.len(),
        score: score(&snapshot, request.holding, vol_max),
        decision: classify(&snapshot, request.holding, vol_max),
        levels: price_levels(&snapshot, &request.profile),
        horizon: request.horizon,
        resolution,
        snapshot,
        sentiment,
    })
}
