//! Cross-universe market tables, leaderboards and the aggregate market reading.

use crate::domain::indicator::{compute_snapshots, IndicatorSnapshot};
use crate::domain::period::{Interval, Period};
use crate::domain::price_table::normalize;
use crate::domain::universe::{universe_members, Universe};
use crate::ports::membership_port::MembershipPort;
use crate::ports::quote_port::QuotePort;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

pub const MARKET_TONE_THRESHOLD: f64 = 0.15;

/// Percentage-change column used for ranking and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeWindow {
    OneDay,
    SevenDays,
    ThirtyDays,
}

impl ChangeWindow {
    /// Daily history needed to make the window's change meaningful across universes.
    pub fn history_days(&self) -> u32 {
        match self {
            ChangeWindow::OneDay => 60,
            ChangeWindow::SevenDays => 90,
            ChangeWindow::ThirtyDays => 150,
        }
    }
}

impl fmt::Display for ChangeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeWindow::OneDay => f.write_str("1d"),
            ChangeWindow::SevenDays => f.write_str("7d"),
            ChangeWindow::ThirtyDays => f.write_str("30d"),
        }
    }
}

impl FromStr for ChangeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1d" | "day" => Ok(ChangeWindow::OneDay),
            "7d" | "week" => Ok(ChangeWindow::SevenDays),
            "30d" | "month" => Ok(ChangeWindow::ThirtyDays),
            other => Err(format!("unknown change window '{}' (expected 1d, 7d or 30d)", other)),
        }
    }
}

/// One member of one universe. Percentage changes are backfilled with 0 so every
/// row sorts; the untouched values stay on `snapshot`.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketRow {
    pub universe: Universe,
    pub name: Option<String>,
    pub pct_1d: f64,
    pub pct_7d: f64,
    pub pct_30d: f64,
    pub snapshot: IndicatorSnapshot,
}

impl MarketRow {
    pub fn from_snapshot(universe: Universe, name: Option<String>, snapshot: IndicatorSnapshot) -> Self {
        Self {
            universe,
            name,
            pct_1d: snapshot.pct_1d.unwrap_or(0.0),
            pct_7d: snapshot.pct_7d.unwrap_or(0.0),
            pct_30d: snapshot.pct_30d.unwrap_or(0.0),
            snapshot,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.snapshot.symbol
    }

    /// Display name, falling back to the symbol.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.snapshot.symbol)
    }

    pub fn change(&self, window: ChangeWindow) -> f64 {
        match window {
            ChangeWindow::OneDay => self.pct_1d,
            ChangeWindow::SevenDays => self.pct_7d,
            ChangeWindow::ThirtyDays => self.pct_30d,
        }
    }

    /// The change before backfilling.
    pub fn known_change(&self, window: ChangeWindow) -> Option<f64> {
        match window {
            ChangeWindow::OneDay => self.snapshot.pct_1d,
            ChangeWindow::SevenDays => self.snapshot.pct_7d,
            ChangeWindow::ThirtyDays => self.snapshot.pct_30d,
        }
    }
}

pub struct MarketAggregator<'a> {
    membership: &'a dyn MembershipPort,
    quotes: &'a dyn QuotePort,
}

impl<'a> MarketAggregator<'a> {
    pub fn new(membership: &'a dyn MembershipPort, quotes: &'a dyn QuotePort) -> Self {
        Self { membership, quotes }
    }

    /// Rows for every universe, in the order given. A universe whose membership or
    /// prices cannot be obtained contributes no rows.
    pub fn collect(&self, universes: &[Universe], period: Period) -> Vec<MarketRow> {
        universes
            .iter()
            .flat_map(|u| self.collect_universe(*u, period))
            .collect()
    }

    /// Like [`MarketAggregator::collect`] for display names; unknown names have no members.
    pub fn collect_named(&self, names: &[String], period: Period) -> Vec<MarketRow> {
        let universes: Vec<Universe> = names
            .iter()
            .filter_map(|n| match n.parse::<Universe>() {
                Ok(u) => Some(u),
                Err(e) => {
                    warn!("{e}; skipping");
                    None
                }
            })
            .collect();
        self.collect(&universes, period)
    }

    fn collect_universe(&self, universe: Universe, period: Period) -> Vec<MarketRow> {
        let tables = match self.membership.tables(universe) {
            Ok(t) => t,
            Err(e) => {
                warn!("{universe}: membership unavailable: {e}");
                return Vec::new();
            }
        };
        let members = universe_members(universe, &tables);
        if members.is_empty() {
            info!("{universe}: no members, skipped");
            return Vec::new();
        }

        let symbols: Vec<String> = members.iter().map(|m| m.ticker.clone()).collect();
        let response = match self.quotes.history(&symbols, period, Interval::Daily) {
            Ok(r) => r,
            Err(e) => {
                warn!("{universe}: price history unavailable: {e}");
                return Vec::new();
            }
        };
        let table = normalize(&symbols, response);
        debug!(
            "{universe}: {} members, {} priced",
            members.len(),
            table.symbols().len()
        );

        let names: HashMap<&str, &str> = members
            .iter()
            .map(|m| (m.ticker.as_str(), m.name.as_str()))
            .collect();

        compute_snapshots(&table)
            .into_iter()
            .map(|snap| {
                let name = names.get(snap.symbol.as_str()).map(|n| n.to_string());
                MarketRow::from_snapshot(universe, name, snap)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    Trend,
    Change(ChangeWindow),
}

impl FromStr for RankBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trend" => Ok(RankBy::Trend),
            other => other.parse().map(RankBy::Change),
        }
    }
}

fn rank_value(row: &MarketRow, by: RankBy) -> Option<f64> {
    match by {
        RankBy::Trend => row.snapshot.trend_score,
        RankBy::Change(w) => Some(row.change(w)),
    }
}

/// Best `n` rows by `by`, highest first. Rows with an unknown trend score are not ranked.
pub fn top(rows: &[MarketRow], by: RankBy, n: usize) -> Vec<&MarketRow> {
    ranked(rows, by, n, |a, b| b.total_cmp(&a))
}

/// Worst `n` rows by `by`, lowest first.
pub fn bottom(rows: &[MarketRow], by: RankBy, n: usize) -> Vec<&MarketRow> {
    ranked(rows, by, n, |a, b| a.total_cmp(&b))
}

fn ranked<F>(rows: &[MarketRow], by: RankBy, n: usize, cmp: F) -> Vec<&MarketRow>
where
    F: Fn(f64, f64) -> Ordering,
{
    let mut scored: Vec<(f64, &MarketRow)> = rows
        .iter()
        .filter_map(|r| rank_value(r, by).map(|v| (v, r)))
        .collect();
    scored.sort_by(|(va, ra), (vb, rb)| cmp(*va, *vb).then_with(|| ra.symbol().cmp(rb.symbol())));
    scored.into_iter().take(n).map(|(_, r)| r).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketTone {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for MarketTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketTone::Bullish => f.write_str("bullish"),
            MarketTone::Bearish => f.write_str("bearish"),
            MarketTone::Neutral => f.write_str("neutral"),
        }
    }
}

/// Aggregate reading of a market table over one change window. Percentages are
/// in points (a change of 0.012 counts as 1.2).
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSummary {
    pub window: ChangeWindow,
    pub mean_pct: f64,
    pub up: usize,
    pub down: usize,
    pub tone: MarketTone,
    /// Sample standard deviation of the changes, in points.
    pub dispersion: f64,
    pub per_universe: Vec<(Universe, f64)>,
}

impl MarketSummary {
    /// `None` when no row has a known change for `window`.
    pub fn from_rows(rows: &[MarketRow], window: ChangeWindow) -> Option<Self> {
        let known: Vec<(Universe, f64)> = rows
            .iter()
            .filter_map(|r| r.known_change(window).map(|c| (r.universe, c)))
            .collect();
        if known.is_empty() {
            return None;
        }

        let n = known.len() as f64;
        let mean = known.iter().map(|(_, c)| c).sum::<f64>() / n;
        let dispersion = if known.len() > 1 {
            let ss: f64 = known.iter().map(|(_, c)| (c - mean).powi(2)).sum();
            (ss / (n - 1.0)).sqrt() * 100.0
        } else {
            0.0
        };

        let mean_pct = mean * 100.0;
        let tone = if mean_pct > MARKET_TONE_THRESHOLD {
            MarketTone::Bullish
        } else if mean_pct < -MARKET_TONE_THRESHOLD {
            MarketTone::Bearish
        } else {
            MarketTone::Neutral
        };

        let mut groups: BTreeMap<Universe, (f64, usize)> = BTreeMap::new();
        for (u, c) in &known {
            let e = groups.entry(*u).or_insert((0.0, 0));
            e.0 += c;
            e.1 += 1;
        }

        Some(Self {
            window,
            mean_pct,
            up: known.iter().filter(|(_, c)| *c > 0.0).count(),
            down: known.iter().filter(|(_, c)| *c < 0.0).count(),
            tone,
            dispersion,
            per_universe: groups
                .into_iter()
                .map(|(u, (sum, count))| (u, sum / count as f64 * 100.0))
                .collect(),
        })
    }

    /// One-line market reading. A directional call needs a mean beyond ±0.2 points
    /// and a majority moving the same way.
    pub fn reading(&self) -> &'static str {
        if self.mean_pct > 0.2 && self.up > self.down {
            "bullish tone, carried by large caps and tech"
        } else if self.mean_pct < -0.2 && self.down > self.up {
            "bearish tone, weighed down by rate and earnings worries"
        } else {
            "neutral or consolidating market with moderate sector rotation"
        }
    }
}
