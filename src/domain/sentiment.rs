//! Headline sentiment: per-title lexicon score plus a keyword bonus, averaged into
//! a numeric score and a short narrative.
//!
//! Each headline scores `compound(title) + 0.2·[positive keyword] − 0.2·[negative keyword]`.
//! The mean over the fetched titles (at most [`MAX_HEADLINES`] by default) decides
//! the tone: above 0.15 positive, below −0.15 negative, otherwise neutral. Without
//! a lexicon the compound part is 0.

use crate::domain::error::FetchResult;
use crate::ports::lexicon_port::SentimentLexicon;
use crate::ports::news_port::NewsPort;
use chrono::NaiveDate;
use std::fmt;
use tracing::{debug, warn};

pub const MAX_HEADLINES: usize = 6;
pub const KEYWORD_BONUS: f64 = 0.2;
pub const TONE_THRESHOLD: f64 = 0.15;

const POSITIVE_KEYWORDS: &[&str] = &[
    "résultats",
    "bénéfice",
    "contrat",
    "relève",
    "guidance",
    "record",
    "upgrade",
    "partenariat",
    "dividende",
    "approbation",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "profit warning",
    "retard",
    "procès",
    "amende",
    "downgrade",
    "abaisse",
    "enquête",
    "rappel",
    "départ",
    "incident",
];

#[derive(Debug, Clone, PartialEq)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub published: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
    NoNews,
}

impl Tone {
    pub fn from_mean(mean: f64) -> Self {
        if mean > TONE_THRESHOLD {
            Tone::Positive
        } else if mean < -TONE_THRESHOLD {
            Tone::Negative
        } else {
            Tone::Neutral
        }
    }

    pub fn narrative(&self) -> &'static str {
        match self {
            Tone::Positive => "Move supported by positive news.",
            Tone::Negative => "Move pressured by negative news.",
            Tone::Neutral => "Mixed or neutral news; the move looks mostly technical.",
            Tone::NoNews => "No salient news; technical or macro move.",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.narrative())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentimentResult {
    pub tone: Tone,
    pub score: f64,
    pub items: Vec<NewsItem>,
}

impl SentimentResult {
    pub fn narrative(&self) -> &'static str {
        self.tone.narrative()
    }
}

/// +0.2 for any positive keyword, −0.2 for any negative keyword (both may apply).
pub fn keyword_bonus(title: &str) -> f64 {
    let lower = title.to_lowercase();
    let mut bonus = 0.0;
    if POSITIVE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        bonus += KEYWORD_BONUS;
    }
    if NEGATIVE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        bonus -= KEYWORD_BONUS;
    }
    bonus
}

pub fn headline_score(title: &str, lexicon: Option<&dyn SentimentLexicon>) -> f64 {
    let base = lexicon.map_or(0.0, |lx| lx.compound(&title.to_lowercase()));
    base + keyword_bonus(title)
}

/// Scores already-fetched headlines.
pub fn score_headlines(items: Vec<NewsItem>, lexicon: Option<&dyn SentimentLexicon>) -> SentimentResult {
    if items.is_empty() {
        return SentimentResult {
            tone: Tone::NoNews,
            score: 0.0,
            items,
        };
    }

    let total: f64 = items.iter().map(|it| headline_score(&it.title, lexicon)).sum();
    let mean = total / items.len() as f64;
    SentimentResult {
        tone: Tone::from_mean(mean),
        score: mean,
        items,
    }
}

pub struct NewsSentimentAggregator<'a> {
    news: &'a dyn NewsPort,
    lexicon: Option<&'a dyn SentimentLexicon>,
    lang: String,
    limit: usize,
}

impl<'a> NewsSentimentAggregator<'a> {
    pub fn new(news: &'a dyn NewsPort, lexicon: Option<&'a dyn SentimentLexicon>, lang: &str) -> Self {
        Self {
            news,
            lexicon,
            lang: lang.to_string(),
            limit: MAX_HEADLINES,
        }
    }

    /// Headlines fetched and scored per query.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Headlines for `"{name} {symbol}"`, falling back to `name` alone when the
    /// combined query finds nothing. Fetch failures count as no headlines.
    pub fn summarize(&self, name: &str, symbol: Option<&str>) -> SentimentResult {
        let name = name.trim();
        let combined = match symbol.map(str::trim).filter(|s| !s.is_empty()) {
            Some(sym) if !name.is_empty() => format!("{} {}", name, sym),
            Some(sym) => sym.to_string(),
            None => name.to_string(),
        };

        let mut items = self.fetch(&combined);
        if items.is_empty() && !name.is_empty() && combined != name {
            debug!("no headlines for '{combined}', retrying with '{name}'");
            items = self.fetch(name);
        }
        score_headlines(items, self.lexicon)
    }

    fn fetch(&self, query: &str) -> Vec<NewsItem> {
        if query.is_empty() {
            return Vec::new();
        }
        let result: FetchResult<Vec<NewsItem>> = self.news.headlines(query, &self.lang, self.limit);
        match result {
            Ok(mut items) => {
                items.truncate(self.limit);
                items
            }
            Err(e) => {
                warn!("headline fetch for '{query}' failed: {e}");
                Vec::new()
            }
        }
    }
}

pub const FLASH_ITEMS: usize = 5;

/// Market regions covered by the headline flash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Europe,
    UnitedStates,
}

impl Region {
    pub const ALL: [Region; 2] = [Region::Europe, Region::UnitedStates];

    pub fn query(&self) -> &'static str {
        match self {
            Region::Europe => "marché actions europe",
            Region::UnitedStates => "stock market us",
        }
    }

    pub fn lang(&self) -> &'static str {
        match self {
            Region::Europe => "fr",
            Region::UnitedStates => "en",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Europe => f.write_str("Europe"),
            Region::UnitedStates => f.write_str("United States"),
        }
    }
}

/// Latest market headlines for a region. A failed fetch gives an empty flash.
pub fn regional_flash(news: &dyn NewsPort, region: Region) -> Vec<NewsItem> {
    match news.headlines(region.query(), region.lang(), FLASH_ITEMS) {
        Ok(mut items) => {
            items.truncate(FLASH_ITEMS);
            items
        }
        Err(e) => {
            warn!("{region} flash unavailable: {e}");
            Vec::new()
        }
    }
}
