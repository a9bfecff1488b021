//! Word-valence lexicon in the VADER file format (`token<TAB>mean<TAB>...`).
//!
//! Scoring is a reduced VADER: summed token valences, with a valence flipped and
//! damped when one of the three preceding tokens is a negation, normalised by
//! `s / sqrt(s² + 15)`.

use crate::domain::error::SignalError;
use crate::ports::lexicon_port::SentimentLexicon;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const NORMALIZATION_ALPHA: f64 = 15.0;
const NEGATION_SCALAR: f64 = -0.74;
const NEGATION_WINDOW: usize = 3;

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "without", "cannot",
    "isn't", "aren't", "wasn't", "don't", "doesn't", "didn't", "won't", "ne", "pas", "jamais",
    "sans", "aucun", "aucune",
];

#[derive(Debug, Clone, Default)]
pub struct VaderLexicon {
    valences: HashMap<String, f64>,
}

impl VaderLexicon {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            valences: entries
                .into_iter()
                .map(|(w, v)| (w.into().to_lowercase(), v))
                .collect(),
        }
    }

    /// Parses lexicon text. Lines without a numeric second field are skipped.
    pub fn parse(content: &str) -> Self {
        let valences = content
            .lines()
            .filter_map(|line| {
                let mut fields = line.split('\t');
                let token = fields.next()?.trim();
                let valence: f64 = fields.next()?.trim().parse().ok()?;
                (!token.is_empty()).then(|| (token.to_lowercase(), valence))
            })
            .collect();
        Self { valences }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SignalError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SignalError::ConfigInvalid {
            section: "sentiment".to_string(),
            key: "lexicon_path".to_string(),
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        Ok(Self::parse(&content))
    }

    pub fn len(&self) -> usize {
        self.valences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valences.is_empty()
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '.' | '!' | '?' | ':' | '"' | '(' | ')'))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// VADER compound normalisation, clamped to [-1, 1].
pub fn normalize_score(sum: f64) -> f64 {
    if sum == 0.0 {
        return 0.0;
    }
    (sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
}

impl SentimentLexicon for VaderLexicon {
    fn compound(&self, text: &str) -> f64 {
        let tokens = tokenize(text);
        let mut sum = 0.0;
        for (i, token) in tokens.iter().enumerate() {
            let Some(valence) = self.valences.get(token) else {
                continue;
            };
            let negated = tokens[i.saturating_sub(NEGATION_WINDOW)..i]
                .iter()
                .any(|t| NEGATIONS.contains(&t.as_str()));
            sum += if negated { valence * NEGATION_SCALAR } else { *valence };
        }
        normalize_score(sum)
    }
}
