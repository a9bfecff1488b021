//! Sentiment lexicon port.

pub trait SentimentLexicon {
    /// Compound polarity of `text` in [-1, 1].
    fn compound(&self, text: &str) -> f64;
}
