//! Headline feed port.

use crate::domain::error::FetchResult;
use crate::domain::sentiment::NewsItem;

pub trait NewsPort {
    /// At most `limit` headlines for `query`, newest first as the feed orders them.
    fn headlines(&self, query: &str, lang: &str, limit: usize) -> FetchResult<Vec<NewsItem>>;
}
