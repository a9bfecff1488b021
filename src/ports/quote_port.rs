//! Quote history and symbol search port.

use crate::domain::error::FetchResult;
use crate::domain::period::{Interval, Period};
use crate::domain::price_table::ProviderResponse;
use crate::domain::resolver::SymbolCandidate;

pub trait QuotePort {
    /// OHLC bars for `symbols` over `period`. A single-symbol request may come back
    /// in the flat shape; multi-symbol requests come back grouped.
    fn history(
        &self,
        symbols: &[String],
        period: Period,
        interval: Interval,
    ) -> FetchResult<ProviderResponse>;

    /// Free-text instrument search.
    fn search(&self, query: &str) -> FetchResult<Vec<SymbolCandidate>>;
}
