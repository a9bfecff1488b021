//! Index membership from Wikipedia constituent tables.

use crate::adapters::google_news_adapter::unescape_entities;
use crate::adapters::http::HttpClient;
use crate::domain::error::{FetchError, FetchResult};
use crate::domain::universe::{RawTable, Universe};
use crate::ports::membership_port::MembershipPort;
use regex::Regex;

/// Minimal HTML table reader: every `<table>`, header from the first row made of
/// `<th>` cells, data rows from the rest.
pub struct HtmlTableReader {
    table: Regex,
    row: Regex,
    cell: Regex,
    tag: Regex,
    footnote: Regex,
}

impl HtmlTableReader {
    pub fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            table: Regex::new(r"(?is)<table[^>]*>(.*?)</table>")?,
            row: Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>")?,
            cell: Regex::new(r"(?is)<(t[hd])[^>]*>(.*?)</t[hd]>")?,
            tag: Regex::new(r"(?s)<[^>]*>")?,
            footnote: Regex::new(r"\[\d+\]")?,
        })
    }

    pub fn read(&self, html: &str) -> Vec<RawTable> {
        self.table
            .captures_iter(html)
            .filter_map(|t| self.read_table(&t[1]))
            .collect()
    }

    fn read_table(&self, body: &str) -> Option<RawTable> {
        let mut headers = Vec::new();
        let mut rows = Vec::new();
        for row in self.row.captures_iter(body) {
            let cells: Vec<(bool, String)> = self
                .cell
                .captures_iter(&row[1])
                .map(|c| (c[1].eq_ignore_ascii_case("th"), self.text(&c[2])))
                .collect();
            if cells.is_empty() {
                continue;
            }
            if headers.is_empty() && rows.is_empty() && cells.iter().all(|(th, _)| *th) {
                headers = cells.into_iter().map(|(_, text)| text).collect();
            } else {
                rows.push(cells.into_iter().map(|(_, text)| text).collect());
            }
        }
        if headers.is_empty() && rows.is_empty() {
            return None;
        }
        Some(RawTable { headers, rows })
    }

    fn text(&self, cell: &str) -> String {
        let stripped = self.tag.replace_all(cell, "");
        let stripped = self.footnote.replace_all(&stripped, "");
        unescape_entities(stripped.trim())
    }
}

pub struct WikipediaMembershipAdapter {
    http: HttpClient,
    reader: HtmlTableReader,
}

impl WikipediaMembershipAdapter {
    pub fn new(http: HttpClient) -> FetchResult<Self> {
        let reader = HtmlTableReader::compile().map_err(|e| FetchError::Parse {
            reason: format!("table patterns: {}", e),
        })?;
        Ok(Self { http, reader })
    }
}

impl MembershipPort for WikipediaMembershipAdapter {
    fn tables(&self, universe: Universe) -> FetchResult<Vec<RawTable>> {
        let html = self.http.get_text(universe.source_url())?;
        Ok(self.reader.read(&html))
    }
}
