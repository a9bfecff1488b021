//! Google News RSS headline adapter.

use crate::adapters::http::HttpClient;
use crate::domain::error::{FetchError, FetchResult};
use crate::domain::sentiment::NewsItem;
use crate::ports::news_port::NewsPort;
use chrono::DateTime;
use regex::Regex;

const RSS_URL: &str = "https://news.google.com/rss/search";

/// Compiled patterns for the handful of RSS elements read.
pub struct RssPatterns {
    item: Regex,
    title: Regex,
    link: Regex,
    pub_date: Regex,
}

impl RssPatterns {
    pub fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            item: Regex::new(r"(?s)<item>(.*?)</item>")?,
            title: Regex::new(r"(?s)<title><!\[CDATA\[(.*?)\]\]></title>|<title>(.*?)</title>")?,
            link: Regex::new(r"(?s)<link>(.*?)</link>")?,
            pub_date: Regex::new(r"<pubDate>(.*?)</pubDate>")?,
        })
    }

    /// Items carrying both a title and a link, in feed order, at most `limit`.
    pub fn parse(&self, xml: &str, limit: usize) -> Vec<NewsItem> {
        let mut out = Vec::new();
        for cap in self.item.captures_iter(xml) {
            if out.len() >= limit {
                break;
            }
            let body = &cap[1];
            let title = self
                .title
                .captures(body)
                .and_then(|c| c.get(1).or_else(|| c.get(2)))
                .map(|m| unescape_entities(m.as_str().trim()))
                .unwrap_or_default();
            let link = self
                .link
                .captures(body)
                .map(|c| c[1].trim().to_string())
                .unwrap_or_default();
            if title.is_empty() || link.is_empty() {
                continue;
            }
            let published = self
                .pub_date
                .captures(body)
                .and_then(|c| DateTime::parse_from_rfc2822(c[1].trim()).ok())
                .map(|dt| dt.date_naive());
            out.push(NewsItem {
                title,
                link,
                published,
            });
        }
        out
    }
}

pub struct GoogleNewsAdapter {
    http: HttpClient,
    patterns: RssPatterns,
}

impl GoogleNewsAdapter {
    pub fn new(http: HttpClient) -> FetchResult<Self> {
        let patterns = RssPatterns::compile().map_err(|e| FetchError::Parse {
            reason: format!("RSS patterns: {}", e),
        })?;
        Ok(Self { http, patterns })
    }
}

/// Search URL localised by `lang` (`fr` → `hl=fr-FR&gl=FR&ceid=FR:FR`).
pub fn search_url(query: &str, lang: &str) -> String {
    let lang = lang.trim().to_lowercase();
    let region = lang.to_uppercase();
    format!(
        "{}?q={}&hl={}-{}&gl={}&ceid={}:{}",
        RSS_URL,
        urlencoding::encode(query),
        lang,
        region,
        region,
        region,
        region
    )
}

impl NewsPort for GoogleNewsAdapter {
    fn headlines(&self, query: &str, lang: &str, limit: usize) -> FetchResult<Vec<NewsItem>> {
        let xml = self.http.get_text(&search_url(query, lang))?;
        Ok(self.patterns.parse(&xml, limit))
    }
}

/// Decodes the XML/HTML entities that show up in feed titles.
pub fn unescape_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|end| *end <= 10)
            .and_then(|end| decode_entity(&tail[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}
