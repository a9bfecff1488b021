//! Blocking HTTP plumbing shared by the network adapters.

use crate::domain::error::{FetchError, FetchResult};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Client with a fixed per-request timeout and a browser user agent. No retries.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout_secs: u64,
}

impl HttpClient {
    pub fn new(timeout_secs: u64, user_agent: &str) -> FetchResult<Self> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT));
        headers.insert(USER_AGENT, agent);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| FetchError::Network {
                reason: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            timeout_secs,
        })
    }

    /// Body of a successful GET. Non-2xx statuses become [`FetchError::Http`].
    pub fn get_text(&self, url: &str) -> FetchResult<String> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                endpoint: endpoint_of(url),
            });
        }

        response.text().map_err(|e| self.transport_error(e))
    }

    pub fn get_json(&self, url: &str) -> FetchResult<serde_json::Value> {
        let body = self.get_text(url)?;
        serde_json::from_str(&body).map_err(|e| FetchError::Parse {
            reason: format!("invalid JSON from {}: {}", endpoint_of(url), e),
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                seconds: self.timeout_secs,
            }
        } else {
            FetchError::Network {
                reason: e.to_string(),
            }
        }
    }
}

/// URL without its query string, for error messages.
pub fn endpoint_of(url: &str) -> String {
    url.split('?').next().unwrap_or(url).to_string()
}
