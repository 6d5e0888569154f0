//! HTTP transport for the ESV passage endpoints

use reqwest::header::AUTHORIZATION;
use std::time::Duration;
use tracing::debug;

/// The four passage API endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Text,
    Html,
    Audio,
    Search,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Text => "text",
            Endpoint::Html => "html",
            Endpoint::Audio => "audio",
            Endpoint::Search => "search",
        }
    }

    /// Audio answers with a redirect to the mp3; only the final URL matters.
    fn wants_body(self) -> bool {
        !matches!(self, Endpoint::Audio)
    }
}

/// What a successful GET produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportResponse {
    /// Final URL after redirects.
    pub url: String,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("unreadable response body: {0}")]
    Body(String),
}

impl TransportError {
    /// Upstream is rate limiting or temporarily overloaded (429/503).
    pub fn is_throttled(&self) -> bool {
        matches!(self, TransportError::Status { status: 429 | 503, .. })
    }
}

/// Blocking GET against one of the passage endpoints.
///
/// The query modes only ever talk to this trait, so tests can swap in a
/// recording fake.
pub trait Transport {
    fn get(
        &self,
        endpoint: Endpoint,
        params: &[(&str, String)],
    ) -> Result<TransportResponse, TransportError>;
}

pub struct HttpTransport {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Connection(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }
}

impl Transport for HttpTransport {
    fn get(
        &self,
        endpoint: Endpoint,
        params: &[(&str, String)],
    ) -> Result<TransportResponse, TransportError> {
        let url = format!("{}/{}/", self.base_url, endpoint.path());
        debug!(url = %url, "GET");

        let resp = self
            .client
            .get(&url)
            .query(params)
            .header(AUTHORIZATION, format!("Token {}", self.api_key))
            .send()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let status = resp.status();
        let final_url = resp.url().to_string();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: final_url,
            });
        }

        let body = if endpoint.wants_body() {
            resp.text().map_err(|e| TransportError::Body(e.to_string()))?
        } else {
            String::new()
        };

        Ok(TransportResponse {
            url: final_url,
            body,
        })
    }
}
