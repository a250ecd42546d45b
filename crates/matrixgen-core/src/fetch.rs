//! Raw-content fetching over HTTP.
//!
//! The pipeline never talks to `reqwest` directly: everything that needs a
//! remote document goes through [`ContentFetcher`], so tests substitute the
//! in-memory fake from [`crate::fakes`] and a bounded fan-out can be applied
//! by the caller.

use async_trait::async_trait;

use crate::error::MatrixError;

/// Outcome of fetching one text document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchedText {
    /// Success with a body that decoded as UTF-8.
    Found(String),

    /// Success, but the body is not text.
    Undecodable,

    /// 404.
    NotFound,

    /// Any other non-success status.
    Failed { status: u16 },
}

/// Fetches a text document at a URL.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// GET `url` and classify the response.
    ///
    /// Transport failures (DNS, TLS, connection reset) surface as `Err`;
    /// HTTP-level outcomes are the `Ok` variants.
    async fn fetch_text(&self, url: &str) -> Result<FetchedText, MatrixError>;
}

/// `reqwest`-backed fetcher used by the real pipeline.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with a fresh connection pool.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("matrixgen/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        HttpFetcher { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<FetchedText, MatrixError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(FetchedText::NotFound);
        }
        if !status.is_success() {
            return Ok(FetchedText::Failed {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        match String::from_utf8(body.to_vec()) {
            Ok(text) => Ok(FetchedText::Found(text)),
            Err(_) => Ok(FetchedText::Undecodable),
        }
    }
}
