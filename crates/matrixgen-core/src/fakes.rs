//! In-memory fakes for the network traits (testing only)
//!
//! Provides `StaticContentFetcher` and `StaticPullRequestApi` that satisfy
//! the trait contracts without touching the network.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::MatrixError;
use crate::fetch::{ContentFetcher, FetchedText};
use crate::github::{HeadRepo, PullRequest, PullRequestApi, PullRequestHead};

// ---------------------------------------------------------------------------
// StaticContentFetcher
// ---------------------------------------------------------------------------

/// Fetcher backed by a URL → outcome map; unregistered URLs are 404s.
#[derive(Debug, Default)]
pub struct StaticContentFetcher {
    responses: Mutex<HashMap<String, FetchedText>>,
}

impl StaticContentFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the outcome served for `url`.
    pub fn insert(&self, url: impl Into<String>, outcome: FetchedText) {
        self.responses.lock().unwrap().insert(url.into(), outcome);
    }

    /// Register a plain-text body served for `url`.
    pub fn insert_text(&self, url: impl Into<String>, body: impl Into<String>) {
        self.insert(url, FetchedText::Found(body.into()));
    }
}

#[async_trait]
impl ContentFetcher for StaticContentFetcher {
    async fn fetch_text(&self, url: &str) -> Result<FetchedText, MatrixError> {
        let responses = self.responses.lock().unwrap();
        Ok(responses.get(url).cloned().unwrap_or(FetchedText::NotFound))
    }
}

// ---------------------------------------------------------------------------
// StaticPullRequestApi
// ---------------------------------------------------------------------------

/// Pull-request listing backed by a fixed vector.
#[derive(Debug, Default)]
pub struct StaticPullRequestApi {
    pulls: Vec<PullRequest>,
}

impl StaticPullRequestApi {
    pub fn new(pulls: Vec<PullRequest>) -> Self {
        StaticPullRequestApi { pulls }
    }
}

#[async_trait]
impl PullRequestApi for StaticPullRequestApi {
    async fn list_open_pulls(
        &self,
        _owner: &str,
        _repo: &str,
    ) -> Result<Vec<PullRequest>, MatrixError> {
        Ok(self.pulls.clone())
    }
}

/// Build a pull request record the way the listing API would return it.
///
/// `head_repo` of `None` models a deleted fork.
pub fn pull_request(
    number: u64,
    head_repo: Option<&str>,
    branch: &str,
    diff_url: &str,
) -> PullRequest {
    PullRequest {
        number,
        diff_url: diff_url.to_string(),
        head: PullRequestHead {
            branch: branch.to_string(),
            repo: head_repo.map(|full_name| HeadRepo {
                full_name: full_name.to_string(),
            }),
        },
    }
}
