//! GitHub pull-request listing.
//!
//! The pipeline only needs one call: "list every open pull request for a
//! repository". It is modelled as the [`PullRequestApi`] trait so the
//! orchestrator can be driven by the in-memory fake from [`crate::fakes`].

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::MatrixError;

/// One open pull request, as returned by the listing API.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    /// Pull request number.
    pub number: u64,

    /// URL of the unified diff for this pull request.
    pub diff_url: String,

    /// Head branch and repository.
    pub head: PullRequestHead,
}

/// Head of a pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestHead {
    /// Branch name on the head repository.
    #[serde(rename = "ref")]
    pub branch: String,

    /// Head repository. `None` when the contributor deleted their fork;
    /// such a pull request can no longer be built.
    pub repo: Option<HeadRepo>,
}

/// Repository a pull request's head branch lives in.
#[derive(Debug, Clone, Deserialize)]
pub struct HeadRepo {
    /// `owner/name` form.
    pub full_name: String,
}

/// Lists open pull requests for a repository.
#[async_trait]
pub trait PullRequestApi: Send + Sync {
    /// Return every open pull request, fully paginated.
    async fn list_open_pulls(&self, owner: &str, repo: &str)
        -> Result<Vec<PullRequest>, MatrixError>;
}

/// GitHub REST v3 client.
///
/// Unauthenticated requests work but hit stricter upstream rate limits;
/// a token and/or basic-auth credentials lift them.
pub struct GitHubClient {
    client: reqwest::Client,
    token: Option<String>,
    basic_auth: Option<(String, String)>,
    api_base: String,
}

impl GitHubClient {
    /// Create a client against `api.github.com`.
    pub fn new(token: Option<String>, basic_auth: Option<(String, String)>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("matrixgen/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        GitHubClient {
            client,
            token,
            basic_auth,
            api_base: "https://api.github.com".to_string(),
        }
    }

    /// Override the API base URL.
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl PullRequestApi for GitHubClient {
    async fn list_open_pulls(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<PullRequest>, MatrixError> {
        let url = format!("{}/repos/{}/{}/pulls", self.api_base, owner, repo);
        let mut pulls = Vec::new();
        let mut page: u32 = 1;

        // Pagination is inherently sequential: whether another page exists
        // depends on the previous one coming back empty.
        loop {
            let page_param = page.to_string();
            let mut request = self
                .client
                .get(&url)
                .header("Accept", "application/vnd.github.v3+json")
                .query(&[
                    ("state", "open"),
                    ("sort", "created"),
                    ("direction", "desc"),
                    ("per_page", "100"),
                    ("page", page_param.as_str()),
                ]);
            if let Some(token) = &self.token {
                request = request.header("Authorization", format!("token {}", token));
            }
            if let Some((user, password)) = &self.basic_auth {
                request = request.basic_auth(user, Some(password));
            }

            let response =
                request
                    .send()
                    .await
                    .map_err(|err| MatrixError::PullRequestListing {
                        page,
                        detail: err.to_string(),
                    })?;
            if !response.status().is_success() {
                return Err(MatrixError::PullRequestListing {
                    page,
                    detail: format!("status {}", response.status()),
                });
            }

            let batch: Vec<PullRequest> =
                response
                    .json()
                    .await
                    .map_err(|err| MatrixError::PullRequestListing {
                        page,
                        detail: err.to_string(),
                    })?;
            if batch.is_empty() {
                break;
            }
            debug!(page, count = batch.len(), "fetched pull request page");
            pulls.extend(batch);
            page += 1;
        }

        Ok(pulls)
    }
}
