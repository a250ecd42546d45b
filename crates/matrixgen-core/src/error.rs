//! Error types for matrixgen-core

use thiserror::Error;

/// Errors that abort a matrix-generation run.
///
/// Per-unit conditions (a malformed config, a missing system variant, a
/// folder mismatch) are not errors: they are skips carried by
/// [`Resolution::Skipped`](crate::resolve::Resolution).
#[derive(Error, Debug)]
pub enum MatrixError {
    /// Pull-request listing failed; any page aborts the run.
    #[error("pull request listing failed on page {page}: {detail}")]
    PullRequestListing { page: u32, detail: String },

    /// A config/recipe probe returned a status that is neither success nor 404.
    #[error("unexpected status {status} fetching {url}")]
    UnexpectedStatus { url: String, status: u16 },

    /// Recipe directory enumeration failed.
    #[error("failed to list recipes under {path}: {source}")]
    RecipeListing {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Matrix artifact serialization error.
    #[error("matrix serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Artifact IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for MatrixError {
    fn from(err: reqwest::Error) -> Self {
        MatrixError::Http(err.to_string())
    }
}
