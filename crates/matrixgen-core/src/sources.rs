//! Change sources: mainline plus one source per open pull request.

use std::collections::BTreeSet;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};
use url::form_urlencoded;

use crate::diff;
use crate::error::MatrixError;
use crate::fetch::ContentFetcher;
use crate::github::PullRequestApi;
use crate::package::PackageRef;

/// Source id used for the mainline branch.
pub const MAINLINE_ID: &str = "0";

/// One origin of candidate package changes.
#[derive(Debug, Clone)]
pub struct Source {
    /// `"0"` for mainline, the pull request number otherwise.
    pub id: String,

    /// Repository recipe metadata is fetched from (`owner/name`).
    pub repo: String,

    /// Git ref, already URL-escaped for raw-content URLs.
    pub git_ref: String,

    /// Candidate package references to resolve for this source.
    pub candidates: BTreeSet<PackageRef>,
}

impl Source {
    /// Mainline source: every recipe directory is an unconstrained candidate.
    pub fn mainline(
        repo: &str,
        git_ref: &str,
        packages: impl IntoIterator<Item = String>,
    ) -> Self {
        Source {
            id: MAINLINE_ID.to_string(),
            repo: repo.to_string(),
            git_ref: git_ref.to_string(),
            candidates: packages.into_iter().map(PackageRef::new).collect(),
        }
    }
}

/// Escape a git ref for use inside a raw-content URL path.
///
/// Branch names routinely contain `/` and `#`.
fn escape_ref(git_ref: &str) -> String {
    form_urlencoded::byte_serialize(git_ref.as_bytes()).collect()
}

/// Build one source per open pull request.
///
/// Diffs download concurrently with at most `fan_out` in flight. A pull
/// request whose head repository is gone (deleted fork) produces no source
/// and exactly one warning; its recipes can no longer be fetched anyway.
pub async fn pull_request_sources(
    api: &dyn PullRequestApi,
    fetcher: &dyn ContentFetcher,
    owner: &str,
    repo: &str,
    fan_out: usize,
) -> Result<Vec<Source>, MatrixError> {
    let pulls = api.list_open_pulls(owner, repo).await?;
    info!(count = pulls.len(), "listed open pull requests");

    let mut heads = Vec::new();
    for pr in pulls {
        let head_repo = match pr.head.repo {
            Some(head_repo) => head_repo,
            None => {
                warn!(pr = pr.number, "no repo detected for pull request");
                continue;
            }
        };
        heads.push((pr.number, head_repo.full_name, pr.head.branch, pr.diff_url));
    }

    let sources = stream::iter(heads)
        .map(|(number, head_repo, branch, diff_url)| async move {
            let candidates = diff::affected_packages_for_diff(fetcher, &diff_url, number).await;
            Source {
                id: number.to_string(),
                repo: head_repo,
                git_ref: escape_ref(&branch),
                candidates,
            }
        })
        .buffer_unordered(fan_out.max(1))
        .collect::<Vec<_>>()
        .await;

    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{pull_request, StaticContentFetcher, StaticPullRequestApi};

    #[test]
    fn test_escape_ref_passes_plain_branches_through() {
        assert_eq!(escape_ref("master"), "master");
    }

    #[test]
    fn test_escape_ref_encodes_special_characters() {
        assert_eq!(escape_ref("feature/alsa#2"), "feature%2Falsa%232");
        assert_eq!(escape_ref("with space"), "with+space");
    }

    #[test]
    fn test_mainline_source_has_unconstrained_candidates() {
        let source = Source::mainline(
            "conan-io/conan-center-index",
            "master",
            vec!["zlib".to_string(), "openssl".to_string()],
        );
        assert_eq!(source.id, MAINLINE_ID);
        assert_eq!(source.candidates.len(), 2);
        assert!(source.candidates.iter().all(|c| c.folder.is_none()));
    }

    #[tokio::test]
    async fn test_deleted_fork_produces_no_source() {
        let api = StaticPullRequestApi::new(vec![
            pull_request(7, None, "gone", "https://example.invalid/7.diff"),
            pull_request(8, Some("fork/cci"), "topic", "https://example.invalid/8.diff"),
        ]);
        let fetcher = StaticContentFetcher::new();
        fetcher.insert_text(
            "https://example.invalid/8.diff",
            "+++ b/recipes/zlib/all/conanfile.py\n",
        );

        let sources = pull_request_sources(&api, &fetcher, "conan-io", "cci", 4)
            .await
            .expect("listing failed");

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].id, "8");
        assert_eq!(sources[0].repo, "fork/cci");
        assert!(sources[0]
            .candidates
            .contains(&PackageRef::with_folder("zlib", "all")));
    }
}
