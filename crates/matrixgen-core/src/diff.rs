//! Unified-diff impact analysis.

use std::collections::BTreeSet;

use tracing::warn;

use crate::fetch::{ContentFetcher, FetchedText};
use crate::package::PackageRef;

/// Extract the set of package references a unified diff touches.
///
/// Both the `+++ b/` and `--- a/` file-header lines are scanned so that
/// renamed or deleted recipe files still register the package as affected.
pub fn affected_packages(diff: &str) -> BTreeSet<PackageRef> {
    let mut packages = BTreeSet::new();
    for line in diff.lines() {
        if line.starts_with("+++ b/recipes/") || line.starts_with("--- a/recipes/") {
            let parts: Vec<&str> = line.split('/').collect();
            if parts.len() >= 5 {
                packages.insert(PackageRef::with_folder(parts[2], parts[3]));
            }
        }
    }
    packages
}

/// Download and analyze one pull request's diff.
///
/// Every per-diff failure is contained here: a transport error, a
/// non-success status, or a body that is not text logs one warning and
/// yields the empty set so the remaining sources keep going.
pub async fn affected_packages_for_diff(
    fetcher: &dyn ContentFetcher,
    diff_url: &str,
    pr: u64,
) -> BTreeSet<PackageRef> {
    match fetcher.fetch_text(diff_url).await {
        Ok(FetchedText::Found(diff)) => affected_packages(&diff),
        Ok(FetchedText::Undecodable) => {
            warn!(pr, url = diff_url, "error when decoding diff");
            BTreeSet::new()
        }
        Ok(FetchedText::NotFound) => {
            warn!(pr, url = diff_url, "diff not found");
            BTreeSet::new()
        }
        Ok(FetchedText::Failed { status }) => {
            warn!(pr, url = diff_url, status, "diff download failed");
            BTreeSet::new()
        }
        Err(err) => {
            warn!(pr, url = diff_url, error = %err, "diff download failed");
            BTreeSet::new()
        }
    }
}
