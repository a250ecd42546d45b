//! Per-package build-variant resolution.
//!
//! Given one candidate package and one source, decide whether the package
//! builds under the `system` flavor at all and, if so, which folder holds
//! the recipe. The fallback chain mirrors the recipe index layout:
//! `config.yml` is authoritative when present; with no `config.yml` the
//! only possible layout is a bare `system/` folder, confirmed by probing
//! for its conanfile.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::warn;

use crate::error::MatrixError;
use crate::fetch::{ContentFetcher, FetchedText};
use crate::package::PackageRef;

/// Build flavor this generator resolves for. Doubles as the fallback
/// folder name when a recipe has no `config.yml`.
pub const SYSTEM_VARIANT: &str = "system";

/// A (package, source) pair that resolved to a buildable variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRecipe {
    /// Recipe directory name.
    pub package: String,

    /// Repository the recipe is fetched from.
    pub repo: String,

    /// Git ref within `repo`, URL-escaped.
    pub git_ref: String,

    /// Folder the recipe builds from; never empty.
    pub folder: String,

    /// Originating source id (`"0"` for mainline).
    pub pr: String,
}

/// Outcome of one resolution attempt.
///
/// Skips are the normal, frequent case (most packages have no system
/// variant); only a non-404 fetch failure aborts the run, and that
/// surfaces as `Err` from [`resolve_recipe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedRecipe),
    Skipped(SkipReason),
}

/// Why a (package, source) pair produced no job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// `config.yml` exists but declares no usable system variant.
    NoSystemVariant,

    /// `config.yml` exists but could not be parsed.
    MalformedConfig,

    /// The diff touched a folder other than the one that would build.
    FolderMismatch { requested: String, actual: String },

    /// Neither a system entry in `config.yml` nor a bare system folder.
    NoSystemRecipe,
}

/// `config.yml` as decoded from the recipe repository.
#[derive(Debug, Deserialize)]
struct RecipeConfig {
    #[serde(default)]
    versions: BTreeMap<String, VersionEntry>,
}

#[derive(Debug, Deserialize)]
struct VersionEntry {
    folder: Option<String>,
}

impl RecipeConfig {
    /// `versions.system.folder`, when present and non-empty.
    fn system_folder(&self) -> Option<&str> {
        self.versions
            .get(SYSTEM_VARIANT)
            .and_then(|entry| entry.folder.as_deref())
            .filter(|folder| !folder.is_empty())
    }
}

/// Decoded state of a remote `config.yml`.
enum ConfigDoc {
    Parsed(RecipeConfig),
    Absent,
    Malformed(String),
}

fn raw_content_url(repo: &str, git_ref: &str, path: &str) -> String {
    format!("https://raw.githubusercontent.com/{}/{}/{}", repo, git_ref, path)
}

async fn fetch_config(
    fetcher: &dyn ContentFetcher,
    url: &str,
) -> Result<ConfigDoc, MatrixError> {
    match fetcher.fetch_text(url).await? {
        FetchedText::Found(body) => match serde_yaml::from_str::<RecipeConfig>(&body) {
            Ok(config) => Ok(ConfigDoc::Parsed(config)),
            Err(err) => Ok(ConfigDoc::Malformed(err.to_string())),
        },
        FetchedText::Undecodable => Ok(ConfigDoc::Malformed("not valid text".to_string())),
        FetchedText::NotFound => Ok(ConfigDoc::Absent),
        FetchedText::Failed { status } => Err(MatrixError::UnexpectedStatus {
            url: url.to_string(),
            status,
        }),
    }
}

/// Resolve one candidate against one source.
///
/// Skips are returned, not raised. The one skip worth surfacing is the
/// double 404 (no `config.yml` and no bare system folder), logged with
/// the package, the source id and the probed URL.
pub async fn resolve_recipe(
    fetcher: &dyn ContentFetcher,
    candidate: &PackageRef,
    repo: &str,
    git_ref: &str,
    source_id: &str,
) -> Result<Resolution, MatrixError> {
    let config_url = raw_content_url(
        repo,
        git_ref,
        &format!("recipes/{}/config.yml", candidate.name),
    );

    let folder = match fetch_config(fetcher, &config_url).await? {
        ConfigDoc::Absent => {
            if let Some(requested) = &candidate.folder {
                if requested != SYSTEM_VARIANT {
                    return Ok(Resolution::Skipped(SkipReason::FolderMismatch {
                        requested: requested.clone(),
                        actual: SYSTEM_VARIANT.to_string(),
                    }));
                }
            }
            let conanfile_url = raw_content_url(
                repo,
                git_ref,
                &format!("recipes/{}/{}/conanfile.py", candidate.name, SYSTEM_VARIANT),
            );
            match fetcher.fetch_text(&conanfile_url).await? {
                FetchedText::NotFound => {
                    warn!(
                        package = %candidate.name,
                        pr = source_id,
                        url = %conanfile_url,
                        "no system folder found for package"
                    );
                    return Ok(Resolution::Skipped(SkipReason::NoSystemRecipe));
                }
                FetchedText::Failed { status } => {
                    return Err(MatrixError::UnexpectedStatus {
                        url: conanfile_url,
                        status,
                    });
                }
                // Existence is all that matters here; the conanfile body
                // is never read.
                FetchedText::Found(_) | FetchedText::Undecodable => SYSTEM_VARIANT.to_string(),
            }
        }
        ConfigDoc::Malformed(detail) => {
            warn!(
                package = %candidate.name,
                repo,
                git_ref,
                pr = source_id,
                detail = %detail,
                "error in configuration file"
            );
            return Ok(Resolution::Skipped(SkipReason::MalformedConfig));
        }
        ConfigDoc::Parsed(config) => match config.system_folder() {
            None => return Ok(Resolution::Skipped(SkipReason::NoSystemVariant)),
            Some(actual) => {
                if let Some(requested) = &candidate.folder {
                    if requested != actual {
                        return Ok(Resolution::Skipped(SkipReason::FolderMismatch {
                            requested: requested.clone(),
                            actual: actual.to_string(),
                        }));
                    }
                }
                actual.to_string()
            }
        },
    };

    Ok(Resolution::Resolved(ResolvedRecipe {
        package: candidate.name.clone(),
        repo: repo.to_string(),
        git_ref: git_ref.to_string(),
        folder,
        pr: source_id.to_string(),
    }))
}
