//! End-to-end matrix generation.
//!
//! Orchestrates the pipeline: mainline candidates from the local recipes
//! checkout, pull-request candidates from diff analysis, one resolution
//! probe per (candidate, source) pair, then deterministic job-id
//! assignment. Expansion and writing stay with the caller so the resolved
//! collection can feed both artifacts.

use std::path::PathBuf;
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

use crate::error::MatrixError;
use crate::fetch::ContentFetcher;
use crate::github::PullRequestApi;
use crate::matrix::{assign_job_ids, MatrixEntry};
use crate::package::PackageRef;
use crate::recipes;
use crate::resolve::{resolve_recipe, Resolution};
use crate::sources::{self, Source};

/// Generator configuration.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Owner of the recipe index repository.
    pub owner: String,

    /// Name of the recipe index repository.
    pub repo: String,

    /// Mainline ref recipes are resolved against.
    pub mainline_ref: String,

    /// Local checkout directory whose sub-directories are the mainline
    /// candidates.
    pub recipes_dir: PathBuf,

    /// Maximum number of in-flight remote probes.
    pub fan_out: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            owner: "conan-io".to_string(),
            repo: "conan-center-index".to_string(),
            mainline_ref: "master".to_string(),
            recipes_dir: PathBuf::from("CCI/recipes"),
            fan_out: 64,
        }
    }
}

/// Drives discovery, resolution and job-id assignment.
pub struct MatrixGenerator {
    api: Arc<dyn PullRequestApi>,
    fetcher: Arc<dyn ContentFetcher>,
    config: GeneratorConfig,
}

impl MatrixGenerator {
    pub fn new(
        api: Arc<dyn PullRequestApi>,
        fetcher: Arc<dyn ContentFetcher>,
        config: GeneratorConfig,
    ) -> Self {
        MatrixGenerator {
            api,
            fetcher,
            config,
        }
    }

    /// Compute the resolved collection for mainline plus every open pull
    /// request, with dense job ids assigned.
    ///
    /// Skipped (candidate, source) pairs simply drop out; a fatal fetch
    /// failure from any probe short-circuits the whole run.
    pub async fn generate(&self) -> Result<Vec<MatrixEntry>, MatrixError> {
        let mainline_repo = format!("{}/{}", self.config.owner, self.config.repo);
        let packages = recipes::list_recipe_names(&self.config.recipes_dir)?;
        info!(count = packages.len(), "listed mainline recipe directories");

        let mut all_sources = vec![Source::mainline(
            &mainline_repo,
            &self.config.mainline_ref,
            packages,
        )];
        all_sources.extend(
            sources::pull_request_sources(
                self.api.as_ref(),
                self.fetcher.as_ref(),
                &self.config.owner,
                &self.config.repo,
                self.config.fan_out,
            )
            .await?,
        );

        // One probe per (candidate, source) pair, all independent.
        let mut pairs: Vec<(PackageRef, String, String, String)> = Vec::new();
        for source in &all_sources {
            for candidate in &source.candidates {
                pairs.push((
                    candidate.clone(),
                    source.repo.clone(),
                    source.git_ref.clone(),
                    source.id.clone(),
                ));
            }
        }
        debug!(probes = pairs.len(), "scheduling resolution probes");

        let fetcher = self.fetcher.clone();
        let resolutions: Vec<Resolution> = stream::iter(pairs)
            .map(|(candidate, repo, git_ref, id)| {
                let fetcher = fetcher.clone();
                async move {
                    resolve_recipe(fetcher.as_ref(), &candidate, &repo, &git_ref, &id).await
                }
            })
            .buffer_unordered(self.config.fan_out.max(1))
            .try_collect()
            .await?;

        let resolved: Vec<_> = resolutions
            .into_iter()
            .filter_map(|resolution| match resolution {
                Resolution::Resolved(recipe) => Some(recipe),
                Resolution::Skipped(_) => None,
            })
            .collect();
        info!(resolved = resolved.len(), "resolution complete");

        Ok(assign_job_ids(resolved))
    }
}
