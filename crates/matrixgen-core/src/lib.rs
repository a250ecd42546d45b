//! matrixgen core - impact resolution and build-matrix expansion
//!
//! Computes the CI build matrix for a package-recipe repository:
//! - enumerates change sources (mainline plus every open pull request)
//! - analyzes pull-request diffs for the packages they touch
//! - resolves each (package, source) pair to its build-variant folder
//! - expands the resolved set across the Linux platform list
//! - writes the Linux and BSD matrix artifacts

pub mod diff;
pub mod error;
pub mod fakes;
pub mod fetch;
pub mod generate;
pub mod github;
pub mod matrix;
pub mod package;
pub mod recipes;
pub mod resolve;
pub mod sources;
pub mod telemetry;
pub mod writer;

// Re-export key types
pub use error::MatrixError;
pub use fetch::{ContentFetcher, FetchedText, HttpFetcher};
pub use generate::{GeneratorConfig, MatrixGenerator};
pub use github::{GitHubClient, PullRequest, PullRequestApi};
pub use matrix::{assign_job_ids, expand_linux, LinuxJob, MatrixEntry, LINUX_DISTROS};
pub use package::PackageRef;
pub use resolve::{resolve_recipe, Resolution, ResolvedRecipe, SkipReason};
pub use sources::{Source, MAINLINE_ID};
pub use telemetry::init_tracing;
pub use writer::write_matrix;
