//! matrixgen - CI build-matrix generator for the system-package recipe index
//!
//! Enumerates the packages affected by mainline and by every open pull
//! request, resolves the build-variant folder for each, and writes the
//! Linux and BSD job matrices consumed by the CI runner.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};

use matrixgen_core::{
    expand_linux, init_tracing, write_matrix, GeneratorConfig, GitHubClient, HttpFetcher,
    MatrixGenerator,
};

#[derive(Parser)]
#[command(name = "matrixgen")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compute the CI build matrix for the system-package recipe index", long_about = None)]
struct Cli {
    /// Owner of the recipe index repository
    #[arg(long, default_value = "conan-io")]
    owner: String,

    /// Recipe index repository name
    #[arg(long, default_value = "conan-center-index")]
    repo: String,

    /// Mainline ref recipes are resolved against
    #[arg(long, default_value = "master")]
    mainline_ref: String,

    /// Local directory whose sub-directories are the mainline recipe candidates
    #[arg(long, default_value = "CCI/recipes")]
    recipes_dir: PathBuf,

    /// API token (unauthenticated requests hit stricter rate limits)
    #[arg(long, env = "GH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Basic-auth user name
    #[arg(long, env = "GH_USERNAME")]
    user: Option<String>,

    /// Basic-auth password
    #[arg(long, env = "GH_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Maximum number of in-flight remote probes
    #[arg(long, default_value_t = 64)]
    fan_out: usize,

    /// Output path for the Linux matrix artifact
    #[arg(long, default_value = "matrixLinux.yml")]
    linux_output: PathBuf,

    /// Output path for the BSD matrix artifact
    #[arg(long, default_value = "matrixBSD.yml")]
    bsd_output: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let basic_auth = match (cli.user, cli.password) {
        (Some(user), Some(password)) => Some((user, password)),
        _ => None,
    };
    let api = Arc::new(GitHubClient::new(cli.token, basic_auth));
    let fetcher = Arc::new(HttpFetcher::new());

    let config = GeneratorConfig {
        owner: cli.owner,
        repo: cli.repo,
        mainline_ref: cli.mainline_ref,
        recipes_dir: cli.recipes_dir,
        fan_out: cli.fan_out,
    };
    let generator = MatrixGenerator::new(api, fetcher, config);

    let entries = generator
        .generate()
        .await
        .context("matrix generation failed")?;
    let linux = expand_linux(&entries);

    write_matrix(&cli.linux_output, &linux).context("Failed to write Linux matrix")?;
    write_matrix(&cli.bsd_output, &entries).context("Failed to write BSD matrix")?;

    info!(
        packages = entries.len(),
        linux_jobs = linux.len(),
        "matrix generation complete"
    );
    Ok(())
}
