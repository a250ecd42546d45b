//! End-to-end pipeline tests driven by the in-memory fakes.

use std::sync::Arc;

use matrixgen_core::fakes::{pull_request, StaticContentFetcher, StaticPullRequestApi};
use matrixgen_core::{
    expand_linux, write_matrix, FetchedText, GeneratorConfig, MatrixEntry, MatrixGenerator,
    LINUX_DISTROS,
};
use tempfile::TempDir;

fn recipes_checkout(names: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for name in names {
        std::fs::create_dir(dir.path().join(name)).expect("create recipe dir");
    }
    dir
}

fn mainline_url(path: &str) -> String {
    format!(
        "https://raw.githubusercontent.com/conan-io/conan-center-index/master/{}",
        path
    )
}

/// Test: mainline and pull-request candidates resolve into one matrix with
/// dense, deterministic job ids; a deleted-fork PR contributes nothing.
#[tokio::test]
async fn test_generate_full_matrix() {
    let recipes = recipes_checkout(&["openssl", "zlib"]);

    let fetcher = StaticContentFetcher::new();
    // Mainline: openssl declares a system variant, zlib does not.
    fetcher.insert_text(
        mainline_url("recipes/openssl/config.yml"),
        "versions:\n  system:\n    folder: system\n",
    );
    fetcher.insert_text(
        mainline_url("recipes/zlib/config.yml"),
        "versions:\n  \"1.2.13\":\n    folder: all\n",
    );

    // PR 42 touches libalsa's system folder on a fork.
    fetcher.insert_text(
        "https://example.invalid/42.diff",
        "--- a/recipes/libalsa/system/conanfile.py\n+++ b/recipes/libalsa/system/conanfile.py\n",
    );
    fetcher.insert_text(
        "https://raw.githubusercontent.com/fork/conan-center-index/topic/recipes/libalsa/config.yml",
        "versions:\n  system:\n    folder: system\n",
    );

    let api = StaticPullRequestApi::new(vec![
        pull_request(42, Some("fork/conan-center-index"), "topic", "https://example.invalid/42.diff"),
        // PR 43 lost its fork: skipped with a warning, zero entries.
        pull_request(43, None, "gone", "https://example.invalid/43.diff"),
    ]);

    let config = GeneratorConfig {
        recipes_dir: recipes.path().to_path_buf(),
        fan_out: 8,
        ..GeneratorConfig::default()
    };
    let generator = MatrixGenerator::new(Arc::new(api), Arc::new(fetcher), config);
    let entries = generator.generate().await.expect("generate failed");

    // openssl from mainline + libalsa from PR 42; zlib has no system variant.
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.pr != "43"));
    assert!(entries.iter().all(|e| !e.folder.is_empty()));

    let mut ids: Vec<u64> = entries.iter().map(|e| e.job_id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 1]);

    // Deterministic assignment order: sorted by package name.
    assert_eq!(entries[0].package, "libalsa");
    assert_eq!(entries[0].pr, "42");
    assert_eq!(entries[0].repo, "fork/conan-center-index");
    assert_eq!(entries[1].package, "openssl");
    assert_eq!(entries[1].pr, "0");
    assert_eq!(entries[1].repo, "conan-io/conan-center-index");

    let linux = expand_linux(&entries);
    assert_eq!(linux.len(), entries.len() * LINUX_DISTROS.len());
}

/// Test: a diff that fails to decode empties that PR's candidate set but
/// never aborts the other sources.
#[tokio::test]
async fn test_undecodable_diff_is_contained() {
    let recipes = recipes_checkout(&["openssl"]);

    let fetcher = StaticContentFetcher::new();
    fetcher.insert_text(
        mainline_url("recipes/openssl/config.yml"),
        "versions:\n  system:\n    folder: system\n",
    );
    fetcher.insert("https://example.invalid/9.diff", FetchedText::Undecodable);

    let api = StaticPullRequestApi::new(vec![pull_request(
        9,
        Some("fork/conan-center-index"),
        "binary-diff",
        "https://example.invalid/9.diff",
    )]);

    let config = GeneratorConfig {
        recipes_dir: recipes.path().to_path_buf(),
        fan_out: 4,
        ..GeneratorConfig::default()
    };
    let generator = MatrixGenerator::new(Arc::new(api), Arc::new(fetcher), config);
    let entries = generator.generate().await.expect("generate failed");

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].package, "openssl");
    assert_eq!(entries[0].pr, "0");
}

/// Test: a diff-implied folder constraint that does not match the resolved
/// folder drops the pair without affecting the rest.
#[tokio::test]
async fn test_folder_constraint_mismatch_drops_pair() {
    let recipes = recipes_checkout(&[]);

    let fetcher = StaticContentFetcher::new();
    // The diff touches foo/bar, but foo's system variant builds from "baz".
    fetcher.insert_text(
        "https://example.invalid/5.diff",
        "+++ b/recipes/foo/bar/conanfile.py\n",
    );
    fetcher.insert_text(
        "https://raw.githubusercontent.com/fork/conan-center-index/topic/recipes/foo/config.yml",
        "versions:\n  system:\n    folder: baz\n",
    );

    let api = StaticPullRequestApi::new(vec![pull_request(
        5,
        Some("fork/conan-center-index"),
        "topic",
        "https://example.invalid/5.diff",
    )]);

    let config = GeneratorConfig {
        recipes_dir: recipes.path().to_path_buf(),
        fan_out: 4,
        ..GeneratorConfig::default()
    };
    let generator = MatrixGenerator::new(Arc::new(api), Arc::new(fetcher), config);
    let entries = generator.generate().await.expect("generate failed");

    assert!(entries.is_empty());
}

/// Test: both artifacts round-trip through serde with the expected counts.
#[tokio::test]
async fn test_artifacts_round_trip() {
    let recipes = recipes_checkout(&["openssl"]);

    let fetcher = StaticContentFetcher::new();
    fetcher.insert_text(
        mainline_url("recipes/openssl/config.yml"),
        "versions:\n  system:\n    folder: system\n",
    );

    let api = StaticPullRequestApi::new(Vec::new());
    let config = GeneratorConfig {
        recipes_dir: recipes.path().to_path_buf(),
        fan_out: 4,
        ..GeneratorConfig::default()
    };
    let generator = MatrixGenerator::new(Arc::new(api), Arc::new(fetcher), config);
    let entries = generator.generate().await.expect("generate failed");
    let linux = expand_linux(&entries);

    let out = tempfile::tempdir().expect("tempdir");
    let linux_path = out.path().join("matrixLinux.yml");
    let bsd_path = out.path().join("matrixBSD.yml");
    write_matrix(&linux_path, &linux).expect("write linux failed");
    write_matrix(&bsd_path, &entries).expect("write bsd failed");

    #[derive(serde::Deserialize)]
    struct Bsd {
        include: Vec<MatrixEntry>,
    }
    let bsd: Bsd = serde_json::from_str(&std::fs::read_to_string(&bsd_path).expect("read"))
        .expect("parse bsd");
    assert_eq!(bsd.include, entries);

    let linux_value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&linux_path).expect("read"))
            .expect("parse linux");
    let jobs = linux_value["include"].as_array().expect("include array");
    assert_eq!(jobs.len(), entries.len() * LINUX_DISTROS.len());
    assert_eq!(jobs[0]["package"], "openssl");
    assert_eq!(jobs[0]["job_id"], 0);
    assert_eq!(jobs[0]["pr"], "0");
    assert_eq!(jobs[0]["distro"], LINUX_DISTROS[0]);
}
