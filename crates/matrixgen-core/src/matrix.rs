//! Job-id assignment and platform expansion.

use serde::{Deserialize, Serialize};

use crate::resolve::ResolvedRecipe;

/// Container images the Linux matrix fans out over, in artifact order.
pub const LINUX_DISTROS: [&str; 14] = [
    "opensuse/tumbleweed",
    "opensuse/leap:15.2",
    "debian:11",
    "debian:10",
    "ubuntu:kinetic",
    "ubuntu:jammy",
    "ubuntu:focal",
    "ubuntu:bionic",
    "almalinux:8.5",
    "archlinux",
    "fedora:36",
    "fedora:35",
    "fedora:34",
    "fedora:33",
];

/// One resolved package with its job id; also the BSD matrix entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixEntry {
    pub package: String,
    pub repo: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub folder: String,
    pub pr: String,
    pub job_id: u64,
}

/// A matrix entry pinned to one Linux container image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinuxJob {
    #[serde(flatten)]
    pub entry: MatrixEntry,
    pub distro: String,
}

/// Assign dense job ids over the resolved collection.
///
/// Entries are sorted by package, folder, then source id first so that two
/// runs over identical inputs emit identical artifacts; ids then run
/// contiguously from 0.
pub fn assign_job_ids(mut resolved: Vec<ResolvedRecipe>) -> Vec<MatrixEntry> {
    resolved.sort_by(|a, b| {
        (&a.package, &a.folder, &a.pr).cmp(&(&b.package, &b.folder, &b.pr))
    });

    resolved
        .into_iter()
        .enumerate()
        .map(|(job_id, recipe)| MatrixEntry {
            package: recipe.package,
            repo: recipe.repo,
            git_ref: recipe.git_ref,
            folder: recipe.folder,
            pr: recipe.pr,
            job_id: job_id as u64,
        })
        .collect()
}

/// Cross-join the entries against [`LINUX_DISTROS`], list order preserved.
///
/// Every job record owns its own copy of the entry fields, so mutating one
/// record never leaks into another.
pub fn expand_linux(entries: &[MatrixEntry]) -> Vec<LinuxJob> {
    entries
        .iter()
        .flat_map(|entry| {
            LINUX_DISTROS.iter().map(move |distro| LinuxJob {
                entry: entry.clone(),
                distro: (*distro).to_string(),
            })
        })
        .collect()
}
