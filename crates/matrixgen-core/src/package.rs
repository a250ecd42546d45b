//! Package references: a recipe name, optionally pinned to one variant folder.

use std::fmt;

/// A package name optionally qualified by a build-variant folder.
///
/// Diff analysis yields qualified references (`zlib/all`) because a diff
/// always touches a concrete folder; mainline directory listings yield bare
/// names. A qualified reference only ever resolves to its own folder.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageRef {
    /// Recipe directory name.
    pub name: String,

    /// Folder constraint, when the reference names one.
    pub folder: Option<String>,
}

impl PackageRef {
    /// Unconstrained reference.
    pub fn new(name: impl Into<String>) -> Self {
        PackageRef {
            name: name.into(),
            folder: None,
        }
    }

    /// Reference pinned to a specific folder.
    pub fn with_folder(name: impl Into<String>, folder: impl Into<String>) -> Self {
        PackageRef {
            name: name.into(),
            folder: Some(folder.into()),
        }
    }

    /// Parse `name` or `name/folder`.
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split('/');
        let name = parts.next().unwrap_or(raw);
        match parts.next() {
            Some(folder) if !folder.is_empty() => PackageRef::with_folder(name, folder),
            _ => PackageRef::new(name),
        }
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.folder {
            Some(folder) => write!(f, "{}/{}", self.name, folder),
            None => write!(f, "{}", self.name),
        }
    }
}
