//! Recipe directory enumeration, the mainline source of candidates.

use std::path::Path;

use crate::error::MatrixError;

/// List package names under the recipes checkout directory.
///
/// Only sub-directories count; a stray file under `recipes/` would just
/// trigger pointless remote probes. Names come back sorted.
pub fn list_recipe_names(dir: &Path) -> Result<Vec<String>, MatrixError> {
    let listing_error = |source: std::io::Error| MatrixError::RecipeListing {
        path: dir.display().to_string(),
        source,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(listing_error)? {
        let entry = entry.map_err(listing_error)?;
        let file_type = entry.file_type().map_err(listing_error)?;
        if file_type.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}
