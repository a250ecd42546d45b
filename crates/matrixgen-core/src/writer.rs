//! Matrix artifact serialization.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::MatrixError;

/// Wrapper shape the CI runner's `fromJSON(...)` include expression expects.
#[derive(Serialize)]
struct IncludeList<'a, T: Serialize> {
    include: &'a [T],
}

/// Write one matrix artifact as `{"include": [...]}`.
///
/// Serialization and write failures are fatal; an artifact that is missing
/// entries would silently shrink CI coverage.
pub fn write_matrix<T: Serialize>(path: &Path, jobs: &[T]) -> Result<(), MatrixError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &IncludeList { include: jobs })?;
    writer.flush()?;
    info!(path = %path.display(), jobs = jobs.len(), "wrote matrix artifact");
    Ok(())
}
