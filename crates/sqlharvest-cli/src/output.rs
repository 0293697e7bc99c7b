//! CSV output writing.

use anyhow::{Context, Result};
use std::path::Path;

use crate::rows::CatalogRow;

/// Writes rows to `path` as CSV.
///
/// The header record is always written, so an extraction that produced no
/// metadata still yields a well-formed (empty) catalog file.
pub fn write_csv(path: &Path, rows: &[CatalogRow]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer
        .write_record(CatalogRow::HEADER)
        .context("Failed to write CSV header")?;
    for row in rows {
        writer.serialize(row).context("Failed to write CSV row")?;
    }
    writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}
