//! Input resolution: a SQL file, a directory of .sql files, or inline SQL.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One unit of SQL to extract metadata from.
#[derive(Debug, Clone)]
pub struct SqlSource {
    /// Name reported in the CSV `filename` column; empty for inline SQL
    pub name: String,
    pub sql: String,
    /// Table name attributed to bare SELECT statements
    pub target_table: Option<String>,
}

/// Resolves the `--input` value into SQL sources.
///
/// Resolution order: an existing file wins, then an existing directory
/// (scanned recursively for `*.sql`), otherwise the value is treated as
/// inline SQL, which requires `--table` to name its result set.
pub fn resolve_input(input: &str, table: Option<&str>, quiet: bool) -> Result<Vec<SqlSource>> {
    let path = Path::new(input);

    if path.is_file() {
        warn_table_ignored(table, quiet);
        return Ok(vec![read_source(path)?]);
    }

    if path.is_dir() {
        warn_table_ignored(table, quiet);
        return read_directory(path);
    }

    let Some(table) = table else {
        bail!("inline SQL requires --table to name the result set");
    };
    Ok(vec![SqlSource {
        name: String::new(),
        sql: input.to_string(),
        target_table: Some(table.to_string()),
    }])
}

fn warn_table_ignored(table: Option<&str>, quiet: bool) {
    if table.is_some() && !quiet {
        eprintln!("sqlharvest: warning: --table is ignored when --input is a file or directory");
    }
}

/// The file stem doubles as the table name for bare SELECT files.
fn read_source(path: &Path) -> Result<SqlSource> {
    let sql = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(SqlSource {
        name: path.display().to_string(),
        sql,
        target_table: path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned()),
    })
}

fn read_directory(dir: &Path) -> Result<Vec<SqlSource>> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry
            .with_context(|| format!("Failed to read directory entry under {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        if path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("sql"))
            .unwrap_or(false)
        {
            paths.push(path);
        }
    }
    paths.sort();

    if paths.is_empty() {
        bail!("no .sql files found under {}", dir.display());
    }

    paths.iter().map(|path| read_source(path)).collect()
}
