//! Import command.

use anyhow::{Context, Result};
use colored::Colorize;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::io::Write;
use std::path::Path;

use crate::engine::Submission;
use crate::store::SqliteStore;

/// One entry of an import file: a submission plus the lab it belongs to.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
    /// Lab id.
    pub lab_id: String,
    /// Submission fields.
    #[serde(flatten)]
    pub submission: Submission,
}

/// Parse an import file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a JSON array of records.
pub fn read_import_file(path: &Path) -> Result<Vec<ImportRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid import file {}", path.display()))
}

/// Load the submissions in `file` into the database at `db`.
///
/// # Errors
///
/// Returns an error if the file is invalid or the database write fails.
pub async fn run_import<W: Write>(db: &Path, file: &Path, writer: &mut W) -> Result<i32> {
    let records = read_import_file(file)?;
    let mut by_lab: FxHashMap<String, Vec<Submission>> = FxHashMap::default();
    for record in records {
        by_lab.entry(record.lab_id).or_default().push(record.submission);
    }

    let store = SqliteStore::open(db)
        .await
        .with_context(|| format!("failed to open database {}", db.display()))?;

    let mut labs: Vec<_> = by_lab.into_iter().collect();
    labs.sort_by(|a, b| a.0.cmp(&b.0));

    let mut total = 0;
    for (lab_id, submissions) in labs {
        let written = store.insert_submissions(&lab_id, submissions).await?;
        tracing::info!(lab_id = %lab_id, written, "submissions imported");
        writeln!(
            writer,
            "{} {} submission(s) into lab {}",
            "Imported".green().bold(),
            written,
            lab_id.bold()
        )?;
        total += written;
    }
    if total == 0 {
        writeln!(writer, "{}", "Nothing to import.".yellow())?;
    }
    Ok(0)
}
