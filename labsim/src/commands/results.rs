//! Results command.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::store::{ResultStore, SqliteStore};

/// Print the stored comparison rows of `lab_id`.
///
/// # Errors
///
/// Returns an error if the database cannot be read or output cannot be written.
pub async fn run_results<W: Write>(db: &Path, lab_id: &str, json: bool, writer: &mut W) -> Result<i32> {
    let store = SqliteStore::open(db)
        .await
        .with_context(|| format!("failed to open database {}", db.display()))?;
    let rows = store.lab_results(lab_id).await?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&rows)?)?;
    } else {
        crate::output::print_header(writer, lab_id)?;
        crate::output::print_comparisons(writer, &rows)?;
    }
    Ok(0)
}
