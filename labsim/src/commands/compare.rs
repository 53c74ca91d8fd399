//! Compare command.

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use crate::api::{handle_compare_args, Caller};
use crate::engine::{ComparisonEngine, EngineConfig, RunOutcome};
use crate::store::SqliteStore;

/// Options for the compare command.
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Lab to compare.
    pub lab_id: String,
    /// Report threshold; `None` uses the configured default.
    pub threshold: Option<f64>,
    /// Print the response JSON.
    pub json: bool,
    /// Thresholds and weights.
    pub engine: EngineConfig,
}

/// Run a comparison against the database at `db`.
///
/// Returns exit code 1 when the run fails.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or output cannot be written.
pub async fn run_compare<W: Write>(
    db: &Path,
    options: &CompareOptions,
    writer: &mut W,
) -> Result<i32> {
    let store = Arc::new(
        SqliteStore::open(db)
            .await
            .with_context(|| format!("failed to open database {}", db.display()))?,
    );
    let engine = ComparisonEngine::with_config(store.clone(), store, options.engine);

    if options.json {
        let caller = Caller::Authenticated {
            user_id: "local".to_owned(),
        };
        let response =
            handle_compare_args(&engine, &caller, &options.lab_id, options.threshold).await;
        writeln!(writer, "{}", serde_json::to_string_pretty(&response.body)?)?;
        return Ok(i32::from(!response.is_success()));
    }

    let spinner = crate::output::create_spinner(&options.lab_id);
    let outcome = engine.run(&options.lab_id, options.threshold).await;
    spinner.finish_and_clear();

    match outcome {
        Ok(RunOutcome::InsufficientData { authors }) => {
            crate::output::print_header(writer, &options.lab_id)?;
            crate::output::print_insufficient(writer, authors)?;
            Ok(0)
        }
        Ok(RunOutcome::Completed(summary)) => {
            crate::output::print_header(writer, &options.lab_id)?;
            crate::output::print_summary_pills(writer, &summary)?;
            crate::output::print_comparisons(writer, &summary.results)?;
            Ok(0)
        }
        Err(e) => {
            eprintln!("{} {e}", "Error:".red().bold());
            Ok(1)
        }
    }
}
