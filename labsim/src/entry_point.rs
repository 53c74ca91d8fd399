use crate::cli::{Cli, Commands};
use crate::commands::{resolve_database, run_compare, run_import, run_results, CompareOptions};
use crate::config::Config;
use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::Path;

/// Runs labsim with the given arguments.
///
/// # Errors
///
/// Returns an error if the async runtime cannot start or output cannot be written.
pub fn run_with_args(args: Vec<String>) -> Result<i32> {
    run_with_args_to(args, &mut std::io::stdout())
}

/// Run labsim with the given arguments, writing output to the specified writer.
///
/// This is the testable version of `run_with_args` that allows output capture.
///
/// # Errors
///
/// Returns an error if the async runtime cannot start or output cannot be written.
pub fn run_with_args_to<W: std::io::Write>(args: Vec<String>, writer: &mut W) -> Result<i32> {
    let mut program_args = vec!["labsim".to_owned()];
    program_args.extend(args);
    let cli_var = match Cli::try_parse_from(program_args) {
        Ok(c) => c,
        Err(e) => match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                write!(writer, "{e}")?;
                writer.flush()?;
                return Ok(0);
            }
            _ => {
                eprint!("{e}");
                return Ok(1);
            }
        },
    };

    crate::logging::init(cli_var.verbose);

    let config = match cli_var.config.as_deref() {
        Some(path) if path.is_file() => match Config::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{} invalid config {}: {e}", "Error:".red().bold(), path.display());
                return Ok(1);
            }
        },
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    if let Some(path) = &config.config_file_path {
        tracing::debug!(path = %path.display(), "using config file");
    }

    let db = match resolve_database(cli_var.db.as_deref(), &config) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{} {e}", "Error:".red().bold());
            return Ok(1);
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let outcome = runtime.block_on(dispatch(cli_var.command, &config, &db, writer));
    match outcome {
        Ok(code) => Ok(code),
        Err(e) => {
            eprintln!("{} {e:#}", "Error:".red().bold());
            Ok(1)
        }
    }
}

async fn dispatch<W: std::io::Write>(
    command: Commands,
    config: &Config,
    db: &Path,
    writer: &mut W,
) -> Result<i32> {
    match command {
        Commands::Import { file } => {
            if !file.exists() {
                eprintln!("Error: The file '{}' does not exist.", file.display());
                return Ok(1);
            }
            run_import(db, &file, writer).await
        }
        Commands::Compare {
            lab_id,
            threshold,
            flag_threshold,
            json,
        } => {
            let mut engine = config.engine_config();
            if let Some(flag) = flag_threshold {
                if !(0.0..=100.0).contains(&flag) {
                    anyhow::bail!("flag threshold must be between 0 and 100, got {flag}");
                }
                engine.flag_threshold = flag;
            }
            let options = CompareOptions {
                lab_id,
                threshold,
                json,
                engine,
            };
            run_compare(db, &options, writer).await
        }
        Commands::Results { lab_id, json } => run_results(db, &lab_id, json, writer).await,
    }
}
