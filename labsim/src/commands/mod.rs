//! Commands module - CLI subcommand implementations.

mod compare;
mod import;
mod results;
mod utils;

pub use compare::{run_compare, CompareOptions};
pub use import::{read_import_file, run_import, ImportRecord};
pub use results::run_results;
pub use utils::resolve_database;
