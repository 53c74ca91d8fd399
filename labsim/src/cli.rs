use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Help text for configuration file options, shown at the bottom of --help.
const CONFIG_HELP: &str = "\
CONFIGURATION FILE (labsim.toml):
  Searched in the current directory and its parents.

  [labsim]
  report_threshold = 50      # Keep pairs scoring at least this (0-100)
  flag_threshold = 70        # Flag pairs scoring at least this (0-100)
  database = \"labsim.db\"     # SQLite file, relative to this config file

  [labsim.weights]
  jaccard = 0.30             # Token-set overlap
  ngram3 = 0.40              # 3-token sequence overlap
  ngram5 = 0.30              # 5-token sequence overlap

ENVIRONMENT:
  LABSIM_DB                  Database path (overrides the config file)
  LABSIM_LOG                 Log filter, e.g. labsim=debug
";

/// Command line interface configuration using `clap`.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "labsim - similarity checking for coding-lab submissions",
    long_about = None,
    after_help = CONFIG_HELP
)]
pub struct Cli {
    #[command(subcommand)]
    /// The subcommand to execute.
    pub command: Commands,

    /// SQLite database holding submissions and comparison results.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Explicit configuration file or directory to search from.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
/// Available subcommands.
pub enum Commands {
    /// Load submissions from a JSON file into the database.
    Import {
        /// JSON array of `{id, labId, authorId, sourceCode, language, score}` objects.
        file: PathBuf,
    },
    /// Compare all submissions of a lab and replace its stored results.
    Compare {
        /// Lab to compare.
        lab_id: String,

        /// Minimum score (0-100) for a pair to be kept.
        #[arg(long, short = 't')]
        threshold: Option<f64>,

        /// Score (0-100) at or above which a kept pair is flagged (overrides config).
        #[arg(long)]
        flag_threshold: Option<f64>,

        /// Print the response JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Show stored comparison results of a lab.
    Results {
        /// Lab to show.
        lab_id: String,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}
