//! Shared utilities for command implementations.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Pick the database path: the `--db` flag, then `LABSIM_DB`, then the config file.
///
/// # Errors
///
/// Fails when none of them names a database.
pub fn resolve_database(flag: Option<&Path>, config: &Config) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }
    match config.database_path() {
        Some(path) => Ok(path),
        None => bail!("no database given; pass --db, set LABSIM_DB or add `database` to labsim.toml"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins() {
        let config = Config::default();
        let path = resolve_database(Some(Path::new("x.db")), &config).unwrap();
        assert_eq!(path, PathBuf::from("x.db"));
    }
}
