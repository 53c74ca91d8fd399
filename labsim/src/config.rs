use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{CONFIG_FILENAME, DATABASE_ENV};
use crate::engine::EngineConfig;
use crate::similarity::ScoreWeights;

#[derive(Debug, Deserialize, Default, Clone)]
/// Top-level configuration struct.
pub struct Config {
    #[serde(default)]
    /// The `[labsim]` section.
    pub labsim: LabSimConfig,
    /// The path to the configuration file this was loaded from.
    /// Set during `load_from_path`, `None` if using defaults or programmatic config.
    #[serde(skip)]
    pub config_file_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone)]
/// Configuration options for labsim.
pub struct LabSimConfig {
    /// Default report threshold (0-100).
    pub report_threshold: Option<f64>,
    /// Flag threshold (0-100).
    pub flag_threshold: Option<f64>,
    /// SQLite database path, relative to the config file.
    pub database: Option<PathBuf>,
    /// Signal weights. Missing keys keep their defaults.
    pub weights: Option<ScoreWeights>,
}

impl Config {
    /// Loads configuration from `labsim.toml` in the current directory or any parent.
    #[must_use]
    pub fn load() -> Self {
        Self::load_from_path(Path::new("."))
    }

    /// Loads configuration starting from a specific path and traversing up.
    ///
    /// A file that exists but does not parse is reported and skipped.
    #[must_use]
    pub fn load_from_path(path: &Path) -> Self {
        let mut current = path.to_path_buf();
        if current.is_file() {
            current.pop();
        }

        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                match fs::read_to_string(&candidate).map(|content| toml::from_str::<Self>(&content))
                {
                    Ok(Ok(mut config)) => {
                        config.config_file_path = Some(candidate);
                        return config;
                    }
                    Ok(Err(e)) => {
                        tracing::warn!(
                            path = %candidate.display(),
                            error = %e,
                            "ignoring invalid config file"
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %candidate.display(),
                            error = %e,
                            "cannot read config file"
                        );
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        Config::default()
    }

    /// Loads one specific configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_file_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Engine thresholds and weights, defaults filled in.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        let weights = self.labsim.weights.unwrap_or(defaults.weights);
        let total = weights.jaccard + weights.ngram3 + weights.ngram5;
        if (total - 1.0).abs() > 1e-6 {
            tracing::warn!(total, "similarity weights do not sum to 1; scores may exceed 100");
        }
        EngineConfig {
            report_threshold: threshold_or_default(
                "report_threshold",
                self.labsim.report_threshold,
                defaults.report_threshold,
            ),
            flag_threshold: threshold_or_default(
                "flag_threshold",
                self.labsim.flag_threshold,
                defaults.flag_threshold,
            ),
            weights,
        }
    }

    /// Database path: `LABSIM_DB` first, then `database` resolved against the config file's
    /// directory.
    #[must_use]
    pub fn database_path(&self) -> Option<PathBuf> {
        if let Some(from_env) = std::env::var_os(DATABASE_ENV).filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(from_env));
        }
        let configured = self.labsim.database.as_ref()?;
        if configured.is_absolute() {
            return Some(configured.clone());
        }
        let base = self
            .config_file_path
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or_else(|| Path::new("."));
        Some(base.join(configured))
    }
}

/// Configured threshold if it lies in `[0, 100]`, otherwise the default.
fn threshold_or_default(key: &str, configured: Option<f64>, default: f64) -> f64 {
    match configured {
        Some(value) if (0.0..=100.0).contains(&value) => value,
        Some(value) => {
            tracing::warn!(
                key,
                value,
                default,
                "configured threshold outside 0-100; using default"
            );
            default
        }
        None => default,
    }
}
