//! Dataset configuration loaded from TOML.
//!
//! The default configuration is baked into the binary at compile time via
//! [`include_str!`]. A different file can be selected with the `--config`
//! CLI flag or the [`CONFIG_ENV_VAR`] environment variable.

use std::path::{Path, PathBuf};

use covid_dashboard_series_models::Metric;
use serde::{Deserialize, Serialize};

use crate::IngestError;
use crate::join::JoinPolicy;

/// Environment variable naming a config file to use instead of the embedded
/// default.
pub const CONFIG_ENV_VAR: &str = "COVID_DASHBOARD_CONFIG";

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Everything the loader needs to build a [`crate::Dataset`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Paths to the three wide CSV tables.
    pub files: DataFiles,
    /// How confirmed rows without deaths/recovered matches are handled.
    #[serde(default)]
    pub join_policy: JoinPolicy,
    /// Country the dashboard opens on.
    #[serde(default)]
    pub default_country: Option<String>,
    /// Pre-built frontend directory served at `/`, if present.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

/// Input file paths, one per metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFiles {
    /// Cumulative confirmed cases.
    pub confirmed: PathBuf,
    /// Cumulative deaths.
    pub deaths: PathBuf,
    /// Cumulative recoveries.
    pub recovered: PathBuf,
}

impl DataFiles {
    /// Returns the path configured for `metric`.
    #[must_use]
    pub fn path(&self, metric: Metric) -> &Path {
        match metric {
            Metric::Confirmed => &self.confirmed,
            Metric::Deaths => &self.deaths,
            Metric::Recovered => &self.recovered,
        }
    }
}

/// Parses a TOML configuration string.
///
/// # Errors
///
/// Returns [`IngestError::Config`] if the TOML is malformed or missing
/// required fields.
pub fn parse_config(toml_str: &str) -> Result<DatasetConfig, IngestError> {
    Ok(toml::de::from_str(toml_str)?)
}

impl DatasetConfig {
    /// Returns the configuration embedded at compile time.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (covered by tests).
    #[must_use]
    pub fn embedded_default() -> Self {
        parse_config(DEFAULT_CONFIG)
            .unwrap_or_else(|e| panic!("Failed to parse embedded default config: {e}"))
    }

    /// Reads a config file. Relative paths inside it are resolved against
    /// the file's own directory.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Read`] if the file cannot be read, or
    /// [`IngestError::Config`] if it is not a valid config.
    pub fn from_file(path: &Path) -> Result<Self, IngestError> {
        let contents = std::fs::read_to_string(path).map_err(|source| IngestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = parse_config(&contents)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.rebased(base))
    }

    /// Picks the config file from `cli_path`, then [`CONFIG_ENV_VAR`], then
    /// falls back to the embedded default.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] if a selected file cannot be read or parsed.
    pub fn resolve(cli_path: Option<&Path>) -> Result<Self, IngestError> {
        let env_path = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);

        match cli_path.map(Path::to_path_buf).or(env_path) {
            Some(path) => {
                log::info!("Using config file {}", path.display());
                Self::from_file(&path)
            }
            None => {
                log::info!("Using embedded default config");
                Ok(Self::embedded_default())
            }
        }
    }

    fn rebased(self, base: &Path) -> Self {
        let rebase = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };

        Self {
            files: DataFiles {
                confirmed: rebase(self.files.confirmed),
                deaths: rebase(self.files.deaths),
                recovered: rebase(self.files.recovered),
            },
            static_dir: self.static_dir.map(rebase),
            ..self
        }
    }
}
