#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Startup ingestion for the epidemic dashboard.
//!
//! Reads the three wide per-date CSV tables (confirmed, deaths, recovered),
//! reshapes each to one row per location and day, joins them under an
//! explicit [`JoinPolicy`], and sums sub-regions into per-country daily
//! totals. The result is an immutable [`Dataset`] that is built once by the
//! process entry point and shared read-only afterwards.

pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod join;
pub mod progress;
pub mod reshape;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use covid_dashboard_series_models::{JoinKey, LongRow, Metric};
use thiserror::Error;

pub use config::DatasetConfig;
pub use dataset::Dataset;
pub use join::JoinPolicy;

use crate::progress::ProgressCallback;

/// Errors that can occur while loading the dataset.
///
/// All of these are fatal at startup: a partially loaded dataset is never
/// served.
#[derive(Debug, Error)]
pub enum IngestError {
    /// A data or config file could not be opened or read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        /// The file that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// CSV framing error (unequal row lengths, invalid UTF-8, ...).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration file could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// A date header, coordinate, or count cell could not be parsed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of what went wrong, including its location.
        message: String,
    },

    /// A confirmed row has no counterpart in a lookup table under
    /// [`JoinPolicy::Strict`].
    #[error("Join key mismatch: no {metric} row for {key}")]
    JoinKeyMismatch {
        /// Lookup table that is missing the key.
        metric: Metric,
        /// The unmatched key.
        key: JoinKey,
    },

    /// There were no rows to aggregate.
    #[error("No rows to aggregate")]
    EmptyInput,
}

/// Number of progress steps reported by [`load_dataset`]: one per metric
/// file, then join, then aggregate.
pub const LOAD_STEPS: u64 = 5;

/// Loads, reshapes, joins, and aggregates the configured input files into a
/// [`Dataset`].
///
/// On failure the progress indicator is cleared before the error is
/// returned.
///
/// # Errors
///
/// Returns [`IngestError`] if any file cannot be read or parsed, if the join
/// policy rejects a missing key, or if nothing is left to aggregate.
pub fn load_dataset(
    config: &DatasetConfig,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Dataset, IngestError> {
    let start = Instant::now();
    progress.set_total(LOAD_STEPS);

    let dataset = match build_dataset(config, progress) {
        Ok(dataset) => dataset,
        Err(e) => {
            progress.finish_and_clear();
            return Err(e);
        }
    };

    log::info!(
        "Loaded {} countries ({} country-days) in {:.1}s",
        dataset.country_count(),
        dataset.row_count(),
        start.elapsed().as_secs_f64()
    );
    if let Some((first, last)) = dataset.date_range() {
        log::info!("Reporting dates span {first} to {last}");
    }
    progress.finish(format!(
        "Loaded {} countries ({} country-days)",
        dataset.country_count(),
        dataset.row_count()
    ));

    Ok(dataset)
}

fn build_dataset(
    config: &DatasetConfig,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Dataset, IngestError> {
    let confirmed = read_metric(config, Metric::Confirmed, progress)?;
    let deaths = read_metric(config, Metric::Deaths, progress)?;
    let recovered = read_metric(config, Metric::Recovered, progress)?;

    progress.set_message(format!("Joining metrics ({})", config.join_policy));
    let joined = join::join(&confirmed, &deaths, &recovered, config.join_policy)?;
    progress.inc(1);

    progress.set_message("Aggregating per-country totals".to_string());
    let totals = aggregate::aggregate(&joined)?;
    progress.inc(1);

    Ok(Dataset::from_totals(totals).with_default_country(config.default_country.clone()))
}

/// Reads and reshapes the file configured for `metric`.
fn read_metric(
    config: &DatasetConfig,
    metric: Metric,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<LongRow>, IngestError> {
    let path = config.files.path(metric);
    progress.set_message(format!("Reading {metric} from {}", path.display()));
    log::info!("Reading {metric} table from {}", path.display());

    let table = reshape::read_wide_table_from_path(path, metric)?;
    let rows = reshape::reshape(&table);
    log::info!(
        "{metric}: {} locations x {} dates -> {} rows",
        table.rows.len(),
        table.dates.len(),
        rows.len()
    );
    progress.inc(1);

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Mutex;

    use super::*;
    use crate::config::DataFiles;
    use crate::progress::null_progress;

    fn write_fixture(dir: &std::path::Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    /// Records which terminal callback the load ended with.
    #[derive(Default)]
    struct RecordingProgress {
        steps: Mutex<u64>,
        ended: Mutex<Option<&'static str>>,
    }

    impl ProgressCallback for RecordingProgress {
        fn set_total(&self, _total: u64) {}
        fn inc(&self, delta: u64) {
            *self.steps.lock().unwrap() += delta;
        }
        fn set_message(&self, _msg: String) {}
        fn finish(&self, _msg: String) {
            *self.ended.lock().unwrap() = Some("finish");
        }
        fn finish_and_clear(&self) {
            *self.ended.lock().unwrap() = Some("finish_and_clear");
        }
    }

    fn fixture_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "covid_dashboard_ingest_{name}_{}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_dataset_end_to_end() {
        let dir = fixture_dir("end_to_end");
        let header = "Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20\n";
        let confirmed = write_fixture(
            &dir,
            "confirmed.csv",
            &format!(
                "{header},Spain,40.0,-4.0,1,3,6\nOntario,Canada,51.2,-85.3,0,2,2\nQuebec,Canada,52.9,-73.5,1,1,4\n"
            ),
        );
        let deaths = write_fixture(
            &dir,
            "deaths.csv",
            &format!(
                "{header},Spain,40.0,-4.0,0,0,1\nOntario,Canada,51.2,-85.3,0,0,1\nQuebec,Canada,52.9,-73.5,0,0,0\n"
            ),
        );
        let recovered = write_fixture(
            &dir,
            "recovered.csv",
            &format!(
                "{header},Spain,40.0,-4.0,0,1,1\nOntario,Canada,51.2,-85.3,0,0,0\nQuebec,Canada,52.9,-73.5,0,1,1\n"
            ),
        );

        let config = DatasetConfig {
            files: DataFiles {
                confirmed,
                deaths,
                recovered,
            },
            join_policy: JoinPolicy::Inner,
            default_country: Some("Spain".to_string()),
            static_dir: None,
        };

        let recorder = Arc::new(RecordingProgress::default());
        let progress: Arc<dyn ProgressCallback> = recorder.clone();
        let dataset = load_dataset(&config, &progress).unwrap();
        assert_eq!(*recorder.steps.lock().unwrap(), LOAD_STEPS);
        assert_eq!(*recorder.ended.lock().unwrap(), Some("finish"));
        assert_eq!(dataset.countries().collect::<Vec<_>>(), ["Canada", "Spain"]);
        assert_eq!(dataset.default_country(), Some("Spain"));

        let canada = dataset.series("Canada").unwrap();
        assert_eq!(canada.len(), 3);
        assert_eq!(
            canada.iter().map(|r| r.confirmed).collect::<Vec<_>>(),
            [1, 3, 6]
        );
        assert_eq!(canada[2].deaths, 1);
        assert_eq!(canada[2].recovered, 1);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn missing_file_is_fatal() {
        let config = DatasetConfig {
            files: DataFiles {
                confirmed: PathBuf::from("/nonexistent/confirmed.csv"),
                deaths: PathBuf::from("/nonexistent/deaths.csv"),
                recovered: PathBuf::from("/nonexistent/recovered.csv"),
            },
            join_policy: JoinPolicy::Inner,
            default_country: None,
            static_dir: None,
        };
        match load_dataset(&config, &null_progress()) {
            Err(IngestError::Read { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/confirmed.csv"));
            }
            other => panic!("expected a read error, got {other:?}"),
        }
    }

    #[test]
    fn failed_load_clears_progress() {
        let dir = fixture_dir("failed_load");
        let confirmed = write_fixture(
            &dir,
            "confirmed.csv",
            "Province/State,Country/Region,Lat,Long,1/22/20\n,Spain,40.0,-4.0,1\n",
        );
        let config = DatasetConfig {
            files: DataFiles {
                confirmed,
                deaths: dir.join("missing_deaths.csv"),
                recovered: dir.join("missing_recovered.csv"),
            },
            join_policy: JoinPolicy::Inner,
            default_country: None,
            static_dir: None,
        };

        let recorder = Arc::new(RecordingProgress::default());
        let progress: Arc<dyn ProgressCallback> = recorder.clone();
        let err = load_dataset(&config, &progress).unwrap_err();

        assert!(err.to_string().contains("missing_deaths.csv"));
        assert_eq!(*recorder.steps.lock().unwrap(), 1);
        assert_eq!(*recorder.ended.lock().unwrap(), Some("finish_and_clear"));

        fs::remove_dir_all(dir).ok();
    }
}
