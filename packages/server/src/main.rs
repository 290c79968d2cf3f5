#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone entry point for the dashboard API server.
//!
//! Loads the dataset named by `COVID_DASHBOARD_CONFIG` (or the embedded
//! default config), then serves it on `BIND_ADDR:PORT`.

use std::sync::Arc;

use covid_dashboard_ingest::progress::null_progress;
use covid_dashboard_ingest::{DatasetConfig, load_dataset};
use covid_dashboard_server::{ServerConfig, run_server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    // Startup errors are fatal: never serve a partial dataset.
    let loaded = DatasetConfig::resolve(None).and_then(|config| {
        let dataset = load_dataset(&config, &null_progress())?;
        Ok((config, dataset))
    });
    let (config, dataset) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            log::error!("Failed to load dataset: {e}");
            std::process::exit(1);
        }
    };

    run_server(Arc::new(dataset), ServerConfig::from_env(config.static_dir)).await
}
