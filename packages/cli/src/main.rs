#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the epidemic dashboard.
//!
//! Loads the dataset once (behind an `indicatif` progress bar), then either
//! runs a single subcommand or, with no subcommand, an interactive menu.
//!
//! Uses `indicatif-log-bridge` (via [`covid_dashboard_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod interactive;
mod report;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use covid_dashboard_analytics::AnalyticsError;
use covid_dashboard_cli_utils::{IndicatifProgress, MultiProgress};
use covid_dashboard_ingest::{Dataset, DatasetConfig, IngestError, LOAD_STEPS, load_dataset};
use covid_dashboard_server::ServerConfig;
use covid_dashboard_server_models::DashboardQueryParams;

#[derive(Parser)]
#[command(name = "covid_dashboard", about = "Epidemic time-series dashboard")]
struct Cli {
    /// Config file to load (overrides `COVID_DASHBOARD_CONFIG`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every country in the dataset
    Countries,
    /// List a country's reporting dates with their range offsets
    Dates {
        /// Country name (e.g., "Spain")
        country: String,
    },
    /// Print the dashboard series for one country as JSON
    Report {
        /// Country name (e.g., "Spain")
        country: String,
        /// First date offset (default: 0)
        #[arg(long)]
        start: Option<usize>,
        /// Last date offset (default: the last date)
        #[arg(long)]
        end: Option<usize>,
        /// Plot cases on a logarithmic axis
        #[arg(long)]
        log_scale: bool,
    },
    /// Start the API server
    Serve {
        /// Bind address (overrides `BIND_ADDR`)
        #[arg(long)]
        bind: Option<String>,
        /// Port (overrides `PORT`)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = covid_dashboard_cli_utils::init_logger();
    let cli = Cli::parse();

    // Startup errors are fatal: no subcommand runs on a partial dataset.
    let (config, dataset) = match load(&multi, cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            log::error!("Failed to load dataset: {e}");
            std::process::exit(1);
        }
    };

    let Some(command) = cli.command else {
        return interactive::run(dataset, config).await;
    };

    match command {
        Commands::Countries => {
            for country in dataset.countries() {
                println!("{country}");
            }
        }
        Commands::Dates { country } => {
            let dates = dataset
                .dates(&country)
                .ok_or(AnalyticsError::UnknownCountry { country })?;
            println!("{:>6}  DATE", "OFFSET");
            for (offset, date) in dates.iter().enumerate() {
                println!("{offset:>6}  {date}");
            }
        }
        Commands::Report {
            country,
            start,
            end,
            log_scale,
        } => {
            let params = DashboardQueryParams {
                country,
                start,
                end,
                log_scale: Some(log_scale),
            };
            let output = report::build(&dataset, &params)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Serve { bind, port } => {
            let mut server_config = ServerConfig::from_env(config.static_dir);
            if let Some(bind) = bind {
                server_config.bind_addr = bind;
            }
            if let Some(port) = port {
                server_config.port = port;
            }
            serve(dataset, server_config).await?;
        }
    }

    Ok(())
}

/// Resolves the config and loads its dataset behind a step progress bar.
fn load(
    multi: &MultiProgress,
    config_path: Option<&Path>,
) -> Result<(DatasetConfig, Dataset), IngestError> {
    let config = DatasetConfig::resolve(config_path)?;
    let progress = IndicatifProgress::steps_bar(multi, "Loading dataset", LOAD_STEPS);
    let dataset = load_dataset(&config, &progress)?;
    Ok((config, dataset))
}

/// Runs the API server until it is shut down.
async fn serve(dataset: Dataset, config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = Arc::new(dataset);

    // The server uses actix-web's runtime, so we need to run it
    // in a blocking task to avoid nesting tokio runtimes.
    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(covid_dashboard_server::run_server(dataset, config))
    })
    .await??;

    Ok(())
}
