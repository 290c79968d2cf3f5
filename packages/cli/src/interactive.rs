//! Interactive menu shown when no subcommand is given.

use std::sync::Arc;

use covid_dashboard_ingest::{Dataset, DatasetConfig};
use covid_dashboard_server_models::DashboardQueryParams;
use dialoguer::{Confirm, Input, Select};

use crate::report;

/// Top-level actions.
enum Tool {
    Report,
    Countries,
    Server,
}

impl Tool {
    const ALL: &[Self] = &[Self::Report, Self::Countries, Self::Server];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Report => "Show a country's dashboard",
            Self::Countries => "List countries",
            Self::Server => "Start server",
        }
    }
}

/// Prompts for an action and runs it.
///
/// # Errors
///
/// Returns an error if a prompt fails, the selected window is invalid, or
/// the server fails to start.
pub async fn run(
    dataset: Dataset,
    config: DatasetConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Epidemic Dashboard");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Report => {
            let params = prompt_query(&dataset)?;
            let output = report::build(&dataset, &params)?;
            print!("{}", report::summary(&output));
        }
        Tool::Countries => {
            for country in dataset.countries() {
                println!("{country}");
            }
        }
        Tool::Server => {
            let dataset = Arc::new(dataset);
            let static_dir = config.static_dir;
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(move || {
                actix_web::rt::System::new()
                    .block_on(covid_dashboard_server::interactive::run(dataset, static_dir))
            })
            .await??;
        }
    }

    Ok(())
}

/// Asks for a country, a date window, and the axis scale.
fn prompt_query(dataset: &Dataset) -> Result<DashboardQueryParams, Box<dyn std::error::Error>> {
    let countries: Vec<&str> = dataset.countries().collect();
    if countries.is_empty() {
        return Err("The dataset has no countries".into());
    }

    let default_idx = dataset
        .default_country()
        .and_then(|d| countries.iter().position(|c| *c == d))
        .unwrap_or(0);

    let idx = Select::new()
        .with_prompt("Country")
        .items(&countries)
        .default(default_idx)
        .max_length(15)
        .interact()?;
    let country = countries[idx].to_string();

    let dates = dataset.dates(&country).unwrap_or_default();
    let last_index = dates.len().saturating_sub(1);
    if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
        println!(
            "{country} has {} dates: offset 0 = {first}, offset {last_index} = {last}",
            dates.len()
        );
    }

    let start: usize = Input::new()
        .with_prompt("Start offset")
        .default(0)
        .interact_text()?;

    let end: usize = Input::new()
        .with_prompt("End offset")
        .default(last_index)
        .interact_text()?;

    let log_scale = Confirm::new()
        .with_prompt("Use a logarithmic axis?")
        .default(false)
        .interact()?;

    Ok(DashboardQueryParams {
        country,
        start: Some(start),
        end: Some(end),
        log_scale: Some(log_scale),
    })
}
