#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the dashboard server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the analytics types to allow independent evolution of the API
//! contract; the dashboard response itself is
//! [`covid_dashboard_analytics_models::DashboardOutput`].

use chrono::NaiveDate;
use covid_dashboard_analytics_models::{DashboardOptions, DashboardQuery, DateRange};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Country list for the selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCountries {
    /// Known countries, sorted by name.
    pub countries: Vec<String>,
    /// Country the dashboard opens on.
    pub default_country: Option<String>,
}

/// Reporting dates of one country, used to label the range slider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCountryDates {
    /// Country name.
    pub country: String,
    /// Sorted reporting dates; slider offsets index into this list.
    pub dates: Vec<NaiveDate>,
}

/// Error body returned with every 4xx/5xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Wraps any displayable error.
    pub fn new(error: impl std::fmt::Display) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

/// Query parameters for the dashboard endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQueryParams {
    /// Country to display.
    pub country: String,
    /// First date offset (defaults to 0).
    pub start: Option<usize>,
    /// Last date offset (defaults to the last date).
    pub end: Option<usize>,
    /// Plot cases on a logarithmic axis.
    pub log_scale: Option<bool>,
}

impl DashboardQueryParams {
    /// Builds the analytics query, filling omitted offsets from
    /// `last_index` (the country's final date offset).
    #[must_use]
    pub fn to_query(&self, last_index: usize) -> DashboardQuery {
        DashboardQuery {
            country: self.country.clone(),
            range: DateRange::new(self.start.unwrap_or(0), self.end.unwrap_or(last_index)),
            options: DashboardOptions {
                log_scale: self.log_scale.unwrap_or(false),
            },
        }
    }
}
