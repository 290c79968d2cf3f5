#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Per-request dashboard computation.
//!
//! [`compute`] is the single entry point the presentation layer calls: it
//! slices one country's window out of the shared [`Dataset`], derives daily
//! deltas, rolling means and correlations, and fits a linear trend. It is a
//! pure function of its inputs; nothing is cached between calls.

pub mod derived;
pub mod query;
pub mod trend;

use covid_dashboard_analytics_models::{DashboardOutput, DashboardQuery};
use covid_dashboard_ingest::Dataset;
use thiserror::Error;

/// Trailing window, in rows, used for every rolling mean.
pub const ROLLING_WINDOW: usize = 7;

/// Errors that can occur while answering a dashboard request.
///
/// These are recoverable: the server maps them to 4xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    /// The requested country is not in the dataset.
    #[error("Unknown country: {country}")]
    UnknownCountry {
        /// The name that was requested.
        country: String,
    },

    /// The date index window is outside the country's dates.
    #[error("Invalid date range [{start}, {end}]: must satisfy start <= end < {len}")]
    Range {
        /// Requested first offset.
        start: usize,
        /// Requested last offset.
        end: usize,
        /// Number of dates available.
        len: usize,
    },

    /// Not enough rows for the requested computation.
    #[error("Insufficient data: need at least {needed} rows, got {got}")]
    InsufficientData {
        /// Minimum number of rows.
        needed: usize,
        /// Rows provided.
        got: usize,
    },

    /// Paired inputs have different lengths.
    #[error("Length mismatch: expected {expected} values, got {got}")]
    LengthMismatch {
        /// Length of the first input.
        expected: usize,
        /// Length of the second input.
        got: usize,
    },
}

/// Answers one dashboard request.
///
/// A window with fewer than two rows has no trend line; every other series
/// is still returned.
///
/// # Errors
///
/// Returns [`AnalyticsError::UnknownCountry`] or [`AnalyticsError::Range`]
/// if the query does not address a valid window.
pub fn compute(
    dataset: &Dataset,
    query: &DashboardQuery,
) -> Result<DashboardOutput, AnalyticsError> {
    let window = query::select_window(dataset, &query.country, query.range)?;
    let derived = derived::derive(&window);

    let trend_fit = match trend::fit_trend(&derived.dates, &derived.daily_cases) {
        Ok(fit) => Some(fit),
        Err(AnalyticsError::InsufficientData { needed, got }) => {
            log::debug!(
                "{}: no trend for a {got}-row window (need {needed})",
                query.country
            );
            None
        }
        Err(e) => return Err(e),
    };

    log::debug!(
        "{}: computed {} rows [{}, {}] ({})",
        query.country,
        derived.dates.len(),
        query.range.start,
        query.range.end,
        query.options.y_axis()
    );

    Ok(DashboardOutput {
        country: query.country.clone(),
        y_axis: query.options.y_axis(),
        dates: derived.dates,
        daily_cases: derived.daily_cases,
        cumulative_cases: derived.cumulative_cases,
        daily_deaths: derived.daily_deaths,
        daily_recovered: derived.daily_recovered,
        rolling_means: derived.rolling_means,
        correlation_matrix: derived.correlation_matrix,
        trend_fit,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use covid_dashboard_analytics_models::{AxisScale, DashboardOptions, DateRange};
    use covid_dashboard_series_models::CountryDayTotal;

    use super::*;

    fn dataset(confirmed: &[u64]) -> Dataset {
        let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        Dataset::from_totals(
            confirmed
                .iter()
                .zip(start.iter_days())
                .map(|(c, date)| CountryDayTotal {
                    country: "Testland".to_string(),
                    date,
                    confirmed: *c,
                    deaths: c / 10,
                    recovered: c / 2,
                })
                .collect(),
        )
    }

    fn query(start: usize, end: usize, log_scale: bool) -> DashboardQuery {
        DashboardQuery {
            country: "Testland".to_string(),
            range: DateRange::new(start, end),
            options: DashboardOptions { log_scale },
        }
    }

    #[test]
    fn computes_full_window() {
        let data = dataset(&[10, 15, 13, 20]);
        let out = compute(&data, &query(0, 3, false)).unwrap();

        assert_eq!(out.country, "Testland");
        assert_eq!(out.y_axis, AxisScale::Linear);
        assert_eq!(out.dates.len(), 4);
        assert_eq!(out.daily_cases, [10, 5, -2, 7]);
        assert_eq!(out.cumulative_cases, [10, 15, 13, 20]);
        assert!(out.rolling_means.daily_cases.iter().all(Option::is_none));

        let trend = out.trend_fit.unwrap();
        assert_eq!(trend.points.len(), 4);
        assert_eq!(trend.smoothed.len(), 4);
    }

    #[test]
    fn log_scale_sets_axis() {
        let data = dataset(&[1, 2, 3]);
        let out = compute(&data, &query(0, 2, true)).unwrap();
        assert_eq!(out.y_axis, AxisScale::Log);
    }

    #[test]
    fn sub_window_returns_requested_rows() {
        let data = dataset(&[1, 2, 4, 8, 16]);
        let out = compute(&data, &query(1, 2, false)).unwrap();
        assert_eq!(out.cumulative_cases, [2, 4]);
        assert!(out.dates[0] < out.dates[1]);
        // The first row of a window has no predecessor.
        assert_eq!(out.daily_cases, [2, 2]);
    }

    #[test]
    fn single_row_window_has_no_trend() {
        let data = dataset(&[1, 2, 4]);
        let out = compute(&data, &query(2, 2, false)).unwrap();
        assert_eq!(out.daily_cases, [4]);
        assert!(out.trend_fit.is_none());
    }

    #[test]
    fn unknown_country_and_bad_range_are_errors() {
        let data = dataset(&[1, 2, 4]);
        let mut q = query(0, 2, false);
        q.country = "Atlantis".to_string();
        assert_eq!(
            compute(&data, &q),
            Err(AnalyticsError::UnknownCountry {
                country: "Atlantis".to_string()
            })
        );

        assert_eq!(
            compute(&data, &query(0, 3, false)),
            Err(AnalyticsError::Range {
                start: 0,
                end: 3,
                len: 3
            })
        );
    }
}
