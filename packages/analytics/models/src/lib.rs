#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Query and result types for the dashboard computation.
//!
//! [`DashboardQuery`] is what the presentation layer sends (country, date
//! index window, display options); [`DashboardOutput`] is what it gets back.
//! Both serialize to camelCase JSON for the HTTP API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Y-axis scale requested for the case charts.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AxisScale {
    /// Linear axis.
    #[default]
    Linear,
    /// Logarithmic axis.
    Log,
}

/// Display options chosen by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOptions {
    /// Plot case counts on a logarithmic axis.
    #[serde(default)]
    pub log_scale: bool,
}

impl DashboardOptions {
    /// The axis scale implied by these options.
    #[must_use]
    pub const fn y_axis(self) -> AxisScale {
        if self.log_scale {
            AxisScale::Log
        } else {
            AxisScale::Linear
        }
    }
}

/// Inclusive window of zero-based offsets into a country's sorted dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// First offset (inclusive).
    pub start: usize,
    /// Last offset (inclusive).
    pub end: usize,
}

impl DateRange {
    /// Creates a range covering `start..=end`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A single dashboard request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQuery {
    /// Country to display.
    pub country: String,
    /// Window of date offsets.
    pub range: DateRange,
    /// Display options.
    #[serde(default)]
    pub options: DashboardOptions,
}

/// The three daily-delta series, in correlation matrix order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DailySeries {
    /// Daily confirmed cases.
    DailyCases,
    /// Daily deaths (clamped at 0).
    DailyDeaths,
    /// Daily recoveries.
    DailyRecovered,
}

impl DailySeries {
    /// Row/column index in [`CorrelationMatrix::values`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// 7-row trailing means of each daily series. The first six entries of
/// every window are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingMeans {
    /// Mean of daily confirmed cases.
    pub daily_cases: Vec<Option<f64>>,
    /// Mean of daily deaths.
    pub daily_deaths: Vec<Option<f64>>,
    /// Mean of daily recoveries.
    pub daily_recovered: Vec<Option<f64>>,
}

/// Pearson correlations between the three daily series.
///
/// An entry is `None` (serialized as `null`) when either series has zero
/// variance in the window or the window has fewer than two rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationMatrix {
    /// Row/column labels.
    pub labels: [DailySeries; 3],
    /// `values[i][j]` is the correlation between `labels[i]` and `labels[j]`.
    pub values: [[Option<f64>; 3]; 3],
}

impl CorrelationMatrix {
    /// A matrix with every entry undefined.
    #[must_use]
    pub const fn undefined() -> Self {
        Self {
            labels: [
                DailySeries::DailyCases,
                DailySeries::DailyDeaths,
                DailySeries::DailyRecovered,
            ],
            values: [[None; 3]; 3],
        }
    }

    /// Correlation between two series.
    #[must_use]
    pub const fn get(&self, a: DailySeries, b: DailySeries) -> Option<f64> {
        self.values[a.index()][b.index()]
    }
}

impl Default for CorrelationMatrix {
    fn default() -> Self {
        Self::undefined()
    }
}

/// Everything derived from one window of a country's cumulative series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedSeries {
    /// Reporting dates of the window.
    pub dates: Vec<NaiveDate>,
    /// Cumulative confirmed cases.
    pub cumulative_cases: Vec<u64>,
    /// Cumulative deaths.
    pub cumulative_deaths: Vec<u64>,
    /// Cumulative recoveries.
    pub cumulative_recovered: Vec<u64>,
    /// Daily confirmed cases (may be negative).
    pub daily_cases: Vec<i64>,
    /// Daily deaths, clamped at 0.
    pub daily_deaths: Vec<i64>,
    /// Daily recoveries (may be negative).
    pub daily_recovered: Vec<i64>,
    /// Trailing 7-row means of the daily series.
    pub rolling_means: RollingMeans,
    /// Correlations between the daily series.
    pub correlation_matrix: CorrelationMatrix,
}

/// One fitted point of the linear trend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Ordinal day number (0001-01-01 is day 1).
    pub ordinal: i32,
    /// Calendar date of the point.
    pub date: NaiveDate,
    /// Fitted daily case count.
    pub fitted: f64,
}

/// Ordinary least squares line of daily cases against ordinal date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendFit {
    /// Cases per day of change.
    pub slope: f64,
    /// Value of the line at ordinal 0.
    pub intercept: f64,
    /// One fitted value per input row.
    pub points: Vec<TrendPoint>,
    /// 7-row trailing mean of the fitted values.
    pub smoothed: Vec<Option<f64>>,
}

/// The full response for one dashboard request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOutput {
    /// Country the window was taken from.
    pub country: String,
    /// Axis scale for the case charts.
    pub y_axis: AxisScale,
    /// Reporting dates of the window.
    pub dates: Vec<NaiveDate>,
    /// Daily confirmed cases.
    pub daily_cases: Vec<i64>,
    /// Cumulative confirmed cases.
    pub cumulative_cases: Vec<u64>,
    /// Daily deaths, clamped at 0.
    pub daily_deaths: Vec<i64>,
    /// Daily recoveries.
    pub daily_recovered: Vec<i64>,
    /// Trailing 7-row means of the daily series.
    pub rolling_means: RollingMeans,
    /// Correlations between the daily series.
    pub correlation_matrix: CorrelationMatrix,
    /// Linear trend of daily cases; absent for windows shorter than two
    /// rows.
    pub trend_fit: Option<TrendFit>,
}
