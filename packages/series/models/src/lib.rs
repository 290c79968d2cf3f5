#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Row types for the epidemic time-series pipeline.
//!
//! The pipeline moves through three shapes: the wide per-date-column source
//! table ([`WideTable`]), the long one-row-per-day table ([`LongRow`]), and
//! the joined/aggregated per-country daily table ([`JoinedRow`],
//! [`CountryDayTotal`]). All of them are plain data and carry no behaviour
//! beyond key extraction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One of the three cumulative counts published per location and day.
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
pub enum Metric {
    /// Confirmed cases.
    Confirmed,
    /// Deaths.
    Deaths,
    /// Recoveries.
    Recovered,
}

/// One row of a wide source table: a location plus one cumulative value per
/// date column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWideRow {
    /// Province/state, absent for country-level rows.
    pub sub_region: Option<String>,
    /// Country/region name.
    pub country: String,
    /// Latitude, absent when the source cell is empty.
    pub lat: Option<f64>,
    /// Longitude, absent when the source cell is empty.
    pub long: Option<f64>,
    /// Cumulative values, aligned with [`WideTable::dates`].
    pub values: Vec<u64>,
}

/// A parsed wide table for a single metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WideTable {
    /// Which count the cells hold.
    pub metric: Metric,
    /// Parsed date column headers, in source column order.
    pub dates: Vec<NaiveDate>,
    /// Source rows, in file order.
    pub rows: Vec<RawWideRow>,
}

/// Key used to align the three metric tables.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinKey {
    /// Country/region name.
    pub country: String,
    /// Province/state, if any.
    pub sub_region: Option<String>,
    /// Reporting date.
    pub date: NaiveDate,
}

impl std::fmt::Display for JoinKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.sub_region {
            Some(sub) => write!(f, "{} / {sub} @ {}", self.country, self.date),
            None => write!(f, "{} @ {}", self.country, self.date),
        }
    }
}

/// One (location, date) observation of a single metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongRow {
    /// Province/state, absent for country-level rows.
    pub sub_region: Option<String>,
    /// Country/region name.
    pub country: String,
    /// Latitude.
    pub lat: Option<f64>,
    /// Longitude.
    pub long: Option<f64>,
    /// Reporting date.
    pub date: NaiveDate,
    /// Cumulative count.
    pub value: u64,
    /// Source table metric.
    pub metric: Metric,
}

impl LongRow {
    /// Builds the join key for this row.
    #[must_use]
    pub fn key(&self) -> JoinKey {
        JoinKey {
            country: self.country.clone(),
            sub_region: self.sub_region.clone(),
            date: self.date,
        }
    }
}

/// A location/date with all three cumulative counts aligned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedRow {
    /// Province/state, absent for country-level rows.
    pub sub_region: Option<String>,
    /// Country/region name.
    pub country: String,
    /// Reporting date.
    pub date: NaiveDate,
    /// Cumulative confirmed cases.
    pub confirmed: u64,
    /// Cumulative deaths.
    pub deaths: u64,
    /// Cumulative recoveries.
    pub recovered: u64,
}

/// Per-country daily totals, summed across sub-regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryDayTotal {
    /// Country/region name.
    pub country: String,
    /// Reporting date.
    pub date: NaiveDate,
    /// Cumulative confirmed cases.
    pub confirmed: u64,
    /// Cumulative deaths.
    pub deaths: u64,
    /// Cumulative recoveries.
    pub recovered: u64,
}

/// Any row that carries the three cumulative counts for a country and day.
///
/// Implemented by both [`JoinedRow`] and [`CountryDayTotal`] so the
/// aggregator can be applied to either.
pub trait DailyCounts {
    /// Country/region name.
    fn country(&self) -> &str;
    /// Reporting date.
    fn date(&self) -> NaiveDate;
    /// Cumulative confirmed cases.
    fn confirmed(&self) -> u64;
    /// Cumulative deaths.
    fn deaths(&self) -> u64;
    /// Cumulative recoveries.
    fn recovered(&self) -> u64;
}

impl DailyCounts for JoinedRow {
    fn country(&self) -> &str {
        &self.country
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn confirmed(&self) -> u64 {
        self.confirmed
    }

    fn deaths(&self) -> u64 {
        self.deaths
    }

    fn recovered(&self) -> u64 {
        self.recovered
    }
}

impl DailyCounts for CountryDayTotal {
    fn country(&self) -> &str {
        &self.country
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn confirmed(&self) -> u64 {
        self.confirmed
    }

    fn deaths(&self) -> u64 {
        self.deaths
    }

    fn recovered(&self) -> u64 {
        self.recovered
    }
}
