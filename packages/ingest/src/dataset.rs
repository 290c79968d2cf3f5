//! The immutable canonical table built once at startup.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use covid_dashboard_series_models::CountryDayTotal;

/// Per-country daily totals, grouped by country and sorted by date.
///
/// Built by [`crate::load_dataset`] (or [`Dataset::from_totals`] for
/// synthetic data) and never mutated afterwards, so it can be shared across
/// request handlers behind an `Arc` without locking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    by_country: BTreeMap<String, Vec<CountryDayTotal>>,
    default_country: Option<String>,
}

impl Dataset {
    /// Groups aggregated totals by country and sorts each series by date.
    ///
    /// The input is expected to hold one row per (country, date), as
    /// produced by [`crate::aggregate::aggregate`].
    #[must_use]
    pub fn from_totals(totals: Vec<CountryDayTotal>) -> Self {
        let mut by_country: BTreeMap<String, Vec<CountryDayTotal>> = BTreeMap::new();
        for row in totals {
            by_country.entry(row.country.clone()).or_default().push(row);
        }
        for series in by_country.values_mut() {
            series.sort_by_key(|r| r.date);
        }

        Self {
            by_country,
            default_country: None,
        }
    }

    /// Sets the country the dashboard opens on.
    ///
    /// A country that is not in the dataset is ignored with a warning, and
    /// [`Self::default_country`] falls back to the first known country.
    #[must_use]
    pub fn with_default_country(mut self, country: Option<String>) -> Self {
        self.default_country = country.filter(|c| {
            let known = self.by_country.contains_key(c);
            if !known {
                log::warn!("Configured default country '{c}' is not in the dataset");
            }
            known
        });
        self
    }

    /// Known country names, in sorted order.
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.by_country.keys().map(String::as_str)
    }

    /// The date-sorted series for `country`.
    #[must_use]
    pub fn series(&self, country: &str) -> Option<&[CountryDayTotal]> {
        self.by_country.get(country).map(Vec::as_slice)
    }

    /// The sorted reporting dates for `country`.
    #[must_use]
    pub fn dates(&self, country: &str) -> Option<Vec<NaiveDate>> {
        self.series(country)
            .map(|series| series.iter().map(|r| r.date).collect())
    }

    /// The configured default country, or the first known country.
    #[must_use]
    pub fn default_country(&self) -> Option<&str> {
        self.default_country
            .as_deref()
            .or_else(|| self.countries().next())
    }

    /// Number of distinct countries.
    #[must_use]
    pub fn country_count(&self) -> usize {
        self.by_country.len()
    }

    /// Total number of (country, date) rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.by_country.values().map(Vec::len).sum()
    }

    /// Earliest and latest reporting dates across all countries.
    #[must_use]
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self
            .by_country
            .values()
            .filter_map(|s| s.first().map(|r| r.date))
            .min()?;
        let last = self
            .by_country
            .values()
            .filter_map(|s| s.last().map(|r| r.date))
            .max()?;
        Some((first, last))
    }
}
