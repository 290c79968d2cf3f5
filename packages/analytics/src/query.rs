//! Country and date-window selection over the shared dataset.

use covid_dashboard_analytics_models::DateRange;
use covid_dashboard_ingest::Dataset;
use covid_dashboard_series_models::CountryDayTotal;

use crate::AnalyticsError;

/// Checks that `range` addresses offsets inside a series of `len` dates.
///
/// Out-of-range windows are rejected rather than clamped.
///
/// # Errors
///
/// Returns [`AnalyticsError::Range`] if `start > end` or `end >= len`.
pub const fn check_range(range: DateRange, len: usize) -> Result<(), AnalyticsError> {
    if range.start > range.end || range.end >= len {
        return Err(AnalyticsError::Range {
            start: range.start,
            end: range.end,
            len,
        });
    }
    Ok(())
}

/// The range covering every date of `country`.
///
/// # Errors
///
/// Returns [`AnalyticsError::UnknownCountry`] if `country` is not in the
/// dataset.
pub fn full_range(dataset: &Dataset, country: &str) -> Result<DateRange, AnalyticsError> {
    let series = series_for(dataset, country)?;
    Ok(DateRange::new(0, series.len().saturating_sub(1)))
}

/// Returns an owned, date-sorted copy of `country`'s rows within `range`.
///
/// # Errors
///
/// Returns [`AnalyticsError::UnknownCountry`] for an unknown country and
/// [`AnalyticsError::Range`] for an out-of-bounds window.
pub fn select_window(
    dataset: &Dataset,
    country: &str,
    range: DateRange,
) -> Result<Vec<CountryDayTotal>, AnalyticsError> {
    let series = series_for(dataset, country)?;
    check_range(range, series.len())?;
    Ok(series[range.start..=range.end].to_vec())
}

fn series_for<'a>(
    dataset: &'a Dataset,
    country: &str,
) -> Result<&'a [CountryDayTotal], AnalyticsError> {
    dataset
        .series(country)
        .ok_or_else(|| AnalyticsError::UnknownCountry {
            country: country.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn five_day_dataset() -> Dataset {
        let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        // Deliberately out of order; the dataset sorts by date.
        let rows = [4_u64, 0, 2, 1, 3]
            .iter()
            .map(|offset| CountryDayTotal {
                country: "Testland".to_string(),
                date: start + chrono::Days::new(*offset),
                confirmed: offset * 10,
                deaths: 0,
                recovered: 0,
            })
            .collect();
        Dataset::from_totals(rows)
    }

    #[test]
    fn selects_inclusive_window_sorted_by_date() {
        let dataset = five_day_dataset();
        let rows = select_window(&dataset, "Testland", DateRange::new(1, 2)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].confirmed, 10);
        assert_eq!(rows[1].confirmed, 20);
        assert!(rows[0].date < rows[1].date);
    }

    #[test]
    fn full_range_covers_all_dates() {
        let dataset = five_day_dataset();
        let range = full_range(&dataset, "Testland").unwrap();
        assert_eq!(range, DateRange::new(0, 4));
        assert_eq!(
            select_window(&dataset, "Testland", range).unwrap().len(),
            5
        );
    }

    #[test]
    fn rejects_out_of_bounds_ranges() {
        let dataset = five_day_dataset();
        for range in [DateRange::new(0, 5), DateRange::new(3, 2), DateRange::new(7, 9)] {
            assert!(matches!(
                select_window(&dataset, "Testland", range),
                Err(AnalyticsError::Range { len: 5, .. })
            ));
        }
    }

    #[test]
    fn rejects_unknown_country() {
        let dataset = five_day_dataset();
        assert_eq!(
            select_window(&dataset, "Atlantis", DateRange::new(0, 0)),
            Err(AnalyticsError::UnknownCountry {
                country: "Atlantis".to_string()
            })
        );
        assert!(full_range(&dataset, "Atlantis").is_err());
    }
}
