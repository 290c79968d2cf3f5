//! Sums sub-regional rows into per-country daily totals.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use covid_dashboard_series_models::{CountryDayTotal, DailyCounts};

use crate::IngestError;

/// Groups rows by (country, date) and sums the three counts.
///
/// The output has exactly one row per (country, date) present in the input,
/// ordered by country and then date. Because [`CountryDayTotal`] implements
/// [`DailyCounts`], aggregating an already aggregated table returns it
/// unchanged.
///
/// # Errors
///
/// Returns [`IngestError::EmptyInput`] if `rows` is empty, or
/// [`IngestError::Parse`] if a sum does not fit in a `u64`.
pub fn aggregate<T: DailyCounts>(rows: &[T]) -> Result<Vec<CountryDayTotal>, IngestError> {
    if rows.is_empty() {
        return Err(IngestError::EmptyInput);
    }

    let mut totals: BTreeMap<(&str, NaiveDate), [u64; 3]> = BTreeMap::new();
    for row in rows {
        let sums = totals.entry((row.country(), row.date())).or_default();
        let counts = [row.confirmed(), row.deaths(), row.recovered()];
        for (sum, count) in sums.iter_mut().zip(counts) {
            let total = sum.checked_add(count).ok_or_else(|| IngestError::Parse {
                message: format!(
                    "{} on {}: total overflows while adding {count} to {sum}",
                    row.country(),
                    row.date()
                ),
            })?;
            *sum = total;
        }
    }

    log::debug!(
        "Aggregated {} rows into {} country-days",
        rows.len(),
        totals.len()
    );

    Ok(totals
        .into_iter()
        .map(
            |((country, date), [confirmed, deaths, recovered])| CountryDayTotal {
                country: country.to_string(),
                date,
                confirmed,
                deaths,
                recovered,
            },
        )
        .collect())
}

#[cfg(test)]
mod tests {
    use covid_dashboard_series_models::JoinedRow;

    use super::*;

    fn joined(country: &str, sub: Option<&str>, day: u32, counts: [u64; 3]) -> JoinedRow {
        JoinedRow {
            sub_region: sub.map(str::to_string),
            country: country.to_string(),
            date: NaiveDate::from_ymd_opt(2020, 4, day).unwrap(),
            confirmed: counts[0],
            deaths: counts[1],
            recovered: counts[2],
        }
    }

    #[test]
    fn sums_sub_regions_per_country_and_day() {
        let rows = vec![
            joined("Canada", Some("Quebec"), 2, [5, 1, 0]),
            joined("Canada", Some("Ontario"), 1, [3, 0, 1]),
            joined("Canada", Some("Quebec"), 1, [2, 1, 0]),
            joined("Canada", Some("Ontario"), 2, [4, 0, 2]),
            joined("Andorra", None, 1, [1, 0, 0]),
        ];

        let totals = aggregate(&rows).unwrap();
        assert_eq!(totals.len(), 3);

        assert_eq!(totals[0].country, "Andorra");
        assert_eq!(totals[1].country, "Canada");
        assert_eq!(totals[1].date.to_string(), "2020-04-01");
        assert_eq!(
            (totals[1].confirmed, totals[1].deaths, totals[1].recovered),
            (5, 1, 1)
        );
        assert_eq!(totals[2].date.to_string(), "2020-04-02");
        assert_eq!(
            (totals[2].confirmed, totals[2].deaths, totals[2].recovered),
            (9, 1, 2)
        );
    }

    #[test]
    fn aggregation_is_idempotent() {
        let rows = vec![
            joined("Australia", Some("Victoria"), 1, [10, 1, 2]),
            joined("Australia", Some("Queensland"), 1, [7, 0, 1]),
            joined("Australia", Some("Victoria"), 2, [12, 1, 3]),
            joined("Spain", None, 1, [100, 4, 9]),
        ];

        let once = aggregate(&rows).unwrap();
        let twice = aggregate(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn overflowing_sum_is_a_parse_error() {
        let half = u64::MAX / 2 + 1;
        let rows = vec![
            joined("Canada", Some("Ontario"), 1, [half, 0, 0]),
            joined("Canada", Some("Quebec"), 1, [half, 0, 0]),
        ];

        match aggregate(&rows) {
            Err(IngestError::Parse { message }) => {
                assert!(message.starts_with("Canada on 2020-04-01"));
            }
            other => panic!("expected an overflow error, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_an_error() {
        let rows: Vec<JoinedRow> = Vec::new();
        assert!(matches!(aggregate(&rows), Err(IngestError::EmptyInput)));
    }
}
