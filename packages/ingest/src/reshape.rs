//! Wide-to-long reshaping of the per-date source tables.
//!
//! Source files have four positional identity columns (sub-region, country,
//! latitude, longitude) followed by one column per reporting date. Each
//! date header is `month/day/2-digit-year`; each cell is a cumulative count.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::NaiveDate;
use covid_dashboard_series_models::{LongRow, Metric, RawWideRow, WideTable};

use crate::IngestError;

/// Number of leading identity columns before the first date column.
pub const IDENTITY_COLUMNS: usize = 4;

/// `chrono` format of the date column headers (e.g. `1/22/20`).
pub const DATE_HEADER_FORMAT: &str = "%m/%d/%y";

/// Parses a date column header such as `"1/22/20"`.
///
/// # Errors
///
/// Returns [`IngestError::Parse`] if the header is not a valid
/// `month/day/2-digit-year` date.
pub fn parse_date_header(header: &str) -> Result<NaiveDate, IngestError> {
    NaiveDate::parse_from_str(header.trim(), DATE_HEADER_FORMAT).map_err(|e| IngestError::Parse {
        message: format!("invalid date header '{header}': {e}. Expected format: M/D/YY"),
    })
}

/// Reads a wide table from any CSV source.
///
/// # Errors
///
/// Returns [`IngestError`] if the CSV is malformed, has fewer than
/// [`IDENTITY_COLUMNS`] columns, or contains an unparseable date header,
/// coordinate, or count.
pub fn read_wide_table<R: Read>(reader: R, metric: Metric) -> Result<WideTable, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    if headers.len() < IDENTITY_COLUMNS {
        return Err(IngestError::Parse {
            message: format!(
                "{metric} table has {} columns, expected at least {IDENTITY_COLUMNS} \
                 identity columns",
                headers.len()
            ),
        });
    }

    let dates = headers
        .iter()
        .skip(IDENTITY_COLUMNS)
        .map(parse_date_header)
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        // Line 1 is the header row.
        let line = index + 2;

        let sub_region = record
            .get(0)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let country = record.get(1).unwrap_or("").trim().to_string();
        let lat = parse_coordinate(record.get(2), metric, line, "lat")?;
        let long = parse_coordinate(record.get(3), metric, line, "long")?;

        let values = record
            .iter()
            .skip(IDENTITY_COLUMNS)
            .zip(&dates)
            .map(|(cell, date)| parse_count(cell, metric, line, *date))
            .collect::<Result<Vec<_>, _>>()?;

        rows.push(RawWideRow {
            sub_region,
            country,
            lat,
            long,
            values,
        });
    }

    Ok(WideTable {
        metric,
        dates,
        rows,
    })
}

/// Opens `path` and reads it with [`read_wide_table`].
///
/// # Errors
///
/// Returns [`IngestError::Read`] if the file cannot be opened, otherwise any
/// error from [`read_wide_table`].
pub fn read_wide_table_from_path(path: &Path, metric: Metric) -> Result<WideTable, IngestError> {
    let file = File::open(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    read_wide_table(BufReader::new(file), metric)
}

/// Melts a wide table into one [`LongRow`] per (source row, date column).
///
/// Duplicate identity rows in the source produce duplicate output rows.
#[must_use]
pub fn reshape(table: &WideTable) -> Vec<LongRow> {
    let mut out = Vec::with_capacity(table.rows.len() * table.dates.len());

    for row in &table.rows {
        for (date, value) in table.dates.iter().zip(&row.values) {
            out.push(LongRow {
                sub_region: row.sub_region.clone(),
                country: row.country.clone(),
                lat: row.lat,
                long: row.long,
                date: *date,
                value: *value,
                metric: table.metric,
            });
        }
    }

    out
}

/// Parses a latitude/longitude cell. Empty cells are `None`.
fn parse_coordinate(
    cell: Option<&str>,
    metric: Metric,
    line: usize,
    column: &str,
) -> Result<Option<f64>, IngestError> {
    let Some(text) = cell.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    text.parse::<f64>()
        .map(Some)
        .map_err(|e| IngestError::Parse {
            message: format!("{metric} line {line}: invalid {column} '{text}': {e}"),
        })
}

fn parse_count(
    cell: &str,
    metric: Metric,
    line: usize,
    date: NaiveDate,
) -> Result<u64, IngestError> {
    let text = cell.trim();
    text.parse::<u64>().map_err(|e| IngestError::Parse {
        message: format!("{metric} line {line}, column {date}: invalid count '{text}': {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20
,Spain,40.463667,-3.74922,0,1,4
Ontario,Canada,51.2538,-85.3232,0,0,2
Repatriated Travellers,Canada,,,0,0,0
";

    #[test]
    fn parses_date_headers() {
        assert_eq!(
            parse_date_header("1/22/20").unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 22).unwrap()
        );
        assert_eq!(
            parse_date_header("12/05/21").unwrap(),
            NaiveDate::from_ymd_opt(2021, 12, 5).unwrap()
        );
    }

    #[test]
    fn rejects_invalid_date_header() {
        assert!(matches!(
            parse_date_header("2020-01-22"),
            Err(IngestError::Parse { .. })
        ));
        assert!(parse_date_header("13/01/20").is_err());
        assert!(parse_date_header("Lat").is_err());
    }

    #[test]
    fn reads_wide_table() {
        let table = read_wide_table(SAMPLE.as_bytes(), Metric::Confirmed).unwrap();
        assert_eq!(table.metric, Metric::Confirmed);
        assert_eq!(table.dates.len(), 3);
        assert_eq!(table.rows.len(), 3);

        let spain = &table.rows[0];
        assert_eq!(spain.sub_region, None);
        assert_eq!(spain.country, "Spain");
        assert_eq!(spain.values, [0, 1, 4]);

        let ontario = &table.rows[1];
        assert_eq!(ontario.sub_region.as_deref(), Some("Ontario"));

        let travellers = &table.rows[2];
        assert_eq!(travellers.lat, None);
        assert_eq!(travellers.long, None);
    }

    #[test]
    fn reshaped_row_count_is_rows_times_dates() {
        let table = read_wide_table(SAMPLE.as_bytes(), Metric::Deaths).unwrap();
        let long = reshape(&table);
        assert_eq!(long.len(), table.rows.len() * table.dates.len());
        assert!(long.iter().all(|r| r.metric == Metric::Deaths));

        let spain: Vec<u64> = long
            .iter()
            .filter(|r| r.country == "Spain")
            .map(|r| r.value)
            .collect();
        assert_eq!(spain, [0, 1, 4]);
    }

    #[test]
    fn duplicate_identity_rows_are_propagated() {
        let csv = "\
Province/State,Country/Region,Lat,Long,1/22/20
,Spain,40.0,-4.0,1
,Spain,40.0,-4.0,2
";
        let table = read_wide_table(csv.as_bytes(), Metric::Confirmed).unwrap();
        let long = reshape(&table);
        assert_eq!(long.len(), 2);
        assert_eq!(long[0].key(), long[1].key());
    }

    #[test]
    fn rejects_bad_header() {
        let csv = "Province/State,Country/Region,Lat,Long,2020-01-22\n,Spain,40.0,-4.0,1\n";
        let err = read_wide_table(csv.as_bytes(), Metric::Confirmed).unwrap_err();
        assert!(err.to_string().contains("2020-01-22"), "{err}");
    }

    #[test]
    fn rejects_negative_or_non_numeric_counts() {
        let csv = "Province/State,Country/Region,Lat,Long,1/22/20\n,Spain,40.0,-4.0,-3\n";
        assert!(matches!(
            read_wide_table(csv.as_bytes(), Metric::Confirmed),
            Err(IngestError::Parse { .. })
        ));

        let csv = "Province/State,Country/Region,Lat,Long,1/22/20\n,Spain,40.0,-4.0,abc\n";
        assert!(read_wide_table(csv.as_bytes(), Metric::Confirmed).is_err());
    }

    #[test]
    fn rejects_short_header() {
        let csv = "Province/State,Country/Region\n,Spain\n";
        assert!(matches!(
            read_wide_table(csv.as_bytes(), Metric::Confirmed),
            Err(IngestError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_ragged_rows() {
        let csv = "Province/State,Country/Region,Lat,Long,1/22/20,1/23/20\n,Spain,40.0,-4.0,1\n";
        assert!(matches!(
            read_wide_table(csv.as_bytes(), Metric::Confirmed),
            Err(IngestError::Csv(_))
        ));
    }
}
