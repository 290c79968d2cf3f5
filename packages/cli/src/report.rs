//! Dashboard output rendering for the terminal.

use std::fmt::Write as _;

use covid_dashboard_analytics::{AnalyticsError, compute, query};
use covid_dashboard_analytics_models::DashboardOutput;
use covid_dashboard_ingest::Dataset;
use covid_dashboard_server_models::DashboardQueryParams;

/// Computes the dashboard for `params`, filling omitted offsets with the
/// country's full date range.
///
/// # Errors
///
/// Returns [`AnalyticsError`] for an unknown country or invalid window.
pub fn build(
    dataset: &Dataset,
    params: &DashboardQueryParams,
) -> Result<DashboardOutput, AnalyticsError> {
    let last_index = query::full_range(dataset, &params.country)?.end;
    compute(dataset, &params.to_query(last_index))
}

/// A short human-readable digest of one dashboard window.
#[must_use]
pub fn summary(output: &DashboardOutput) -> String {
    let mut out = String::new();

    let (Some(first), Some(last)) = (output.dates.first(), output.dates.last()) else {
        return format!("{}: no data\n", output.country);
    };

    let _ = writeln!(
        out,
        "{} ({first} to {last}, {} days)",
        output.country,
        output.dates.len()
    );
    let _ = writeln!(
        out,
        "  Cumulative cases: {}",
        output.cumulative_cases.last().copied().unwrap_or(0)
    );
    let _ = writeln!(
        out,
        "  New in window:    {} cases, {} deaths, {} recovered",
        output.daily_cases.iter().sum::<i64>(),
        output.daily_deaths.iter().sum::<i64>(),
        output.daily_recovered.iter().sum::<i64>()
    );

    match output.rolling_means.daily_cases.last().copied().flatten() {
        Some(mean) => {
            let _ = writeln!(out, "  7-day mean:       {mean:.1} cases/day");
        }
        None => {
            let _ = writeln!(out, "  7-day mean:       n/a (fewer than 7 days)");
        }
    }

    match &output.trend_fit {
        Some(fit) => {
            let _ = writeln!(out, "  Trend:            {:+.2} cases/day per day", fit.slope);
        }
        None => {
            let _ = writeln!(out, "  Trend:            n/a (fewer than 2 days)");
        }
    }

    let _ = writeln!(out, "  Axis:             {}", output.y_axis);
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use covid_dashboard_series_models::CountryDayTotal;

    use super::*;

    fn dataset() -> Dataset {
        let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        Dataset::from_totals(
            [10, 15, 13, 20, 26, 30, 31, 40]
                .iter()
                .zip(start.iter_days())
                .map(|(&confirmed, date)| CountryDayTotal {
                    country: "Testland".to_string(),
                    date,
                    confirmed,
                    deaths: 0,
                    recovered: 0,
                })
                .collect(),
        )
    }

    fn params(start: Option<usize>, end: Option<usize>) -> DashboardQueryParams {
        DashboardQueryParams {
            country: "Testland".to_string(),
            start,
            end,
            log_scale: None,
        }
    }

    #[test]
    fn build_defaults_to_full_range() {
        let output = build(&dataset(), &params(None, None)).unwrap();
        assert_eq!(output.dates.len(), 8);
        assert_eq!(output.daily_cases[..4], [10, 5, -2, 7]);
    }

    #[test]
    fn summary_mentions_window_and_trend() {
        let output = build(&dataset(), &params(None, None)).unwrap();
        let text = summary(&output);
        assert!(text.starts_with("Testland (2020-03-01 to 2020-03-08, 8 days)"));
        assert!(text.contains("Cumulative cases: 40"));
        assert!(text.contains("New in window:    40 cases"));
        assert!(text.contains("cases/day per day"));
        assert!(text.contains("Axis:             linear"));
    }

    #[test]
    fn summary_of_single_day() {
        let output = build(&dataset(), &params(Some(2), Some(2))).unwrap();
        let text = summary(&output);
        assert!(text.contains("n/a (fewer than 7 days)"));
        assert!(text.contains("n/a (fewer than 2 days)"));
    }

    #[test]
    fn build_rejects_unknown_country() {
        let mut p = params(None, None);
        p.country = "Atlantis".to_string();
        assert!(matches!(
            build(&dataset(), &p),
            Err(AnalyticsError::UnknownCountry { .. })
        ));
    }
}
