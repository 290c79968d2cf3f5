//! Daily deltas, rolling means and correlations over one window.
//!
//! Everything here works on the rows of a single window, so the first row's
//! delta and the first six rolling means never look outside it.

use covid_dashboard_analytics_models::{CorrelationMatrix, DerivedSeries, RollingMeans};
use covid_dashboard_series_models::CountryDayTotal;

use crate::ROLLING_WINDOW;

/// Row-to-row differences of a cumulative series.
///
/// The first entry is the first cumulative value itself. Regressions in the
/// source data produce negative entries.
#[must_use]
pub fn daily_deltas(cumulative: &[u64]) -> Vec<i64> {
    let mut previous = 0_i64;
    cumulative
        .iter()
        .map(|&value| {
            let value = i64::try_from(value).unwrap_or(i64::MAX);
            let delta = value.saturating_sub(previous);
            previous = value;
            delta
        })
        .collect()
}

/// Replaces negative entries with 0.
#[must_use]
pub fn clamp_non_negative(deltas: &[i64]) -> Vec<i64> {
    deltas.iter().map(|&d| d.max(0)).collect()
}

/// Trailing mean over `window` rows, inclusive of the current row.
///
/// The first `window - 1` entries are `None`. A `window` of 0 yields all
/// `None`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rolling_mean<T: Copy + Into<f64>>(values: &[T], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                return None;
            }
            let sum: f64 = values[i + 1 - window..=i].iter().map(|&v| v.into()).sum();
            Some(sum / window as f64)
        })
        .collect()
}

/// Trailing mean of integer deltas.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rolling_mean_i64(values: &[i64], window: usize) -> Vec<Option<f64>> {
    let values: Vec<f64> = values.iter().map(|&v| v as f64).collect();
    rolling_mean(&values, window)
}

/// Pearson correlation coefficient of two equal-length series.
///
/// Returns `None` for mismatched lengths, fewer than two points, or when
/// either series is constant.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn pearson(x: &[i64], y: &[i64]) -> Option<f64> {
    let n = x.len();
    if n < 2 || n != y.len() {
        return None;
    }

    let mean_x = x.iter().map(|&v| v as f64).sum::<f64>() / n as f64;
    let mean_y = y.iter().map(|&v| v as f64).sum::<f64>() / n as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&a, &b) in x.iter().zip(y) {
        let dx = a as f64 - mean_x;
        let dy = b as f64 - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }

    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// Pairwise Pearson correlations between the three daily series.
///
/// The matrix is symmetric. Diagonal entries are exactly 1 for series with
/// nonzero variance and `None` otherwise.
#[must_use]
pub fn correlation_matrix(cases: &[i64], deaths: &[i64], recovered: &[i64]) -> CorrelationMatrix {
    let columns = [cases, deaths, recovered];
    let mut matrix = CorrelationMatrix::undefined();

    for i in 0..columns.len() {
        matrix.values[i][i] = pearson(columns[i], columns[i]).map(|_| 1.0);
        for j in (i + 1)..columns.len() {
            let r = pearson(columns[i], columns[j]);
            matrix.values[i][j] = r;
            matrix.values[j][i] = r;
        }
    }

    matrix
}

/// Derives every per-window series from date-sorted totals.
#[must_use]
pub fn derive(rows: &[CountryDayTotal]) -> DerivedSeries {
    let dates = rows.iter().map(|r| r.date).collect();
    let cumulative_cases: Vec<u64> = rows.iter().map(|r| r.confirmed).collect();
    let cumulative_deaths: Vec<u64> = rows.iter().map(|r| r.deaths).collect();
    let cumulative_recovered: Vec<u64> = rows.iter().map(|r| r.recovered).collect();

    let daily_cases = daily_deltas(&cumulative_cases);
    let daily_deaths = clamp_non_negative(&daily_deltas(&cumulative_deaths));
    let daily_recovered = daily_deltas(&cumulative_recovered);

    let rolling_means = RollingMeans {
        daily_cases: rolling_mean_i64(&daily_cases, ROLLING_WINDOW),
        daily_deaths: rolling_mean_i64(&daily_deaths, ROLLING_WINDOW),
        daily_recovered: rolling_mean_i64(&daily_recovered, ROLLING_WINDOW),
    };
    let correlation_matrix = correlation_matrix(&daily_cases, &daily_deaths, &daily_recovered);

    DerivedSeries {
        dates,
        cumulative_cases,
        cumulative_deaths,
        cumulative_recovered,
        daily_cases,
        daily_deaths,
        daily_recovered,
        rolling_means,
        correlation_matrix,
    }
}
