//! Linear trend of daily cases against calendar date.

use chrono::{Datelike as _, NaiveDate};
use covid_dashboard_analytics_models::{TrendFit, TrendPoint};

use crate::derived::rolling_mean;
use crate::{AnalyticsError, ROLLING_WINDOW};

/// Minimum number of rows needed to fit a line.
pub const MIN_TREND_POINTS: usize = 2;

/// Day number of `date`, counting 0001-01-01 as day 1.
#[must_use]
pub fn ordinal(date: NaiveDate) -> i32 {
    date.num_days_from_ce()
}

/// Fits an ordinary least squares line of `daily_cases` against the ordinal
/// of each date in `dates`, over every row given.
///
/// If all dates coincide the slope is 0 and the line is the mean.
///
/// # Errors
///
/// * [`AnalyticsError::LengthMismatch`] if the inputs differ in length
/// * [`AnalyticsError::InsufficientData`] for fewer than
///   [`MIN_TREND_POINTS`] rows
#[allow(clippy::cast_precision_loss)]
pub fn fit_trend(dates: &[NaiveDate], daily_cases: &[i64]) -> Result<TrendFit, AnalyticsError> {
    if dates.len() != daily_cases.len() {
        return Err(AnalyticsError::LengthMismatch {
            expected: dates.len(),
            got: daily_cases.len(),
        });
    }
    let n = dates.len();
    if n < MIN_TREND_POINTS {
        return Err(AnalyticsError::InsufficientData {
            needed: MIN_TREND_POINTS,
            got: n,
        });
    }

    let ordinals: Vec<i32> = dates.iter().copied().map(ordinal).collect();
    let mean_x = ordinals.iter().map(|&x| f64::from(x)).sum::<f64>() / n as f64;
    let mean_y = daily_cases.iter().map(|&y| y as f64).sum::<f64>() / n as f64;

    // Centered sums keep precision with ordinals around 737,000.
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (&x, &y) in ordinals.iter().zip(daily_cases) {
        let dx = f64::from(x) - mean_x;
        sxx += dx * dx;
        sxy += dx * (y as f64 - mean_y);
    }

    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    let intercept = slope.mul_add(-mean_x, mean_y);

    let points: Vec<TrendPoint> = ordinals
        .iter()
        .zip(dates)
        .map(|(&x, &date)| TrendPoint {
            ordinal: x,
            date,
            fitted: slope.mul_add(f64::from(x), intercept),
        })
        .collect();
    let fitted: Vec<f64> = points.iter().map(|p| p.fitted).collect();
    let smoothed = rolling_mean(&fitted, ROLLING_WINDOW);

    log::trace!("Trend over {n} rows: slope={slope:.4} intercept={intercept:.4}");

    Ok(TrendFit {
        slope,
        intercept,
        points,
        smoothed,
    })
}
