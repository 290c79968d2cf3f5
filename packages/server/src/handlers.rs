//! HTTP handler functions for the dashboard API.

use actix_web::{HttpResponse, web};
use covid_dashboard_analytics::{AnalyticsError, compute, query};
use covid_dashboard_server_models::{
    ApiCountries, ApiCountryDates, ApiError, ApiHealth, DashboardQueryParams,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/countries`
///
/// Returns every known country and the one the dashboard opens on.
pub async fn countries(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiCountries {
        countries: state.dataset.countries().map(str::to_string).collect(),
        default_country: state.dataset.default_country().map(str::to_string),
    })
}

/// `GET /api/countries/{country}/dates`
///
/// Returns the sorted reporting dates that slider offsets refer to.
pub async fn country_dates(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let country = path.into_inner();
    match state.dataset.dates(&country) {
        Some(dates) => HttpResponse::Ok().json(ApiCountryDates { country, dates }),
        None => error_response(&AnalyticsError::UnknownCountry { country }),
    }
}

/// `GET /api/dashboard`
///
/// Computes every chart series for one country and date window. Omitted
/// `start`/`end` offsets default to the full date range.
pub async fn dashboard(
    state: web::Data<AppState>,
    params: web::Query<DashboardQueryParams>,
) -> HttpResponse {
    let last_index = match query::full_range(&state.dataset, &params.country) {
        Ok(range) => range.end,
        Err(e) => return error_response(&e),
    };

    let query = params.to_query(last_index);
    match compute(&state.dataset, &query) {
        Ok(output) => HttpResponse::Ok().json(output),
        Err(e) => error_response(&e),
    }
}

/// Maps a per-request failure to a JSON error response.
///
/// Unknown countries are 404s; every other failure is the caller's fault
/// and maps to 400.
pub fn error_response(e: &AnalyticsError) -> HttpResponse {
    log::debug!("Rejecting request: {e}");

    let body = ApiError::new(e);
    match e {
        AnalyticsError::UnknownCountry { .. } => HttpResponse::NotFound().json(body),
        AnalyticsError::Range { .. }
        | AnalyticsError::InsufficientData { .. }
        | AnalyticsError::LengthMismatch { .. } => HttpResponse::BadRequest().json(body),
    }
}
