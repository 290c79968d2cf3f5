#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the epidemic dashboard.
//!
//! Serves the REST API the dashboard frontend calls on every country,
//! date-range, or scale change, plus the pre-built frontend itself when a
//! static directory is configured. The dataset is loaded once before the
//! server binds and shared read-only across workers.

mod handlers;
pub mod interactive;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpResponse, HttpServer, error, middleware, web};
use covid_dashboard_ingest::Dataset;
use covid_dashboard_server_models::ApiError;

/// Default bind address when `BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

/// Default port when `PORT` is unset or unparseable.
pub const DEFAULT_PORT: u16 = 8080;

/// Shared application state.
pub struct AppState {
    /// Canonical per-country table, built once at startup.
    pub dataset: Arc<Dataset>,
}

/// Where and what the server serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind_addr: String,
    /// Port to bind.
    pub port: u16,
    /// Frontend directory served at `/`, if any.
    pub static_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Reads `BIND_ADDR` and `PORT` from the environment, falling back to
    /// [`DEFAULT_BIND_ADDR`] and [`DEFAULT_PORT`].
    #[must_use]
    pub fn from_env(static_dir: Option<PathBuf>) -> Self {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            bind_addr,
            port,
            static_dir,
        }
    }
}

/// Registers the `/api` routes.
///
/// Malformed query strings (e.g. a missing `country`) are answered with the
/// same JSON error body as every other 400.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(ApiError::new(&err));
        error::InternalError::from_response(err, response).into()
    }))
    .service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/countries", web::get().to(handlers::countries))
            .route(
                "/countries/{country}/dates",
                web::get().to(handlers::country_dates),
            )
            .route("/dashboard", web::get().to(handlers::dashboard)),
    );
}

/// Starts the dashboard API server.
///
/// The caller loads the dataset and provides the async runtime (e.g. via
/// `#[actix_web::main]`). A configured static directory that does not exist
/// is skipped with a warning.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(dataset: Arc<Dataset>, config: ServerConfig) -> std::io::Result<()> {
    let state = web::Data::new(AppState { dataset });

    let static_dir = config.static_dir.filter(|dir| {
        let exists = dir.is_dir();
        if !exists {
            log::warn!(
                "Static directory {} does not exist; serving the API only",
                dir.display()
            );
        }
        exists
    });

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();
        let static_dir = static_dir.clone();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_api)
            // Serve frontend static files (production)
            .configure(move |cfg| {
                if let Some(dir) = static_dir {
                    cfg.service(Files::new("/", dir).index_file("index.html"));
                }
            })
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
