#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the fire monitor.
//!
//! Every `GET /api/fires` request runs the pipeline against the live feed.
//! The single [`FireService`] sits behind an async mutex, so concurrent
//! requests queue rather than interleave their geocode cache updates.

mod handlers;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use fire_monitor_pipeline::FireService;
use fire_monitor_region::RegionConfig;
use tokio::sync::Mutex;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8000;

/// Shared application state.
pub struct AppState {
    /// The pipeline. Locked for the duration of a run.
    pub service: Mutex<FireService>,
    /// The monitored region.
    pub region: RegionConfig,
    /// Whether the feed has its map key.
    pub api_key_set: bool,
}

impl AppState {
    /// Wraps a service for sharing across workers.
    #[must_use]
    pub fn new(service: FireService) -> Self {
        Self {
            region: service.region().clone(),
            api_key_set: service.is_feed_configured(),
            service: Mutex::new(service),
        }
    }
}

/// Registers the API routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::root))
        .route("/health", web::get().to(handlers::health))
        .service(
            web::scope("/api")
                .route("/config", web::get().to(handlers::config))
                .route("/fires", web::get().to(handlers::fires)),
        );
}

/// Starts the fire monitor API server.
///
/// Builds the production [`FireService`] and serves on `BIND_ADDR`:`PORT`
/// (default `0.0.0.0:8000`). The caller provides the async runtime and
/// initializes logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the service cannot be built, the
/// server fails to bind, or it encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    let service = FireService::from_env().map_err(std::io::Error::other)?;
    if !service.has_boundary() {
        log::warn!("No boundary loaded; geofencing is disabled");
    }

    let state = web::Data::new(AppState::new(service));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
