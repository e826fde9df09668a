//! HTTP handler functions for the fire monitor API.

use std::collections::BTreeMap;

use actix_web::{HttpResponse, web};
use chrono::Utc;
use fire_monitor_server_models::{ApiConfig, ApiFires, ApiHealth, ApiRoot, FiresQueryParams};

use crate::AppState;

/// `GET /`
pub async fn root() -> HttpResponse {
    let endpoints = [
        ("fires", "/api/fires"),
        ("health", "/health"),
        ("config", "/api/config"),
    ]
    .into_iter()
    .map(|(name, path)| (name.to_string(), path.to_string()))
    .collect::<BTreeMap<_, _>>();

    HttpResponse::Ok().json(ApiRoot {
        message: "Fire Monitoring API".to_string(),
        status: "active".to_string(),
        endpoints,
    })
}

/// `GET /health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth::healthy(Utc::now()))
}

/// `GET /api/config`
pub async fn config(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiConfig {
        nasa_firms_key_set: state.api_key_set,
        bbox: state.region.bbox.to_string(),
        default_days: state.region.feed.default_days,
        timestamp: Utc::now(),
    })
}

/// `GET /api/fires`
///
/// Runs the pipeline for the requested window (default from the region
/// config) and returns the snapshot. Never fails: feed problems yield an
/// empty snapshot.
pub async fn fires(
    state: web::Data<AppState>,
    params: web::Query<FiresQueryParams>,
) -> HttpResponse {
    let days = params.days.unwrap_or(state.region.feed.default_days);
    log::info!("Fetching fires for last {days} day(s)");

    let snapshot = state.service.lock().await.run(days).await;
    log::info!(
        "Returning {} fires: {} high, {} medium, {} low",
        snapshot.total,
        snapshot.high.len(),
        snapshot.medium.len(),
        snapshot.low.len()
    );

    HttpResponse::Ok().json(ApiFires {
        snapshot,
        api_key_set: state.api_key_set,
    })
}
