//! Route definitions for the Maritime Weather Assistant

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Weather lookups and the event grid scan
        .nest("/weather", weather_routes())
        // Language-model features
        .nest("/ai", ai_routes())
        .route("/route", post(handlers::plan_route))
}

/// Weather routes
fn weather_routes() -> Router<AppState> {
    Router::new()
        .route("/current", get(handlers::get_current_weather))
        .route("/hourly", get(handlers::get_hourly_forecast))
        .route("/events", get(handlers::scan_weather_events))
}

/// AI routes
fn ai_routes() -> Router<AppState> {
    Router::new().route("/disaster", get(handlers::predict_disaster))
}
