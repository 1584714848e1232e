//! Weather-event grid scan endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::geometry::{compute_window, split_antimeridian};
use shared::validation::{validate_center, validate_radius, validate_step};
use shared::{EventTag, FlaggedPoint};

use crate::error::AppResult;
use crate::AppState;

/// Query parameters for an event scan
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventScanQuery {
    pub center_lat: f64,
    pub center_lon: f64,
    pub search_radius_degrees: Option<f64>,
    pub lat_step: Option<f64>,
    pub lon_step: Option<f64>,
}

/// A grid point where at least one event was detected
#[derive(Debug, Serialize, PartialEq)]
pub struct EventLocation {
    pub lat: f64,
    pub lon: f64,
    pub types: Vec<EventTag>,
}

impl From<FlaggedPoint> for EventLocation {
    fn from(point: FlaggedPoint) -> Self {
        Self {
            lat: point.coordinate.latitude,
            lon: point.coordinate.longitude,
            types: point.tags.into_iter().collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventScanResponse {
    pub event_locations: Vec<EventLocation>,
    pub center_lat: f64,
    pub center_lon: f64,
    pub search_radius_degrees: f64,
    pub message: String,
    pub disclaimer: String,
}

/// Scan the grid around a center point for notable weather.
///
/// A window crossing the antimeridian is scanned as two windows and the
/// results are concatenated.
pub async fn scan_weather_events(
    State(state): State<AppState>,
    Query(query): Query<EventScanQuery>,
) -> AppResult<Json<EventScanResponse>> {
    let defaults = &state.config.scanner;

    let center = validate_center(query.center_lat, query.center_lon)?;
    let radius = validate_radius(
        query
            .search_radius_degrees
            .unwrap_or(defaults.default_radius_degrees),
    )?;
    let lat_step = validate_step("latitude", query.lat_step.unwrap_or(defaults.default_lat_step))?;
    let lon_step = validate_step(
        "longitude",
        query.lon_step.unwrap_or(defaults.default_lon_step),
    )?;

    let windows = split_antimeridian(&compute_window(center, radius));
    let cells = state.scanner.check_budget(&windows, lat_step, lon_step)?;

    tracing::debug!(
        "Event scan around ({}, {}) radius {} over {} window(s), {} cells",
        center.latitude,
        center.longitude,
        radius,
        windows.len(),
        cells
    );

    let mut event_locations = Vec::new();
    for window in &windows {
        let points = state
            .scanner
            .scan(window, lat_step, lon_step, state.provider.clone())
            .await?;
        event_locations.extend(points.into_iter().map(EventLocation::from));
    }

    Ok(Json(EventScanResponse {
        message: format!(
            "Weather event lookup finished: {} of {} grid points within {}° of the center report events.",
            event_locations.len(),
            cells,
            radius
        ),
        disclaimer: format!(
            "Based on per-cell weather from {}. Accuracy depends on the grid spacing, and \
             provider quotas may limit the search range and resolution.",
            state.provider.name()
        ),
        event_locations,
        center_lat: center.latitude,
        center_lon: center.longitude,
        search_radius_degrees: radius,
    }))
}
