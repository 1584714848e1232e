//! HTTP handlers for the language-model features

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::validation::validate_center;

use crate::error::{AppError, AppResult};
use crate::external::OpenAiClient;
use crate::services::route::{RouteRequest, RouteResponse};
use crate::services::{DisasterService, RouteService};
use crate::AppState;

/// Default forecast horizon for disaster prediction
const DEFAULT_DISASTER_HOURS: u32 = 12;

/// Longest horizon accepted for disaster prediction
const MAX_DISASTER_HOURS: u32 = 120;

#[derive(Debug, Deserialize)]
pub struct DisasterQuery {
    pub lat: f64,
    pub lon: f64,
    pub hours: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct DisasterResponse {
    pub prediction: String,
}

fn openai_client(state: &AppState) -> AppResult<OpenAiClient> {
    state
        .openai
        .clone()
        .ok_or_else(|| AppError::Configuration("openai.api_key is not set".to_string()))
}

/// Disaster-risk summary for the coming hours at a point
pub async fn predict_disaster(
    State(state): State<AppState>,
    Query(query): Query<DisasterQuery>,
) -> AppResult<Json<DisasterResponse>> {
    let location = validate_center(query.lat, query.lon)?;
    let hours = shared::validation::clamp_forecast_hours(
        query.hours.unwrap_or(DEFAULT_DISASTER_HOURS),
        MAX_DISASTER_HOURS,
    );

    let service = DisasterService::new(state.provider.clone(), openai_client(&state)?);
    let prediction = service.predict(location, hours).await?;
    Ok(Json(DisasterResponse { prediction }))
}

/// Plan a sea route between two points
pub async fn plan_route(
    State(state): State<AppState>,
    Json(input): Json<RouteRequest>,
) -> AppResult<Json<RouteResponse>> {
    let (start, end) = input.endpoints()?;

    let service = RouteService::new(state.provider.clone(), openai_client(&state)?);
    let waypoints = service.plan(start, end).await?;

    Ok(Json(RouteResponse {
        message: format!("Optimal route calculated with {} waypoints.", waypoints.len()),
        waypoints,
    }))
}
