//! HTTP handlers for single-point weather endpoints

use std::collections::BTreeSet;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::validation::validate_center;
use shared::{classify, EventTag, ForecastPoint, WeatherSample};

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Default hourly forecast length
const DEFAULT_FORECAST_HOURS: u32 = 48;

/// Query parameters for a single location
#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize)]
pub struct HourlyQuery {
    pub lat: f64,
    pub lon: f64,
    pub hours: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct CurrentWeatherResponse {
    pub lat: f64,
    pub lon: f64,
    pub provider: String,
    #[serde(flatten)]
    pub sample: WeatherSample,
    pub events: BTreeSet<EventTag>,
}

#[derive(Debug, Serialize)]
pub struct HourlyForecastResponse {
    pub lat: f64,
    pub lon: f64,
    pub provider: String,
    pub hours: Vec<ForecastPoint>,
}

/// Current conditions at a point, with their event classification
pub async fn get_current_weather(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<CurrentWeatherResponse>> {
    let location = validate_center(query.lat, query.lon)?;
    let sample = state.provider.fetch(location).await?;
    let events = classify(&sample);

    Ok(Json(CurrentWeatherResponse {
        lat: location.latitude,
        lon: location.longitude,
        provider: state.provider.name().to_string(),
        sample,
        events,
    }))
}

/// Hourly forecast at a point
pub async fn get_hourly_forecast(
    State(state): State<AppState>,
    Query(query): Query<HourlyQuery>,
) -> AppResult<Json<HourlyForecastResponse>> {
    let location = validate_center(query.lat, query.lon)?;
    let hours = query.hours.unwrap_or(DEFAULT_FORECAST_HOURS).max(1);

    let forecast = state.provider.hourly_forecast(location, hours).await?;
    if forecast.is_empty() {
        return Err(AppError::NotFound("Hourly forecast".to_string()));
    }

    Ok(Json(HourlyForecastResponse {
        lat: location.latitude,
        lon: location.longitude,
        provider: state.provider.name().to_string(),
        hours: forecast,
    }))
}
