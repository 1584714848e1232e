//! Maritime disaster-risk summary from an hourly forecast

use std::fmt::Write;
use std::sync::Arc;

use chrono::Duration;
use shared::{Coordinate, ForecastPoint};

use crate::error::{AppError, AppResult};
use crate::external::{OpenAiClient, WeatherSampleProvider};

/// Disaster prediction service
pub struct DisasterService {
    provider: Arc<dyn WeatherSampleProvider>,
    openai: OpenAiClient,
}

impl DisasterService {
    pub fn new(provider: Arc<dyn WeatherSampleProvider>, openai: OpenAiClient) -> Self {
        Self { provider, openai }
    }

    /// Ask the language model for the risks of the next `hours` hours at a point
    pub async fn predict(&self, location: Coordinate, hours: u32) -> AppResult<String> {
        let forecast = self
            .provider
            .hourly_forecast(location, hours)
            .await
            .map_err(|e| {
                tracing::warn!(
                    "Forecast unavailable for lat={} lon={}: {}",
                    location.latitude,
                    location.longitude,
                    e
                );
                AppError::WeatherServiceUnavailable
            })?;

        let window = forecast_window(&forecast, hours);
        if window.is_empty() {
            tracing::warn!(
                "Empty forecast for lat={} lon={}",
                location.latitude,
                location.longitude
            );
            return Err(AppError::WeatherServiceUnavailable);
        }

        let summary = summarize_forecast(location, hours, window);
        let (system, user) = disaster_prompts(&summary, hours, self.openai.response_language());
        self.openai.chat(&system, &user).await
    }
}

/// Leading entries no later than `hours` after the first one
pub fn forecast_window(forecast: &[ForecastPoint], hours: u32) -> &[ForecastPoint] {
    let Some(first) = forecast.first() else {
        return forecast;
    };
    let end = first.time + Duration::hours(i64::from(hours));
    let len = forecast
        .iter()
        .take_while(|point| point.time <= end)
        .count();
    &forecast[..len]
}

fn or_na(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}", v),
        None => "N/A".to_string(),
    }
}

/// Compact one-line-per-entry text rendering of a forecast
pub fn summarize_forecast(location: Coordinate, hours: u32, forecast: &[ForecastPoint]) -> String {
    let mut out = format!(
        "Forecast for lat {}, lon {} over the next {} hours:\n",
        location.latitude, location.longitude, hours
    );

    for point in forecast {
        let s = &point.sample;
        // Writing to a String cannot fail
        let _ = writeln!(
            out,
            "- {} | T {}°C / feels {}°C | RH {}% | precip {}mm/h | wind {}m/s | cloud {}% | {}",
            point.time.format("%Y-%m-%d %H:%M"),
            or_na(s.temperature_celsius),
            or_na(s.apparent_temperature_celsius),
            or_na(s.humidity_percent),
            or_na(s.precipitation_intensity_mm_h),
            or_na(s.wind_speed_mps),
            or_na(s.cloud_cover_percent),
            s.description.as_deref().unwrap_or("N/A"),
        );
    }

    out
}

/// System and user prompts for the disaster-risk request
pub fn disaster_prompts(summary: &str, hours: u32, language: &str) -> (String, String) {
    let system = format!(
        "You analyse weather data to warn about potential maritime disasters and suggest \
         safety measures. Based on the forecast provided, briefly summarize the navigation \
         hazards that may occur and give a short safety rule for each one. Answer in {} as \
         plain text without markdown or emphasis.",
        language
    );
    let user = format!(
        "Here is the forecast for the next {} hours:\n\n{}\n\
         What disaster risks do these conditions carry, and what safety rules apply?",
        hours, summary
    );
    (system, user)
}
