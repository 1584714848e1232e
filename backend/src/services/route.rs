//! Sea route planning through the language model

use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::validation::validate_center;
use shared::{Coordinate, WeatherSample};

use crate::error::{AppError, AppResult};
use crate::external::{OpenAiClient, WeatherSampleProvider};

/// Fenced JSON block in a model answer
const JSON_FENCE: &str = r"(?s)```json\s*(.*?)\s*```";

const ROUTE_SYSTEM_PROMPT: &str = "You are an expert in marine routing, providing the safest \
and most efficient sea routes based on current weather conditions. Provide only the JSON \
response for the waypoints.";

/// Route request body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    #[serde(default)]
    pub start_lat: f64,
    #[serde(default)]
    pub start_lon: f64,
    #[serde(default)]
    pub end_lat: f64,
    #[serde(default)]
    pub end_lon: f64,
}

/// One point of a proposed route
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Waypoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub waypoints: Vec<Waypoint>,
    pub message: String,
}

impl RouteRequest {
    /// Validated start and end points
    pub fn endpoints(&self) -> AppResult<(Coordinate, Coordinate)> {
        if self.start_lat == 0.0
            && self.start_lon == 0.0
            && self.end_lat == 0.0
            && self.end_lon == 0.0
        {
            return Err(AppError::ValidationError(
                "startLat, startLon, endLat and endLon are required".to_string(),
            ));
        }

        let start = validate_center(self.start_lat, self.start_lon).map_err(|e| {
            AppError::Validation {
                field: "startLat".to_string(),
                message: e.to_string(),
                message_ko: "출발지 좌표가 허용 범위를 벗어났습니다".to_string(),
            }
        })?;
        let end = validate_center(self.end_lat, self.end_lon).map_err(|e| AppError::Validation {
            field: "endLat".to_string(),
            message: e.to_string(),
            message_ko: "목적지 좌표가 허용 범위를 벗어났습니다".to_string(),
        })?;

        Ok((start, end))
    }
}

/// Route planning service
pub struct RouteService {
    provider: Arc<dyn WeatherSampleProvider>,
    openai: OpenAiClient,
}

impl RouteService {
    pub fn new(provider: Arc<dyn WeatherSampleProvider>, openai: OpenAiClient) -> Self {
        Self { provider, openai }
    }

    /// Ask the model for waypoints between two points
    pub async fn plan(&self, start: Coordinate, end: Coordinate) -> AppResult<Vec<Waypoint>> {
        // Weather at the start point is context only; route without it if unavailable
        let weather = match self.provider.fetch(start).await {
            Ok(sample) => Some(sample),
            Err(e) => {
                tracing::warn!("No start-point weather for route planning: {}", e);
                None
            }
        };

        let prompt = route_prompt(start, end, weather.as_ref(), self.openai.response_language());
        let content = self.openai.chat(ROUTE_SYSTEM_PROMPT, &prompt).await?;
        let waypoints = extract_waypoints(&content)?;

        tracing::info!(
            "Route planned from ({}, {}) to ({}, {}) with {} waypoints",
            start.latitude,
            start.longitude,
            end.latitude,
            end.longitude,
            waypoints.len()
        );
        Ok(waypoints)
    }
}

fn describe(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{}{}", v, unit),
        None => "N/A".to_string(),
    }
}

/// User prompt asking for 5 to 10 waypoints as JSON
pub fn route_prompt(
    start: Coordinate,
    end: Coordinate,
    weather: Option<&WeatherSample>,
    language: &str,
) -> String {
    let mut weather_info = String::new();
    match weather {
        Some(s) => {
            weather_info.push_str("Current weather near the start point:\n");
            weather_info.push_str(&format!(
                "  temperature: {}\n",
                describe(s.temperature_celsius, "°C")
            ));
            weather_info.push_str(&format!(
                "  apparent temperature: {}\n",
                describe(s.apparent_temperature_celsius, "°C")
            ));
            weather_info.push_str(&format!("  humidity: {}\n", describe(s.humidity_percent, "%")));
            weather_info.push_str(&format!("  wind speed: {}\n", describe(s.wind_speed_mps, "m/s")));
            weather_info.push_str(&format!(
                "  wind direction: {}\n",
                describe(s.wind_direction_deg, "°")
            ));
            weather_info.push_str(&format!(
                "  cloud cover: {}\n",
                describe(s.cloud_cover_percent, "%")
            ));
            if let Some(intensity) = s.precipitation_intensity_mm_h {
                weather_info.push_str(&format!("  precipitation: {}mm/h\n", intensity));
            }
            weather_info.push_str(&format!(
                "  conditions: {}\n",
                s.description.as_deref().unwrap_or("N/A")
            ));
            weather_info.push_str(
                "These conditions matter for the route. Avoid strong wind, heavy precipitation \
                 and severe weather such as thunderstorms or heavy snow.\n\n",
            );
        }
        None => weather_info.push_str(
            "Weather information is unavailable, so weather cannot be considered for this route.\n\n",
        ),
    }

    format!(
        "You are a marine routing expert. Using the maritime weather data, plan the safest and \
         most efficient sea route. Start (latitude: {:.6}, longitude: {:.6}), destination \
         (latitude: {:.6}, longitude: {:.6}).\n\n{}\
         Give the optimal sea route between these two points as 5 to 10 waypoints. The route \
         must not cross land. Each waypoint is a JSON object {{ \"latitude\": <lat>, \
         \"longitude\": <lon> }}.\n\
         Reply with JSON only, no other explanation, shaped exactly as {{\"waypoints\": [...]}}. \
         Any text outside the JSON should be in {}.\n\
         Example: {{\"waypoints\": [{{\"latitude\": 34.5, \"longitude\": 127.0}}, \
         {{\"latitude\": 35.0, \"longitude\": 128.0}}]}}",
        start.latitude, start.longitude, end.latitude, end.longitude, weather_info, language
    )
}

/// Numeric field of a waypoint object; missing or malformed values read as 0.0
fn number_field(node: &Value, key: &str) -> f64 {
    match node.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Parse the waypoints out of a model answer.
///
/// Uses the first fenced `json` block when present, otherwise the whole
/// trimmed answer. The JSON must hold a `waypoints` array.
pub fn extract_waypoints(content: &str) -> AppResult<Vec<Waypoint>> {
    let fenced = Regex::new(JSON_FENCE)
        .ok()
        .and_then(|re| re.captures(content))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim());
    let json = fenced.unwrap_or_else(|| content.trim());

    let parsed: Value = serde_json::from_str(json).map_err(|e| {
        tracing::warn!("Model answer is not valid JSON: {:?}", json);
        AppError::LanguageModel(format!("Route answer is not valid JSON: {}", e))
    })?;

    let waypoints = parsed
        .get("waypoints")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            AppError::LanguageModel("Route answer has no waypoints array".to_string())
        })?;

    Ok(waypoints
        .iter()
        .map(|node| Waypoint {
            latitude: number_field(node, "latitude"),
            longitude: number_field(node, "longitude"),
        })
        .collect())
}
