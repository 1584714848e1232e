//! Weatherbit adapter (current observation and hourly forecast)

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use shared::validation::clamp_forecast_hours;
use shared::{Coordinate, ForecastPoint, PrecipitationType, WeatherSample};

use super::{get_json, ProviderError, WeatherSampleProvider};

/// Hourly forecast horizon available on the free plan
pub const MAX_FORECAST_HOURS: u32 = 48;

#[derive(Clone)]
pub struct WeatherbitProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WeatherbitResponse {
    #[serde(default)]
    data: Vec<WeatherbitData>,
}

#[derive(Debug, Deserialize)]
struct WeatherbitData {
    temp: Option<f64>,
    app_temp: Option<f64>,
    rh: Option<f64>,
    precip: Option<f64>,
    clouds: Option<f64>,
    wind_spd: Option<f64>,
    wind_dir: Option<f64>,
    weather: Option<WeatherbitCondition>,
    ts: Option<i64>,
    timestamp_utc: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WeatherbitCondition {
    code: Option<ConditionCode>,
    description: Option<String>,
}

/// Weatherbit sends the condition code as a number on some endpoints and a
/// string on others
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ConditionCode {
    Number(u32),
    Text(String),
}

impl ConditionCode {
    fn value(&self) -> Option<u32> {
        match self {
            ConditionCode::Number(code) => Some(*code),
            ConditionCode::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl WeatherbitProvider {
    pub fn new(client: Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            base_url,
        }
    }

    fn request(&self, path: &str, coordinate: Coordinate) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(
            "Weatherbit {} lat={} lon={}",
            path,
            coordinate.latitude,
            coordinate.longitude
        );
        self.client.get(url).query(&[
            ("lat", coordinate.latitude.to_string()),
            ("lon", coordinate.longitude.to_string()),
            ("key", self.api_key.clone()),
        ])
    }
}

#[async_trait]
impl WeatherSampleProvider for WeatherbitProvider {
    fn name(&self) -> &'static str {
        "weatherbit"
    }

    async fn fetch(&self, coordinate: Coordinate) -> Result<WeatherSample, ProviderError> {
        let data: WeatherbitResponse = get_json(self.request("current", coordinate)).await?;
        convert_current(data)
    }

    async fn hourly_forecast(
        &self,
        coordinate: Coordinate,
        hours: u32,
    ) -> Result<Vec<ForecastPoint>, ProviderError> {
        let hours = clamp_forecast_hours(hours, MAX_FORECAST_HOURS);
        let request = self
            .request("forecast/hourly", coordinate)
            .query(&[("hours", hours)]);
        let data: WeatherbitResponse = get_json(request).await?;
        Ok(convert_forecast(data))
    }
}

/// Precipitation type and thunderstorm flag for a Weatherbit condition code
pub(crate) fn condition_to_precipitation(code: u32) -> (PrecipitationType, bool) {
    match code {
        233 => (PrecipitationType::Hail, true),
        200..=299 => (PrecipitationType::Rain, true),
        300..=399 => (PrecipitationType::Rain, false),
        511 => (PrecipitationType::FreezingRain, false),
        500..=599 => (PrecipitationType::Rain, false),
        610..=612 => (PrecipitationType::Sleet, false),
        600..=699 => (PrecipitationType::Snow, false),
        700..=900 => (PrecipitationType::None, false),
        _ => (PrecipitationType::Unknown, false),
    }
}

fn to_sample(entry: &WeatherbitData) -> WeatherSample {
    let code = entry
        .weather
        .as_ref()
        .and_then(|w| w.code.as_ref())
        .and_then(ConditionCode::value);
    let (precipitation_type, thunderstorm) = match code.map(condition_to_precipitation) {
        Some((kind, thunder)) => (Some(kind), Some(thunder)),
        None => (None, None),
    };

    WeatherSample {
        temperature_celsius: entry.temp,
        apparent_temperature_celsius: entry.app_temp,
        humidity_percent: entry.rh,
        precipitation_intensity_mm_h: entry.precip,
        precipitation_type,
        cloud_cover_percent: entry.clouds,
        wind_speed_mps: entry.wind_spd,
        wind_direction_deg: entry.wind_dir,
        thunderstorm,
        description: entry.weather.as_ref().and_then(|w| w.description.clone()),
    }
}

/// Observation time, from the unix timestamp or the UTC timestamp string
fn entry_time(entry: &WeatherbitData) -> Option<DateTime<Utc>> {
    if let Some(ts) = entry.ts {
        return DateTime::from_timestamp(ts, 0);
    }
    let text = entry.timestamp_utc.as_deref()?;
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

pub(crate) fn convert_current(data: WeatherbitResponse) -> Result<WeatherSample, ProviderError> {
    data.data
        .first()
        .map(to_sample)
        .ok_or_else(|| ProviderError::MissingData("data[0]".to_string()))
}

pub(crate) fn convert_forecast(data: WeatherbitResponse) -> Vec<ForecastPoint> {
    data.data
        .iter()
        .filter_map(|entry| {
            let time = entry_time(entry)?;
            Some(ForecastPoint {
                time,
                sample: to_sample(entry),
            })
        })
        .collect()
}
