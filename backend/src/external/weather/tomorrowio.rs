//! Tomorrow.io adapter (realtime values and hourly timelines)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use shared::{Coordinate, ForecastPoint, PrecipitationType, WeatherSample};

use super::{get_json, ProviderError, WeatherSampleProvider};

/// Fields requested from both endpoints
const FIELDS: &str = "temperature,temperatureApparent,humidity,precipitationIntensity,\
precipitationType,windSpeed,windDirection,cloudCover,weatherCode";

/// Tomorrow.io weather code for a thunderstorm
const WEATHER_CODE_THUNDERSTORM: u32 = 8000;

#[derive(Clone)]
pub struct TomorrowIoProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RealtimeResponse {
    data: Option<RealtimeData>,
}

#[derive(Debug, Deserialize)]
struct RealtimeData {
    values: Option<Values>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastResponse {
    timelines: Option<Timelines>,
}

#[derive(Debug, Deserialize)]
struct Timelines {
    #[serde(default)]
    hourly: Vec<TimelineEntry>,
}

#[derive(Debug, Deserialize)]
struct TimelineEntry {
    time: DateTime<Utc>,
    values: Values,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Values {
    temperature: Option<f64>,
    temperature_apparent: Option<f64>,
    humidity: Option<f64>,
    precipitation_intensity: Option<f64>,
    precipitation_type: Option<u8>,
    wind_speed: Option<f64>,
    wind_direction: Option<f64>,
    cloud_cover: Option<f64>,
    weather_code: Option<u32>,
}

impl TomorrowIoProvider {
    pub fn new(client: Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            base_url,
        }
    }

    fn request(&self, path: &str, coordinate: Coordinate) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        let location = format!("{},{}", coordinate.latitude, coordinate.longitude);
        tracing::debug!("Tomorrow.io {} location={}", path, location);
        self.client.get(url).query(&[
            ("location", location.as_str()),
            ("fields", FIELDS),
            ("units", "metric"),
            ("apikey", self.api_key.as_str()),
        ])
    }
}

#[async_trait]
impl WeatherSampleProvider for TomorrowIoProvider {
    fn name(&self) -> &'static str {
        "tomorrowio"
    }

    async fn fetch(&self, coordinate: Coordinate) -> Result<WeatherSample, ProviderError> {
        let data: RealtimeResponse = get_json(self.request("realtime", coordinate)).await?;
        convert_realtime(data)
    }

    async fn hourly_forecast(
        &self,
        coordinate: Coordinate,
        hours: u32,
    ) -> Result<Vec<ForecastPoint>, ProviderError> {
        let request = self
            .request("forecast", coordinate)
            .query(&[("timesteps", "1h")]);
        let data: ForecastResponse = get_json(request).await?;
        convert_forecast(data, hours as usize)
    }
}

/// Tomorrow.io precipitation type codes
pub(crate) fn precipitation_type(code: u8) -> PrecipitationType {
    match code {
        0 => PrecipitationType::None,
        1 => PrecipitationType::Rain,
        2 => PrecipitationType::Snow,
        3 => PrecipitationType::FreezingRain,
        4 => PrecipitationType::Sleet,
        _ => PrecipitationType::Unknown,
    }
}

fn to_sample(values: Values) -> WeatherSample {
    WeatherSample {
        temperature_celsius: values.temperature,
        apparent_temperature_celsius: values.temperature_apparent,
        humidity_percent: values.humidity,
        precipitation_intensity_mm_h: values.precipitation_intensity,
        precipitation_type: values.precipitation_type.map(precipitation_type),
        cloud_cover_percent: values.cloud_cover,
        wind_speed_mps: values.wind_speed,
        wind_direction_deg: values.wind_direction,
        thunderstorm: values
            .weather_code
            .map(|code| code == WEATHER_CODE_THUNDERSTORM),
        description: None,
    }
}

pub(crate) fn convert_realtime(data: RealtimeResponse) -> Result<WeatherSample, ProviderError> {
    let values = data
        .data
        .and_then(|d| d.values)
        .ok_or_else(|| ProviderError::MissingData("data.values".to_string()))?;
    Ok(to_sample(values))
}

pub(crate) fn convert_forecast(
    data: ForecastResponse,
    hours: usize,
) -> Result<Vec<ForecastPoint>, ProviderError> {
    let timelines = data
        .timelines
        .ok_or_else(|| ProviderError::MissingData("timelines.hourly".to_string()))?;

    Ok(timelines
        .hourly
        .into_iter()
        .take(hours)
        .map(|entry| ForecastPoint {
            time: entry.time,
            sample: to_sample(entry.values),
        })
        .collect())
}
