//! OpenWeatherMap adapter (current weather and 3-hourly forecast)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use shared::{Coordinate, ForecastPoint, PrecipitationType, WeatherSample};

use super::{get_json, ProviderError, WeatherSampleProvider};

/// OpenWeatherMap forecasts come in 3-hour slots
const FORECAST_SLOT_HOURS: u32 = 3;

#[derive(Clone)]
pub struct OpenWeatherMapProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

/// OpenWeatherMap API response for current weather
#[derive(Debug, Deserialize)]
pub(crate) struct OWMCurrentResponse {
    #[serde(default)]
    weather: Vec<OWMWeather>,
    main: Option<OWMMain>,
    wind: Option<OWMWind>,
    clouds: Option<OWMClouds>,
    rain: Option<OWMVolume>,
    snow: Option<OWMVolume>,
}

#[derive(Debug, Deserialize)]
struct OWMWeather {
    id: u32,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OWMMain {
    temp: Option<f64>,
    feels_like: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OWMWind {
    speed: Option<f64>,
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OWMClouds {
    all: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OWMVolume {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
    #[serde(rename = "3h")]
    three_hour: Option<f64>,
}

/// OpenWeatherMap API response for forecast
#[derive(Debug, Deserialize)]
pub(crate) struct OWMForecastResponse {
    #[serde(default)]
    list: Vec<OWMForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OWMForecastItem {
    dt: i64,
    #[serde(default)]
    weather: Vec<OWMWeather>,
    main: Option<OWMMain>,
    wind: Option<OWMWind>,
    clouds: Option<OWMClouds>,
    rain: Option<OWMVolume>,
    snow: Option<OWMVolume>,
}

impl OpenWeatherMapProvider {
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
            "OpenWeatherMap {} lat={} lon={}",
            path,
            coordinate.latitude,
            coordinate.longitude
        );
        self.client.get(url).query(&[
            ("lat", coordinate.latitude.to_string()),
            ("lon", coordinate.longitude.to_string()),
            ("appid", self.api_key.clone()),
            ("units", "metric".to_string()),
        ])
    }
}

#[async_trait]
impl WeatherSampleProvider for OpenWeatherMapProvider {
    fn name(&self) -> &'static str {
        "openweathermap"
    }

    async fn fetch(&self, coordinate: Coordinate) -> Result<WeatherSample, ProviderError> {
        let data: OWMCurrentResponse = get_json(self.request("weather", coordinate)).await?;
        Ok(convert_current(data))
    }

    async fn hourly_forecast(
        &self,
        coordinate: Coordinate,
        hours: u32,
    ) -> Result<Vec<ForecastPoint>, ProviderError> {
        let data: OWMForecastResponse = get_json(self.request("forecast", coordinate)).await?;
        let slots = (hours / FORECAST_SLOT_HOURS + 1) as usize;
        Ok(convert_forecast(data, slots))
    }
}

/// Precipitation type and thunderstorm flag for an OpenWeatherMap condition id
pub(crate) fn condition_to_precipitation(id: u32) -> (PrecipitationType, bool) {
    match id {
        200..=299 => (PrecipitationType::Rain, true),
        300..=399 => (PrecipitationType::Rain, false),
        511 => (PrecipitationType::FreezingRain, false),
        500..=599 => (PrecipitationType::Rain, false),
        611..=616 => (PrecipitationType::Sleet, false),
        600..=699 => (PrecipitationType::Snow, false),
        700..=899 => (PrecipitationType::None, false),
        _ => (PrecipitationType::Unknown, false),
    }
}

/// Hourly rate from a volume block, deriving it from the 3h total when needed
fn hourly_rate(volume: Option<&OWMVolume>) -> Option<f64> {
    volume.and_then(|v| v.one_hour.or(v.three_hour.map(|total| total / 3.0)))
}

/// Combined rain and snow rate; absent when the response carried neither
fn precipitation_intensity(rain: Option<&OWMVolume>, snow: Option<&OWMVolume>) -> Option<f64> {
    match (hourly_rate(rain), hourly_rate(snow)) {
        (None, None) => None,
        (r, s) => Some(r.unwrap_or(0.0) + s.unwrap_or(0.0)),
    }
}

fn build_sample(
    weather: &[OWMWeather],
    main: Option<&OWMMain>,
    wind: Option<&OWMWind>,
    clouds: Option<&OWMClouds>,
    rain: Option<&OWMVolume>,
    snow: Option<&OWMVolume>,
) -> WeatherSample {
    let condition = weather.first();
    let (precipitation_type, thunderstorm) = match condition {
        Some(c) => {
            let (kind, thunder) = condition_to_precipitation(c.id);
            (Some(kind), Some(thunder))
        }
        None => (None, None),
    };

    WeatherSample {
        temperature_celsius: main.and_then(|m| m.temp),
        apparent_temperature_celsius: main.and_then(|m| m.feels_like),
        humidity_percent: main.and_then(|m| m.humidity),
        precipitation_intensity_mm_h: precipitation_intensity(rain, snow),
        precipitation_type,
        cloud_cover_percent: clouds.and_then(|c| c.all),
        wind_speed_mps: wind.and_then(|w| w.speed),
        wind_direction_deg: wind.and_then(|w| w.deg),
        thunderstorm,
        description: condition.and_then(|c| c.description.clone()),
    }
}

pub(crate) fn convert_current(data: OWMCurrentResponse) -> WeatherSample {
    build_sample(
        &data.weather,
        data.main.as_ref(),
        data.wind.as_ref(),
        data.clouds.as_ref(),
        data.rain.as_ref(),
        data.snow.as_ref(),
    )
}

pub(crate) fn convert_forecast(data: OWMForecastResponse, slots: usize) -> Vec<ForecastPoint> {
    data.list
        .into_iter()
        .take(slots)
        .filter_map(|item| {
            let time: DateTime<Utc> = DateTime::from_timestamp(item.dt, 0)?;
            let sample = build_sample(
                &item.weather,
                item.main.as_ref(),
                item.wind.as_ref(),
                item.clouds.as_ref(),
                item.rain.as_ref(),
                item.snow.as_ref(),
            );
            Some(ForecastPoint { time, sample })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{classify, EventTag};

    const CURRENT_RAIN: &str = r#"{
        "weather": [{"id": 501, "main": "Rain", "description": "moderate rain"}],
        "main": {"temp": 14.2, "feels_like": 13.1, "humidity": 88},
        "wind": {"speed": 9.3, "deg": 230},
        "clouds": {"all": 90},
        "rain": {"1h": 2.4},
        "dt": 1718000000
    }"#;

    #[test]
    fn test_current_rain_maps_to_sample() {
        let data: OWMCurrentResponse = serde_json::from_str(CURRENT_RAIN).unwrap();
        let sample = convert_current(data);

        assert_eq!(sample.precipitation_intensity_mm_h, Some(2.4));
        assert_eq!(sample.precipitation_type, Some(PrecipitationType::Rain));
        assert_eq!(sample.cloud_cover_percent, Some(90.0));
        assert_eq!(sample.wind_direction_deg, Some(230.0));
        assert_eq!(sample.description.as_deref(), Some("moderate rain"));

        let tags: Vec<_> = classify(&sample).into_iter().collect();
        assert_eq!(tags, vec![EventTag::Rain, EventTag::Cloudiness]);
    }

    #[test]
    fn test_clear_sky_has_no_intensity() {
        let json = r#"{
            "weather": [{"id": 800, "description": "clear sky"}],
            "main": {"temp": 21.0},
            "clouds": {"all": 0}
        }"#;
        let sample = convert_current(serde_json::from_str(json).unwrap());

        assert_eq!(sample.precipitation_intensity_mm_h, None);
        assert_eq!(sample.precipitation_type, Some(PrecipitationType::None));
        assert!(classify(&sample).is_empty());
    }

    #[test]
    fn test_three_hour_total_fallback() {
        let json = r#"{"weather": [{"id": 601}], "snow": {"3h": 1.5}}"#;
        let sample = convert_current(serde_json::from_str(json).unwrap());

        assert_eq!(sample.precipitation_intensity_mm_h, Some(0.5));
        assert_eq!(sample.precipitation_type, Some(PrecipitationType::Snow));
    }

    #[test]
    fn test_condition_table() {
        assert_eq!(condition_to_precipitation(211), (PrecipitationType::Rain, true));
        assert_eq!(condition_to_precipitation(301).0, PrecipitationType::Rain);
        assert_eq!(condition_to_precipitation(511).0, PrecipitationType::FreezingRain);
        assert_eq!(condition_to_precipitation(613).0, PrecipitationType::Sleet);
        assert_eq!(condition_to_precipitation(622).0, PrecipitationType::Snow);
        assert_eq!(condition_to_precipitation(741).0, PrecipitationType::None);
        assert_eq!(condition_to_precipitation(42).0, PrecipitationType::Unknown);
    }

    #[test]
    fn test_thunderstorm_without_volume() {
        let json = r#"{"weather": [{"id": 210, "description": "light thunderstorm"}]}"#;
        let sample = convert_current(serde_json::from_str(json).unwrap());

        let tags: Vec<_> = classify(&sample).into_iter().collect();
        assert_eq!(tags, vec![EventTag::Thunderstorm]);
    }

    #[test]
    fn test_forecast_keeps_requested_slots() {
        let json = r#"{"list": [
            {"dt": 1718000000, "main": {"temp": 10.0}, "rain": {"3h": 3.0}, "weather": [{"id": 500}]},
            {"dt": 1718010800, "main": {"temp": 11.0}},
            {"dt": 1718021600, "main": {"temp": 12.0}},
            {"dt": 1718032400, "main": {"temp": 13.0}}
        ]}"#;
        let data: OWMForecastResponse = serde_json::from_str(json).unwrap();
        let points = convert_forecast(data, (6 / FORECAST_SLOT_HOURS + 1) as usize);

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].sample.precipitation_intensity_mm_h, Some(1.0));
        assert_eq!(points[2].sample.temperature_celsius, Some(12.0));
        assert!(points[0].time < points[1].time);
    }
}
