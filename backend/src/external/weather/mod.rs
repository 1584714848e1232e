//! Weather provider port and the third-party API adapters behind it
//!
//! The grid scanner and the single-point endpoints only see
//! [`WeatherSampleProvider`]; which API answers is picked from configuration.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::{Coordinate, ForecastPoint, WeatherSample};
use thiserror::Error;

use crate::config::{WeatherConfig, WeatherProviderKind};
use crate::error::{AppError, AppResult};

pub mod openweathermap;
pub mod tomorrowio;
pub mod weatherbit;

pub use openweathermap::OpenWeatherMapProvider;
pub use tomorrowio::TomorrowIoProvider;
pub use weatherbit::WeatherbitProvider;

/// Errors raised by a single provider call
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("response is missing {0}")]
    MissingData(String),
}

/// Source of weather samples for a coordinate
#[async_trait]
pub trait WeatherSampleProvider: Send + Sync {
    /// Short provider name used in logs and the health endpoint
    fn name(&self) -> &'static str;

    /// Current conditions at a coordinate
    async fn fetch(&self, coordinate: Coordinate) -> Result<WeatherSample, ProviderError>;

    /// Forecast covering roughly the next `hours` hours, oldest first
    async fn hourly_forecast(
        &self,
        coordinate: Coordinate,
        hours: u32,
    ) -> Result<Vec<ForecastPoint>, ProviderError>;
}

/// Build the provider selected in configuration
pub fn build_provider(config: &WeatherConfig) -> AppResult<Arc<dyn WeatherSampleProvider>> {
    let endpoint = config.selected();
    if endpoint.api_key.trim().is_empty() {
        return Err(AppError::Configuration(format!(
            "weather.{}.api_key is not set",
            config.provider.as_str()
        )));
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

    let api_key = endpoint.api_key.clone();
    let base_url = endpoint.base_url.trim_end_matches('/').to_string();

    let provider: Arc<dyn WeatherSampleProvider> = match config.provider {
        WeatherProviderKind::OpenWeatherMap => {
            Arc::new(OpenWeatherMapProvider::new(client, api_key, base_url))
        }
        WeatherProviderKind::TomorrowIo => {
            Arc::new(TomorrowIoProvider::new(client, api_key, base_url))
        }
        WeatherProviderKind::Weatherbit => {
            Arc::new(WeatherbitProvider::new(client, api_key, base_url))
        }
    };

    tracing::info!("Weather provider: {}", provider.name());
    Ok(provider)
}

/// Send a request and decode a JSON body, mapping non-2xx responses to errors
pub(crate) async fn get_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ProviderError> {
    let response = request.send().await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status { status, body });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::Decode(e.to_string()))
}
