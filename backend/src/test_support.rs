//! Fake weather providers for scanner and handler tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use shared::{Coordinate, ForecastPoint, WeatherSample};

use crate::config::{Config, ScannerConfig};
use crate::external::weather::{ProviderError, WeatherSampleProvider};
use crate::services::GridScanner;
use crate::{create_app, AppState};

type SampleFn = dyn Fn(Coordinate) -> Result<WeatherSample, ProviderError> + Send + Sync;

/// Provider answering from a closure, counting calls and in-flight requests
pub struct FakeProvider {
    respond: Box<SampleFn>,
    delay: Duration,
    pub calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeProvider {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(Coordinate) -> Result<WeatherSample, ProviderError> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

/// Router over default configuration, the given provider and no language model
pub fn test_app(provider: Arc<dyn WeatherSampleProvider>) -> axum::Router {
    create_app(AppState {
        config: Arc::new(Config::default()),
        provider,
        scanner: Arc::new(GridScanner::new(&ScannerConfig::default())),
        openai: None,
    })
}

/// Sample with only cloud cover set
pub fn cloud_cover(percent: f64) -> WeatherSample {
    WeatherSample {
        cloud_cover_percent: Some(percent),
        ..Default::default()
    }
}

#[async_trait]
impl WeatherSampleProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn fetch(&self, coordinate: Coordinate) -> Result<WeatherSample, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let result = (self.respond)(coordinate);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn hourly_forecast(
        &self,
        coordinate: Coordinate,
        hours: u32,
    ) -> Result<Vec<ForecastPoint>, ProviderError> {
        let sample = (self.respond)(coordinate)?;
        Ok((0..hours)
            .filter_map(|hour| {
                let time = Utc
                    .with_ymd_and_hms(2024, 6, 1, 0, 0, 0)
                    .single()?
                    + chrono::Duration::hours(hour as i64);
                Some(ForecastPoint {
                    time,
                    sample: sample.clone(),
                })
            })
            .collect())
    }
}
