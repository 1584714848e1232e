//! Configuration management for the Maritime Weather Assistant
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with MWA_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Weather provider configuration
    pub weather: WeatherConfig,

    /// Grid scanner configuration
    pub scanner: ScannerConfig,

    /// Language model configuration
    pub openai: OpenAiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

/// Which third-party API backs the weather provider
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeatherProviderKind {
    #[default]
    OpenWeatherMap,
    TomorrowIo,
    Weatherbit,
}

impl WeatherProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherProviderKind::OpenWeatherMap => "openweathermap",
            WeatherProviderKind::TomorrowIo => "tomorrowio",
            WeatherProviderKind::Weatherbit => "weatherbit",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderEndpoint {
    /// API base URL
    pub base_url: String,

    /// API key
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Provider used for scans, current conditions and forecasts
    pub provider: WeatherProviderKind,

    /// Timeout for a single provider request in seconds
    pub request_timeout_secs: u64,

    pub openweathermap: ProviderEndpoint,

    pub tomorrowio: ProviderEndpoint,

    pub weatherbit: ProviderEndpoint,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScannerConfig {
    /// Number of provider calls in flight at once
    pub concurrency: usize,

    /// Timeout for one grid cell in seconds
    pub cell_timeout_secs: u64,

    /// Maximum number of cells a single request may query
    pub max_cells: usize,

    /// Radius used when the request omits searchRadiusDegrees
    pub default_radius_degrees: f64,

    /// Latitude step used when the request omits latStep
    pub default_lat_step: f64,

    /// Longitude step used when the request omits lonStep
    pub default_lon_step: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenAiConfig {
    /// API base URL (chat completions are posted to {base_url}/chat/completions)
    pub base_url: String,

    /// API key; AI endpoints are disabled when empty
    pub api_key: String,

    /// Chat model name
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Language the model is asked to answer in
    pub response_language: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("MWA_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 8080)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("weather.provider", "openweathermap")?
            .set_default("weather.request_timeout_secs", 10)?
            .set_default(
                "weather.openweathermap.base_url",
                "https://api.openweathermap.org/data/2.5",
            )?
            .set_default("weather.openweathermap.api_key", "")?
            .set_default("weather.tomorrowio.base_url", "https://api.tomorrow.io/v4/weather")?
            .set_default("weather.tomorrowio.api_key", "")?
            .set_default("weather.weatherbit.base_url", "https://api.weatherbit.io/v2.0")?
            .set_default("weather.weatherbit.api_key", "")?
            .set_default("scanner.concurrency", 10)?
            .set_default("scanner.cell_timeout_secs", 10)?
            .set_default("scanner.max_cells", 2000)?
            .set_default("scanner.default_radius_degrees", 25.0)?
            .set_default("scanner.default_lat_step", 5.0)?
            .set_default("scanner.default_lon_step", 5.0)?
            .set_default("openai.base_url", "https://api.openai.com/v1")?
            .set_default("openai.api_key", "")?
            .set_default("openai.model", "gpt-3.5-turbo")?
            .set_default("openai.temperature", 0.7)?
            .set_default("openai.response_language", "Korean")?
            .set_default("openai.timeout_secs", 60)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (MWA_ prefix)
            .add_source(
                Environment::with_prefix("MWA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl WeatherConfig {
    /// Endpoint settings of the selected provider
    pub fn selected(&self) -> &ProviderEndpoint {
        match self.provider {
            WeatherProviderKind::OpenWeatherMap => &self.openweathermap,
            WeatherProviderKind::TomorrowIo => &self.tomorrowio,
            WeatherProviderKind::Weatherbit => &self.weatherbit,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            provider: WeatherProviderKind::default(),
            request_timeout_secs: 10,
            openweathermap: ProviderEndpoint {
                base_url: "https://api.openweathermap.org/data/2.5".to_string(),
                api_key: String::new(),
            },
            tomorrowio: ProviderEndpoint {
                base_url: "https://api.tomorrow.io/v4/weather".to_string(),
                api_key: String::new(),
            },
            weatherbit: ProviderEndpoint {
                base_url: "https://api.weatherbit.io/v2.0".to_string(),
                api_key: String::new(),
            },
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            cell_timeout_secs: 10,
            max_cells: 2000,
            default_radius_degrees: 25.0,
            default_lat_step: 5.0,
            default_lon_step: 5.0,
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            response_language: "Korean".to_string(),
            timeout_secs: 60,
        }
    }
}
