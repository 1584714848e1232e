//! External API integrations

pub mod openai;
pub mod weather;

pub use openai::OpenAiClient;
pub use weather::{build_provider, ProviderError, WeatherSampleProvider};
