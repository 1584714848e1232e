//! HTTP handlers for the Maritime Weather Assistant API

pub mod ai;
pub mod events;
pub mod health;
pub mod weather;

pub use ai::{plan_route, predict_disaster};
pub use events::scan_weather_events;
pub use health::health_check;
pub use weather::{get_current_weather, get_hourly_forecast};
