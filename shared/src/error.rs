//! Errors raised while building a scan grid

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("{axis} step must be a positive number, got {value}")]
    InvalidStep { axis: &'static str, value: f64 },

    #[error("search radius must be a positive number, got {0}")]
    InvalidRadius(f64),

    #[error("coordinate out of range: lat={latitude}, lon={longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("window wraps the antimeridian ({min_lon} > {max_lon}); split it first")]
    WrappingWindow { min_lon: f64, max_lon: f64 },

    #[error("scan would query {requested} cells, limit is {limit}")]
    TooManyCells { requested: usize, limit: usize },
}

impl GridError {
    /// Name of the request parameter the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            GridError::InvalidStep { axis, .. } => {
                if *axis == "latitude" {
                    "latStep"
                } else {
                    "lonStep"
                }
            }
            GridError::InvalidRadius(_) => "searchRadiusDegrees",
            GridError::InvalidCoordinate { .. } => "centerLat",
            GridError::WrappingWindow { .. } => "centerLon",
            GridError::TooManyCells { .. } => "latStep",
        }
    }
}
