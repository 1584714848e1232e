//! Validation utilities for scan and weather request parameters

use crate::error::GridError;
use crate::types::Coordinate;

/// Largest radius accepted for a scan; at it the window covers the globe
pub const MAX_SEARCH_RADIUS_DEGREES: f64 = 180.0;

/// Validate a center point and build the coordinate
pub fn validate_center(latitude: f64, longitude: f64) -> Result<Coordinate, GridError> {
    let center = Coordinate::new(latitude, longitude);
    if center.is_valid() {
        Ok(center)
    } else {
        Err(GridError::InvalidCoordinate {
            latitude,
            longitude,
        })
    }
}

/// Validate a search radius in degrees (0, 180]
pub fn validate_radius(radius_degrees: f64) -> Result<f64, GridError> {
    if radius_degrees.is_finite()
        && radius_degrees > 0.0
        && radius_degrees <= MAX_SEARCH_RADIUS_DEGREES
    {
        Ok(radius_degrees)
    } else {
        Err(GridError::InvalidRadius(radius_degrees))
    }
}

/// Validate a grid step: strictly positive and finite
pub fn validate_step(axis: &'static str, value: f64) -> Result<f64, GridError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(GridError::InvalidStep { axis, value })
    }
}

/// Clamp requested forecast hours into `1..=max_hours`
pub fn clamp_forecast_hours(hours: u32, max_hours: u32) -> u32 {
    hours.clamp(1, max_hours.max(1))
}
