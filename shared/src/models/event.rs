//! Weather event models produced by grid scans

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::Coordinate;

/// Notable weather condition detected at a grid cell
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventTag {
    Rain,
    FreezingRain,
    Snow,
    Sleet,
    Hail,
    Thunderstorm,
    /// Precipitation of an unreported or unrecognized kind
    Precipitation,
    Cloudiness,
}

impl EventTag {
    /// Tags describing what is falling (or storming); a cell carries at most one
    pub fn is_precipitation_kind(&self) -> bool {
        !matches!(self, EventTag::Cloudiness)
    }
}

impl std::fmt::Display for EventTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EventTag::Rain => "Rain",
            EventTag::FreezingRain => "FreezingRain",
            EventTag::Snow => "Snow",
            EventTag::Sleet => "Sleet",
            EventTag::Hail => "Hail",
            EventTag::Thunderstorm => "Thunderstorm",
            EventTag::Precipitation => "Precipitation",
            EventTag::Cloudiness => "Cloudiness",
        };
        write!(f, "{}", name)
    }
}

/// A grid cell where at least one event was detected
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlaggedPoint {
    pub coordinate: Coordinate,
    pub tags: BTreeSet<EventTag>,
}

impl FlaggedPoint {
    /// Build a point, or `None` when no tag applies
    pub fn new(coordinate: Coordinate, tags: BTreeSet<EventTag>) -> Option<Self> {
        if tags.is_empty() {
            None
        } else {
            Some(Self { coordinate, tags })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tags_produce_no_point() {
        assert!(FlaggedPoint::new(Coordinate::new(1.0, 2.0), BTreeSet::new()).is_none());
    }

    #[test]
    fn test_tag_serializes_by_name() {
        let json = serde_json::to_string(&EventTag::FreezingRain).unwrap();
        assert_eq!(json, "\"FreezingRain\"");
        assert_eq!(EventTag::Cloudiness.to_string(), "Cloudiness");
    }

    #[test]
    fn test_only_cloudiness_is_not_precipitation() {
        assert!(!EventTag::Cloudiness.is_precipitation_kind());
        assert!(EventTag::Thunderstorm.is_precipitation_kind());
        assert!(EventTag::Precipitation.is_precipitation_kind());
    }
}
