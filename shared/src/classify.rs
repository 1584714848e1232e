//! Weather event classification
//!
//! Maps a single [`WeatherSample`] to the set of [`EventTag`]s it exhibits.
//! Precipitation is classified first-match into exactly one kind; cloudiness
//! is checked independently and can accompany any precipitation tag.

use std::collections::BTreeSet;

use crate::models::{EventTag, PrecipitationType, WeatherSample};

/// Cloud cover at or above which a cell is tagged [`EventTag::Cloudiness`]
pub const CLOUDINESS_THRESHOLD_PERCENT: f64 = 50.0;

/// Classify one sample. Returns an empty set when nothing notable is reported.
pub fn classify(sample: &WeatherSample) -> BTreeSet<EventTag> {
    let mut tags = BTreeSet::new();

    if let Some(tag) = precipitation_tag(sample) {
        tags.insert(tag);
    }

    if sample
        .cloud_cover_percent
        .is_some_and(|cover| cover >= CLOUDINESS_THRESHOLD_PERCENT)
    {
        tags.insert(EventTag::Cloudiness);
    }

    tags
}

/// The single precipitation-kind tag for a sample, if any
fn precipitation_tag(sample: &WeatherSample) -> Option<EventTag> {
    let falling = sample
        .precipitation_intensity_mm_h
        .is_some_and(|intensity| intensity > 0.0);

    if falling {
        return Some(match sample.precipitation_type {
            Some(PrecipitationType::Rain) => EventTag::Rain,
            Some(PrecipitationType::FreezingRain) => EventTag::FreezingRain,
            Some(PrecipitationType::Snow) => EventTag::Snow,
            Some(PrecipitationType::Sleet) => EventTag::Sleet,
            Some(PrecipitationType::Hail) => EventTag::Hail,
            Some(PrecipitationType::None | PrecipitationType::Unknown) | None => {
                EventTag::Precipitation
            }
        });
    }

    if sample.thunderstorm == Some(true) {
        return Some(EventTag::Thunderstorm);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raining(kind: Option<PrecipitationType>) -> WeatherSample {
        WeatherSample {
            precipitation_intensity_mm_h: Some(1.2),
            precipitation_type: kind,
            ..Default::default()
        }
    }

    #[test]
    fn test_precipitation_type_table() {
        let table = [
            (Some(PrecipitationType::Rain), EventTag::Rain),
            (Some(PrecipitationType::FreezingRain), EventTag::FreezingRain),
            (Some(PrecipitationType::Snow), EventTag::Snow),
            (Some(PrecipitationType::Sleet), EventTag::Sleet),
            (Some(PrecipitationType::Hail), EventTag::Hail),
            (Some(PrecipitationType::Unknown), EventTag::Precipitation),
            (Some(PrecipitationType::None), EventTag::Precipitation),
            (None, EventTag::Precipitation),
        ];

        for (kind, expected) in table {
            assert_eq!(classify(&raining(kind)), BTreeSet::from([expected]), "{:?}", kind);
        }
    }

    #[test]
    fn test_zero_or_missing_intensity_is_dry() {
        let mut sample = raining(Some(PrecipitationType::Snow));
        sample.precipitation_intensity_mm_h = Some(0.0);
        assert!(classify(&sample).is_empty());

        sample.precipitation_intensity_mm_h = None;
        assert!(classify(&sample).is_empty());
    }

    #[test]
    fn test_cloudiness_threshold() {
        let at = WeatherSample {
            cloud_cover_percent: Some(50.0),
            ..Default::default()
        };
        let below = WeatherSample {
            cloud_cover_percent: Some(49.9),
            ..Default::default()
        };

        assert_eq!(classify(&at), BTreeSet::from([EventTag::Cloudiness]));
        assert!(classify(&below).is_empty());
    }

    #[test]
    fn test_cloudiness_is_additive() {
        let mut sample = raining(Some(PrecipitationType::Hail));
        sample.cloud_cover_percent = Some(90.0);

        assert_eq!(
            classify(&sample),
            BTreeSet::from([EventTag::Hail, EventTag::Cloudiness])
        );
    }

    #[test]
    fn test_missing_cloud_cover_never_cloudy() {
        let sample = WeatherSample {
            humidity_percent: Some(100.0),
            ..Default::default()
        };
        assert!(classify(&sample).is_empty());
    }

    #[test]
    fn test_thunderstorm_only_without_precipitation() {
        let storm = WeatherSample {
            thunderstorm: Some(true),
            ..Default::default()
        };
        assert_eq!(classify(&storm), BTreeSet::from([EventTag::Thunderstorm]));

        let mut wet_storm = raining(Some(PrecipitationType::Rain));
        wet_storm.thunderstorm = Some(true);
        assert_eq!(classify(&wet_storm), BTreeSet::from([EventTag::Rain]));
    }
}
