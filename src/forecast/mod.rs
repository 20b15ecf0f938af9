//! Forecast-dependent derived values.
//!
//! Consumes the route samples and per-point weather the upstream
//! integrations produce, and derives the values the result views need:
//! projected finish time, net minutes lost or gained to wind, max gust,
//! and the per-segment chart series.

pub mod plan;
pub mod values;

pub use plan::{plan_forecast_points, project_arrival_times, ForecastPoint};
pub use values::{compute_forecast_dependent_values, compute_with_model};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::physics::{BikeModel, EnvironmentSample, AIR_DENSITY_SEA_LEVEL};
use crate::rider::{PaceTarget, RiderProfile};

pub const MILES_TO_METERS: f64 = 1609.344;

/// Temperature assumed when a sample carries none.
pub(crate) const STANDARD_TEMPERATURE_C: f64 = 15.0;

/// Weather conditions forecast for one point along the route.
///
/// Field names follow the rows the weather-provider integration emits.
/// Missing wind or gust data means "no forecast here", not calm air.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSample {
    /// Distance from route start in miles
    pub distance: f64,
    /// Forecast valid time
    pub time: DateTime<Utc>,
    /// Sustained wind speed in mph
    #[serde(default)]
    pub wind_speed: Option<f64>,
    /// Peak gust in mph
    #[serde(default)]
    pub gust: Option<f64>,
    /// Wind origin bearing in degrees
    #[serde(default)]
    pub wind_bearing: f64,
    /// Wind bearing relative to the direction of travel, degrees
    #[serde(default)]
    pub rel_bearing: f64,
    /// Air temperature in °C
    #[serde(default)]
    pub temperature: Option<f64>,
}

/// One point of the wind-delta chart series.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    /// Segment end distance in miles
    pub distance: f64,
    /// Minutes lost (positive) or gained (negative) on the segment
    pub delta: f64,
}

/// Derived values consumed by the result views.
///
/// A pure function of its inputs — recomputed whenever the route, the
/// forecast, the start time, or the rider's pace changes, never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDependentValues {
    /// Projected arrival at the last sample; `None` without enough data
    pub finish_time: Option<DateTime<Utc>>,
    /// Net minutes lost (positive) or gained (negative) to wind
    pub weather_correction_minutes: f64,
    /// Maximum gust present in the supplied samples, mph
    pub max_gust_speed: f64,
    /// Per-segment wind deltas for charting
    pub chart_data: Vec<ChartPoint>,
}

/// Resolve the profile's pace target to a crank power in watts.
///
/// A speed target is converted once: the power needed to hold that speed
/// on flat calm ground at sea level.
pub fn target_power(profile: &RiderProfile, model: &BikeModel) -> f64 {
    match profile.pace {
        PaceTarget::Power(watts) => watts,
        PaceTarget::Speed(mph) => {
            model.power_at_velocity(mph, &EnvironmentSample::still_air(0.0, AIR_DENSITY_SEA_LEVEL))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_power_passthrough() {
        let profile = RiderProfile {
            pace: PaceTarget::Power(210.0),
            ..Default::default()
        };
        let model = BikeModel::from_profile(&profile);
        assert_eq!(target_power(&profile, &model), 210.0);
    }

    #[test]
    fn test_target_power_from_speed() {
        let profile = RiderProfile {
            pace: PaceTarget::Speed(18.0),
            ..Default::default()
        };
        let model = BikeModel::from_profile(&profile);
        let watts = target_power(&profile, &model);
        // 18 mph on the flat takes a plausible endurance power
        assert!(watts > 60.0 && watts < 250.0, "power was {} W", watts);
    }

    #[test]
    fn test_weather_sample_json_shape() {
        let json = r#"{
            "distance": 12.5,
            "time": "2026-06-01T14:00:00Z",
            "windSpeed": 8.0,
            "gust": 14.0,
            "windBearing": 270.0,
            "relBearing": 45.0,
            "temperature": 21.0
        }"#;
        let sample: WeatherSample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.wind_speed, Some(8.0));
        assert_eq!(sample.rel_bearing, 45.0);
    }

    #[test]
    fn test_weather_sample_missing_wind_fields() {
        let json = r#"{ "distance": 0.0, "time": "2026-06-01T14:00:00Z" }"#;
        let sample: WeatherSample = serde_json::from_str(json).unwrap();
        assert!(sample.wind_speed.is_none());
        assert!(sample.gust.is_none());
    }
}
