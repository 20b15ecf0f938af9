//! Forecast point planning: where and when to ask for weather.
//!
//! Projects the rider's clock along the route at the calm-air pace, then
//! emits one fetch point per interval step so the provider integration
//! knows which (location, time) pairs to request.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{target_power, MILES_TO_METERS, STANDARD_TEMPERATURE_C};
use crate::physics::{air_density, BikeModel, EnvironmentSample, MPH_TO_MS};
use crate::rider::RiderProfile;
use crate::route::RouteSample;

/// Tightest forecast spacing any supported provider allows, in hours.
pub const MIN_FORECAST_INTERVAL_HOURS: f64 = 0.25;
/// Widest useful forecast spacing, in hours.
pub const MAX_FORECAST_INTERVAL_HOURS: f64 = 2.0;

/// A (location, time) pair to fetch a forecast for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    /// GPS latitude
    pub lat: f64,
    /// GPS longitude
    pub lon: f64,
    /// Distance from route start in miles
    pub distance: f64,
    /// Projected arrival time
    pub time: DateTime<Utc>,
}

/// Projected elapsed seconds at each route sample, riding at the
/// profile's calm-air pace.
///
/// Segments the rider cannot clear at the target power contribute no
/// time (logged, not fatal), so the projection stays monotonic.
pub fn project_arrival_times(route: &[RouteSample], profile: &RiderProfile) -> Vec<f64> {
    let model = BikeModel::from_profile(profile);
    let power = target_power(profile, &model);

    let mut times = Vec::with_capacity(route.len());
    let mut elapsed_s = 0.0;

    if route.is_empty() {
        return times;
    }
    times.push(0.0);

    for pair in route.windows(2) {
        let (from, to) = (&pair[0], &pair[1]);
        let distance_m = (to.distance_m - from.distance_m).max(0.0);
        if distance_m > 0.0 {
            let grade = ((to.elevation_m - from.elevation_m) / distance_m).clamp(-0.3, 0.3);
            let elevation = 0.5 * (from.elevation_m + to.elevation_m);
            let env =
                EnvironmentSample::still_air(grade, air_density(elevation, STANDARD_TEMPERATURE_C));
            let speed_mph = model.solve_velocity(power, &env).value;
            if speed_mph > 0.0 {
                elapsed_s += distance_m / (speed_mph * MPH_TO_MS);
            } else {
                tracing::warn!(
                    "segment at {:.1} km not rideable at {:.0} W, projecting no time for it",
                    from.distance_m / 1000.0,
                    power
                );
            }
        }
        times.push(elapsed_s);
    }

    times
}

/// Plan the forecast fetch points for a ride.
///
/// One point at the start, one each time the projected clock crosses the
/// next interval boundary, and one at the route end. The interval is
/// clamped to the supported provider bounds.
pub fn plan_forecast_points(
    route: &[RouteSample],
    profile: &RiderProfile,
    start_time: DateTime<Utc>,
    interval_hours: f64,
) -> Vec<ForecastPoint> {
    if route.is_empty() {
        return Vec::new();
    }

    let interval =
        interval_hours.clamp(MIN_FORECAST_INTERVAL_HOURS, MAX_FORECAST_INTERVAL_HOURS);
    let step_s = interval * 3600.0;
    let times = project_arrival_times(route, profile);

    let mut points: Vec<ForecastPoint> = Vec::new();
    let mut next_boundary = 0.0;

    for (sample, &elapsed_s) in route.iter().zip(times.iter()) {
        if elapsed_s >= next_boundary {
            points.push(forecast_point(sample, start_time, elapsed_s));
            next_boundary = ((elapsed_s / step_s).floor() + 1.0) * step_s;
        }
    }

    // The route end always gets a point
    let last = route.last().expect("route checked non-empty");
    let last_elapsed = *times.last().expect("times match route length");
    let already_there = points
        .last()
        .map(|p| (p.distance - last.distance_m / MILES_TO_METERS).abs() < 1e-9)
        .unwrap_or(false);
    if !already_there {
        points.push(forecast_point(last, start_time, last_elapsed));
    }

    points
}

fn forecast_point(sample: &RouteSample, start_time: DateTime<Utc>, elapsed_s: f64) -> ForecastPoint {
    ForecastPoint {
        lat: sample.latitude,
        lon: sample.longitude,
        distance: sample.distance_m / MILES_TO_METERS,
        time: start_time + Duration::milliseconds((elapsed_s * 1000.0).round() as i64),
    }
}
