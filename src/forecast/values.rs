//! The forecast-dependent values aggregator.

use chrono::{DateTime, Duration, Utc};

use super::{
    target_power, ChartPoint, ForecastDependentValues, WeatherSample, MILES_TO_METERS,
    STANDARD_TEMPERATURE_C,
};
use crate::physics::{air_density, BikeModel, EnvironmentSample};
use crate::rider::RiderProfile;
use crate::route::{self, RouteSample};

/// Derive finish time, weather correction, max gust, and the chart series
/// from a route, its forecast samples, and the rider's pace.
///
/// Stateless and side-effect-free: identical inputs produce identical
/// output, so callers are free to memoize. Never fails — incomplete
/// inputs degrade to the empty result instead.
pub fn compute_forecast_dependent_values(
    route: &[RouteSample],
    weather: &[WeatherSample],
    profile: &RiderProfile,
    start_time: DateTime<Utc>,
) -> ForecastDependentValues {
    let model = BikeModel::from_profile(profile);
    let power = target_power(profile, &model);
    compute_with_model(route, weather, &model, power, start_time)
}

/// Aggregation with an explicit model and power, for callers that vary
/// physical constants directly.
///
/// Walks consecutive weather-sample pairs in distance order. Each
/// segment's duration comes from the solved ground speed at the rider's
/// power under the segment's grade, density, and wind; a second solve with
/// the wind removed gives the calm-air baseline that isolates the wind's
/// time contribution. Positive correction minutes are time lost to wind.
pub fn compute_with_model(
    route: &[RouteSample],
    weather: &[WeatherSample],
    model: &BikeModel,
    power_watts: f64,
    start_time: DateTime<Utc>,
) -> ForecastDependentValues {
    if route.is_empty() || weather.is_empty() {
        return ForecastDependentValues::default();
    }

    let max_gust_speed = weather
        .iter()
        .filter_map(|sample| sample.gust)
        .fold(0.0, f64::max);

    if weather.len() < 2 {
        return ForecastDependentValues {
            max_gust_speed,
            ..Default::default()
        };
    }

    tracing::debug!(
        "computing forecast-dependent values: {} segments at {:.0} W",
        weather.len() - 1,
        power_watts
    );

    let mut elapsed_minutes = 0.0;
    let mut correction_minutes = 0.0;
    let mut chart_data = Vec::with_capacity(weather.len() - 1);

    for pair in weather.windows(2) {
        let (from, to) = (&pair[0], &pair[1]);
        let distance_mi = to.distance - from.distance;
        if distance_mi <= 0.0 {
            continue;
        }

        let start_m = from.distance * MILES_TO_METERS;
        let end_m = to.distance * MILES_TO_METERS;
        let grade = route::grade_between(route, start_m, end_m);
        let elevation =
            0.5 * (route::elevation_at(route, start_m) + route::elevation_at(route, end_m));
        let rho = air_density(
            elevation,
            from.temperature.unwrap_or(STANDARD_TEMPERATURE_C),
        );

        let calm = EnvironmentSample::still_air(grade, rho);
        let baseline_mph = model.solve_velocity(power_watts, &calm).value;
        if baseline_mph <= 0.0 {
            tracing::warn!(
                "segment at {:.1} mi infeasible at {:.0} W even in calm air, skipping",
                from.distance,
                power_watts
            );
            continue;
        }
        let baseline_minutes = distance_mi / baseline_mph * 60.0;

        let Some(wind_speed) = from.wind_speed else {
            // No forecast for this segment: it rides at the baseline and
            // contributes nothing to the correction.
            elapsed_minutes += baseline_minutes;
            continue;
        };

        let env = EnvironmentSample {
            grade,
            wind_speed_mph: wind_speed,
            wind_bearing_deg: from.rel_bearing,
            air_density: rho,
        };
        let actual_mph = model.solve_velocity(power_watts, &env).value;
        if actual_mph <= 0.0 {
            tracing::warn!(
                "wind at {:.1} mi stops forward motion at {:.0} W, using calm-air pace",
                from.distance,
                power_watts
            );
            elapsed_minutes += baseline_minutes;
            continue;
        }

        let actual_minutes = distance_mi / actual_mph * 60.0;
        let delta = actual_minutes - baseline_minutes;

        elapsed_minutes += actual_minutes;
        correction_minutes += delta;
        chart_data.push(ChartPoint {
            distance: to.distance,
            delta,
        });
    }

    let finish_time =
        start_time + Duration::milliseconds((elapsed_minutes * 60_000.0).round() as i64);

    ForecastDependentValues {
        finish_time: Some(finish_time),
        weather_correction_minutes: correction_minutes,
        max_gust_speed,
        chart_data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn flat_route(miles: f64) -> Vec<RouteSample> {
        let total_m = miles * MILES_TO_METERS;
        (0..=10)
            .map(|i| RouteSample {
                distance_m: total_m * i as f64 / 10.0,
                elevation_m: 100.0,
                latitude: 45.0,
                longitude: -122.0,
            })
            .collect()
    }

    fn sample(distance: f64, wind_speed: Option<f64>, rel_bearing: f64) -> WeatherSample {
        WeatherSample {
            distance,
            time: Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap(),
            wind_speed,
            gust: None,
            wind_bearing: 0.0,
            rel_bearing,
            temperature: Some(15.0),
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_route_yields_defaults() {
        let values = compute_forecast_dependent_values(
            &[],
            &[sample(0.0, Some(5.0), 0.0)],
            &RiderProfile::default(),
            start(),
        );
        assert!(values.finish_time.is_none());
        assert_eq!(values.weather_correction_minutes, 0.0);
        assert_eq!(values.max_gust_speed, 0.0);
        assert!(values.chart_data.is_empty());
    }

    #[test]
    fn test_empty_weather_yields_defaults() {
        let values = compute_forecast_dependent_values(
            &flat_route(20.0),
            &[],
            &RiderProfile::default(),
            start(),
        );
        assert!(values.finish_time.is_none());
        assert_eq!(values.weather_correction_minutes, 0.0);
    }

    #[test]
    fn test_headwind_loses_time() {
        let route = flat_route(20.0);
        let weather = vec![sample(0.0, Some(10.0), 0.0), sample(20.0, Some(10.0), 0.0)];
        let values =
            compute_forecast_dependent_values(&route, &weather, &RiderProfile::default(), start());
        assert!(
            values.weather_correction_minutes > 0.0,
            "correction was {}",
            values.weather_correction_minutes
        );
    }

    #[test]
    fn test_tailwind_gains_time() {
        let route = flat_route(20.0);
        let weather = vec![
            sample(0.0, Some(10.0), 180.0),
            sample(20.0, Some(10.0), 180.0),
        ];
        let values =
            compute_forecast_dependent_values(&route, &weather, &RiderProfile::default(), start());
        assert!(
            values.weather_correction_minutes < 0.0,
            "correction was {}",
            values.weather_correction_minutes
        );
    }

    #[test]
    fn test_headwind_finishes_after_tailwind() {
        let route = flat_route(20.0);
        let head = vec![sample(0.0, Some(10.0), 0.0), sample(20.0, Some(10.0), 0.0)];
        let tail = vec![
            sample(0.0, Some(10.0), 180.0),
            sample(20.0, Some(10.0), 180.0),
        ];
        let profile = RiderProfile::default();
        let head_finish = compute_forecast_dependent_values(&route, &head, &profile, start())
            .finish_time
            .unwrap();
        let tail_finish = compute_forecast_dependent_values(&route, &tail, &profile, start())
            .finish_time
            .unwrap();
        assert!(head_finish > tail_finish);
    }

    #[test]
    fn test_max_gust_is_literal_maximum() {
        let route = flat_route(20.0);
        let mut weather = vec![sample(0.0, Some(5.0), 0.0), sample(20.0, Some(5.0), 0.0)];
        weather[0].gust = Some(6.0);
        weather[1].gust = Some(3.0);
        let values =
            compute_forecast_dependent_values(&route, &weather, &RiderProfile::default(), start());
        assert_eq!(values.max_gust_speed, 6.0);
    }

    #[test]
    fn test_missing_wind_contributes_zero_correction() {
        let route = flat_route(20.0);
        let weather = vec![sample(0.0, None, 0.0), sample(20.0, None, 0.0)];
        let values =
            compute_forecast_dependent_values(&route, &weather, &RiderProfile::default(), start());
        assert_eq!(values.weather_correction_minutes, 0.0);
        // The clock still runs at the calm-air pace
        let finish = values.finish_time.unwrap();
        assert!(finish > start());
        assert!(values.chart_data.is_empty());
    }

    #[test]
    fn test_chart_data_per_segment() {
        let route = flat_route(30.0);
        let weather = vec![
            sample(0.0, Some(10.0), 0.0),
            sample(10.0, Some(10.0), 90.0),
            sample(20.0, Some(10.0), 180.0),
            sample(30.0, Some(10.0), 180.0),
        ];
        let values =
            compute_forecast_dependent_values(&route, &weather, &RiderProfile::default(), start());
        assert_eq!(values.chart_data.len(), 3);
        // First segment is a headwind, last a tailwind
        assert!(values.chart_data[0].delta > 0.0);
        assert!(values.chart_data[2].delta < 0.0);
        assert_eq!(values.chart_data[1].distance, 20.0);
    }

    #[test]
    fn test_idempotent() {
        let route = flat_route(20.0);
        let weather = vec![sample(0.0, Some(8.0), 30.0), sample(20.0, Some(8.0), 30.0)];
        let profile = RiderProfile::default();
        let a = compute_forecast_dependent_values(&route, &weather, &profile, start());
        let b = compute_forecast_dependent_values(&route, &weather, &profile, start());
        assert_eq!(a.finish_time, b.finish_time);
        assert_eq!(a.weather_correction_minutes, b.weather_correction_minutes);
    }
}
