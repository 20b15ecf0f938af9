//! Routecast - Cycling Route Weather-Forecast Planning
//!
//! Given a route and a planned start time and pace, routecast predicts the
//! effect of forecast weather along the way: projected finish time, net
//! minutes lost or gained to wind, and the maximum gust the rider will see.
//! The heart of it is a rider-power/wind-resistance model solved with
//! Newton-Raphson iteration per route segment.

pub mod forecast;
pub mod physics;
pub mod rider;
pub mod route;

// Re-export commonly used types
pub use forecast::{
    compute_forecast_dependent_values, plan_forecast_points, ForecastDependentValues,
    WeatherSample,
};
pub use physics::{get_power_or_velocity, BikeModel, EnvironmentSample};
pub use rider::RiderProfile;
pub use route::{parse_gpx, ImportedRoute};
