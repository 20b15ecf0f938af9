//! Rider power and wind-resistance physics.
//!
//! The model converts between crank power and ground speed under wind,
//! grade, and rolling-resistance effects. Velocity-from-power runs through
//! the Newton-Raphson solver; power-from-velocity is a direct evaluation.

pub mod model;
pub mod solver;

pub use model::{air_density, BikeModel, EnvironmentSample, AIR_DENSITY_SEA_LEVEL, MPH_TO_MS};
pub use solver::{newton, SolverConfig, SolverOutcome};

use thiserror::Error;

/// Physics-layer errors. Only contract violations surface as errors;
/// physically implausible inputs degrade to the zero fallback instead.
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// The power/velocity call contract was violated.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Solve for velocity from power, or power from velocity.
///
/// Exactly one of `power` (watts) / `velocity` (mph) must be supplied:
/// given power, the solver returns the sustained ground speed in mph (zero
/// when forward motion is infeasible under these conditions); given
/// velocity, the required crank power in watts is evaluated directly.
/// Supplying both or neither is a contract violation.
pub fn get_power_or_velocity(
    model: &BikeModel,
    grade: f64,
    wind_speed_mph: f64,
    wind_bearing_deg: f64,
    air_density: f64,
    power: Option<f64>,
    velocity: Option<f64>,
) -> Result<f64, PhysicsError> {
    let env = EnvironmentSample {
        grade,
        wind_speed_mph,
        wind_bearing_deg,
        air_density,
    };

    match (power, velocity) {
        (Some(p), None) => Ok(model.solve_velocity(p, &env).value),
        (None, Some(v)) => Ok(model.power_at_velocity(v, &env)),
        (Some(_), Some(_)) => Err(PhysicsError::InvalidArgument(
            "both power and velocity supplied".to_string(),
        )),
        (None, None) => Err(PhysicsError::InvalidArgument(
            "neither power nor velocity supplied".to_string(),
        )),
    }
}
