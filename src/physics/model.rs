//! Cycling physics model for power-to-speed conversion.
//!
//! Balances a rider's propulsive power against aerodynamic drag, rolling
//! resistance, and the gravity component of the road grade, with wind folded
//! into the drag term as a bearing-projected headwind component.

use super::solver::{newton, SolverConfig, SolverOutcome};
use crate::rider::RiderProfile;

/// Physics constants
pub const AIR_DENSITY_SEA_LEVEL: f64 = 1.225; // kg/m³ at 15 °C
pub const GRAVITY: f64 = 9.81; // m/s²
pub const MPH_TO_MS: f64 = 0.44704;
const DEFAULT_CDA: f64 = 0.32; // m² (hoods position)
const DEFAULT_CRR: f64 = 0.004; // road tires
const BIKE_MASS: f64 = 8.0; // kg
const DEFAULT_EFFICIENCY: f64 = 0.95; // drivetrain, crank to wheel

/// Environmental conditions at one point of the route.
///
/// The wind bearing is relative to the direction of travel: 0° is a dead
/// headwind, 180° a dead tailwind.
#[derive(Debug, Clone, Copy)]
pub struct EnvironmentSample {
    /// Road grade as a fraction (rise/run)
    pub grade: f64,
    /// Sustained wind speed in mph
    pub wind_speed_mph: f64,
    /// Wind bearing relative to travel direction, degrees
    pub wind_bearing_deg: f64,
    /// Air density in kg/m³
    pub air_density: f64,
}

impl Default for EnvironmentSample {
    fn default() -> Self {
        Self {
            grade: 0.0,
            wind_speed_mph: 0.0,
            wind_bearing_deg: 0.0,
            air_density: AIR_DENSITY_SEA_LEVEL,
        }
    }
}

impl EnvironmentSample {
    /// Conditions with no wind at the given grade and density.
    pub fn still_air(grade: f64, air_density: f64) -> Self {
        Self {
            grade,
            air_density,
            ..Default::default()
        }
    }

    /// This sample with the wind removed (the calm-air baseline).
    pub fn without_wind(&self) -> Self {
        Self {
            wind_speed_mph: 0.0,
            ..*self
        }
    }

    /// Wind component opposing travel, in mph.
    ///
    /// Positive slows the rider down, negative pushes from behind.
    pub fn headwind_component_mph(&self) -> f64 {
        self.wind_speed_mph * self.wind_bearing_deg.to_radians().cos()
    }
}

/// Rider-and-bike model with the constants the power balance needs.
///
/// Every physical constant lives here so tests can vary each one; nothing
/// reads module-level mutable state.
#[derive(Debug, Clone)]
pub struct BikeModel {
    /// Rider mass in kilograms
    pub rider_mass_kg: f64,
    /// Bike mass in kilograms
    pub bike_mass_kg: f64,
    /// Drag coefficient times frontal area (CdA), m²
    pub cda: f64,
    /// Rolling resistance coefficient
    pub crr: f64,
    /// Drivetrain efficiency, crank to wheel (0–1]
    pub drivetrain_efficiency: f64,
    /// Gravitational acceleration, m/s²
    pub gravity: f64,
    /// Root-finder parameters
    pub solver: SolverConfig,
}

impl Default for BikeModel {
    fn default() -> Self {
        Self {
            rider_mass_kg: 75.0,
            bike_mass_kg: BIKE_MASS,
            cda: DEFAULT_CDA,
            crr: DEFAULT_CRR,
            drivetrain_efficiency: DEFAULT_EFFICIENCY,
            gravity: GRAVITY,
            solver: SolverConfig::default(),
        }
    }
}

impl BikeModel {
    /// Build a model from a rider profile, keeping default constants.
    pub fn from_profile(profile: &RiderProfile) -> Self {
        Self {
            rider_mass_kg: profile.rider_mass_kg,
            bike_mass_kg: profile.bike_mass_kg,
            cda: profile.cda,
            crr: profile.crr,
            drivetrain_efficiency: profile.drivetrain_efficiency,
            ..Default::default()
        }
    }

    /// Total system mass (rider + bike)
    pub fn total_mass_kg(&self) -> f64 {
        self.rider_mass_kg + self.bike_mass_kg
    }

    /// Power in watts consumed by drag, rolling resistance, and grade at
    /// the given ground speed.
    ///
    /// Drag is sign-aware: a tailwind stronger than the rider's own speed
    /// makes the term negative (the wind does work on the rider), and a
    /// descent makes the grade term negative.
    pub fn resistive_power(&self, velocity_ms: f64, env: &EnvironmentSample) -> f64 {
        let mass = self.total_mass_kg();

        // For a fractional grade g: sin(atan(g)) = g / sqrt(1 + g²)
        let grade = env.grade;
        let cos_g = 1.0 / (1.0 + grade * grade).sqrt();
        let sin_g = grade * cos_g;

        let headwind_ms = env.headwind_component_mph() * MPH_TO_MS;
        let relative_wind = velocity_ms + headwind_ms;

        let drag = 0.5 * env.air_density * self.cda * relative_wind * relative_wind.abs()
            * velocity_ms;
        let rolling = self.crr * mass * self.gravity * cos_g * velocity_ms;
        let grade_power = mass * self.gravity * sin_g * velocity_ms;

        drag + rolling + grade_power
    }

    /// Crank-side power in watts needed to hold the given speed.
    ///
    /// Direct evaluation, no iteration: power = resistive / efficiency.
    /// Never negative — coasting faster than the terrain allows reads as
    /// zero required power.
    pub fn power_at_velocity(&self, velocity_mph: f64, env: &EnvironmentSample) -> f64 {
        let v = (velocity_mph * MPH_TO_MS).max(0.0);
        let p = self.resistive_power(v, env) / self.drivetrain_efficiency;
        if p.is_finite() {
            p.max(0.0)
        } else {
            0.0
        }
    }

    /// Solve for the ground speed in mph the rider holds at the given
    /// crank power.
    ///
    /// Zero or negative power is the documented zero-velocity case and
    /// short-circuits to exactly `0.0`. Non-convergence (for example a
    /// headwind that makes forward motion infeasible at this power) yields
    /// the zero fallback with `converged: false`.
    pub fn solve_velocity(&self, power_watts: f64, env: &EnvironmentSample) -> SolverOutcome {
        if power_watts <= 0.0 {
            return SolverOutcome {
                value: 0.0,
                converged: true,
            };
        }

        let propulsive = power_watts * self.drivetrain_efficiency;
        let residual = |v: f64| propulsive - self.resistive_power(v, env);

        // Initial guess in m/s, biased by terrain
        let guess = if env.grade < -0.03 {
            15.0
        } else if env.grade > 0.05 {
            3.0
        } else {
            8.0
        };

        let outcome = newton(residual, guess, &self.solver);
        let mph = outcome.value.max(0.0) / MPH_TO_MS;

        SolverOutcome {
            value: if mph.is_finite() { mph } else { 0.0 },
            converged: outcome.converged,
        }
    }
}

/// Air density from elevation and temperature.
///
/// Standard-atmosphere pressure lapse combined with the ideal gas law,
/// clamped to the range seen in rideable conditions.
pub fn air_density(elevation_m: f64, temperature_c: f64) -> f64 {
    let elevation = elevation_m.clamp(-500.0, 11_000.0);
    let pressure_pa = 101_325.0 * (1.0 - 2.25577e-5 * elevation).powf(5.25588);
    let temp_k = (temperature_c + 273.15).max(150.0);
    (pressure_pa / (287.05 * temp_k)).clamp(0.8, 1.45)
}
