//! Route sample model: ordered distance/elevation/position samples.

pub mod gpx;

pub use gpx::parse_gpx;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Grades steeper than this are treated as elevation-data noise.
const MAX_GRADE: f64 = 0.3;

/// One point along a route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSample {
    /// Distance from route start in meters
    pub distance_m: f64,
    /// Elevation in meters
    pub elevation_m: f64,
    /// GPS latitude
    pub latitude: f64,
    /// GPS longitude
    pub longitude: f64,
}

/// An imported route with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedRoute {
    /// Unique identifier
    pub id: Uuid,
    /// Route name
    pub name: String,
    /// Ordered samples, distances non-decreasing
    pub samples: Vec<RouteSample>,
    /// When imported
    pub imported_at: DateTime<Utc>,
}

impl ImportedRoute {
    /// Create a new imported route.
    pub fn new(name: String, samples: Vec<RouteSample>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            samples,
            imported_at: Utc::now(),
        }
    }

    /// Total route distance in meters.
    pub fn total_distance_m(&self) -> f64 {
        self.samples.last().map(|s| s.distance_m).unwrap_or(0.0)
    }

    /// Total elevation gain in meters (sum of positive deltas).
    pub fn elevation_gain_m(&self) -> f64 {
        self.samples
            .windows(2)
            .map(|pair| (pair[1].elevation_m - pair[0].elevation_m).max(0.0))
            .sum()
    }
}

/// Elevation at a distance along the route, linearly interpolated.
///
/// The distance is clamped to the route bounds; an empty sample list
/// yields `0.0`.
pub fn elevation_at(samples: &[RouteSample], distance_m: f64) -> f64 {
    let Some(last) = samples.last() else {
        return 0.0;
    };
    let distance = distance_m.clamp(0.0, last.distance_m);

    let mut prev = &samples[0];
    for sample in &samples[1..] {
        if sample.distance_m >= distance {
            let segment = sample.distance_m - prev.distance_m;
            if segment > 0.0 {
                let t = (distance - prev.distance_m) / segment;
                return prev.elevation_m + (sample.elevation_m - prev.elevation_m) * t;
            }
            return prev.elevation_m;
        }
        prev = sample;
    }

    last.elevation_m
}

/// Average grade between two distances along the route, as a fraction.
///
/// Clamped to ±30% to keep elevation-data glitches from dominating the
/// physics. Degenerate spans yield `0.0`.
pub fn grade_between(samples: &[RouteSample], start_m: f64, end_m: f64) -> f64 {
    if samples.is_empty() || end_m <= start_m {
        return 0.0;
    }
    let rise = elevation_at(samples, end_m) - elevation_at(samples, start_m);
    (rise / (end_m - start_m)).clamp(-MAX_GRADE, MAX_GRADE)
}

/// Errors that can occur during route import.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_samples() -> Vec<RouteSample> {
        vec![
            RouteSample {
                distance_m: 0.0,
                elevation_m: 100.0,
                latitude: 45.5,
                longitude: -122.5,
            },
            RouteSample {
                distance_m: 1000.0,
                elevation_m: 150.0,
                latitude: 45.51,
                longitude: -122.5,
            },
            RouteSample {
                distance_m: 2000.0,
                elevation_m: 120.0,
                latitude: 45.52,
                longitude: -122.5,
            },
        ]
    }

    #[test]
    fn test_elevation_interpolates() {
        let samples = test_samples();
        assert!((elevation_at(&samples, 500.0) - 125.0).abs() < 1e-9);
        assert!((elevation_at(&samples, 0.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_elevation_clamps_to_bounds() {
        let samples = test_samples();
        assert!((elevation_at(&samples, -50.0) - 100.0).abs() < 1e-9);
        assert!((elevation_at(&samples, 9999.0) - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_grade_between() {
        let samples = test_samples();
        // 50 m rise over 1000 m
        assert!((grade_between(&samples, 0.0, 1000.0) - 0.05).abs() < 1e-9);
        // descent on the second leg
        assert!(grade_between(&samples, 1000.0, 2000.0) < 0.0);
    }

    #[test]
    fn test_grade_degenerate_span_is_zero() {
        let samples = test_samples();
        assert_eq!(grade_between(&samples, 500.0, 500.0), 0.0);
        assert_eq!(grade_between(&[], 0.0, 100.0), 0.0);
    }

    #[test]
    fn test_elevation_gain() {
        let route = ImportedRoute::new("test".to_string(), test_samples());
        assert!((route.elevation_gain_m() - 50.0).abs() < 1e-9);
        assert!((route.total_distance_m() - 2000.0).abs() < 1e-9);
    }
}
