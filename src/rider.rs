//! Rider profile with pace target and TOML persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// How the rider intends to pace the ride.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaceTarget {
    /// Hold a steady crank power in watts
    Power(f64),
    /// Hold a target ground speed in mph on flat calm ground
    Speed(f64),
}

/// Rider and bike parameters, immutable per forecast run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiderProfile {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Rider mass in kilograms
    pub rider_mass_kg: f64,
    /// Bike mass in kilograms
    pub bike_mass_kg: f64,
    /// Drag coefficient times frontal area, m²
    pub cda: f64,
    /// Rolling resistance coefficient
    pub crr: f64,
    /// Drivetrain efficiency, crank to wheel (0–1]
    pub drivetrain_efficiency: f64,
    /// Profile creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
    /// Pace target for forecast runs (kept last so TOML emits the table
    /// after the scalar fields)
    pub pace: PaceTarget,
}

impl Default for RiderProfile {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: "Cyclist".to_string(),
            rider_mass_kg: 75.0,
            bike_mass_kg: 8.0,
            cda: 0.32,
            crr: 0.004,
            drivetrain_efficiency: 0.95,
            created_at: now,
            updated_at: now,
            pace: PaceTarget::Power(150.0),
        }
    }
}

impl RiderProfile {
    /// Create a new profile with the given name.
    pub fn new(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    /// Update the pace target.
    pub fn set_pace(&mut self, pace: PaceTarget) {
        self.pace = pace;
        self.updated_at = Utc::now();
    }

    /// Validate rider mass (30-200 kg).
    pub fn validate_mass(mass_kg: f64) -> bool {
        (30.0..=200.0).contains(&mass_kg)
    }

    /// Validate CdA (0.1-1.0 m²).
    pub fn validate_cda(cda: f64) -> bool {
        (0.1..=1.0).contains(&cda)
    }

    /// Validate rolling resistance coefficient.
    pub fn validate_crr(crr: f64) -> bool {
        crr > 0.0 && crr <= 0.05
    }

    /// Validate drivetrain efficiency.
    pub fn validate_efficiency(efficiency: f64) -> bool {
        efficiency > 0.0 && efficiency <= 1.0
    }

    /// Check all parameter ranges at once.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if !Self::validate_mass(self.rider_mass_kg) {
            return Err(ProfileError::InvalidProfile(
                "rider mass must be between 30 and 200 kg".to_string(),
            ));
        }
        if !Self::validate_cda(self.cda) {
            return Err(ProfileError::InvalidProfile(
                "CdA must be between 0.1 and 1.0 m²".to_string(),
            ));
        }
        if !Self::validate_crr(self.crr) {
            return Err(ProfileError::InvalidProfile(
                "Crr must be between 0 and 0.05".to_string(),
            ));
        }
        if !Self::validate_efficiency(self.drivetrain_efficiency) {
            return Err(ProfileError::InvalidProfile(
                "drivetrain efficiency must be in (0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "routecast", "Routecast")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the default profile file path.
pub fn get_profile_path() -> PathBuf {
    get_data_dir().join("profile.toml")
}

/// Load the rider profile from the default location.
pub fn load_profile() -> Result<RiderProfile, ProfileError> {
    load_profile_from(&get_profile_path())
}

/// Load a rider profile from a specific path.
///
/// A missing file yields the default profile rather than an error.
pub fn load_profile_from(path: &Path) -> Result<RiderProfile, ProfileError> {
    if !path.exists() {
        return Ok(RiderProfile::default());
    }

    let content =
        std::fs::read_to_string(path).map_err(|e| ProfileError::IoError(e.to_string()))?;

    let profile: RiderProfile =
        toml::from_str(&content).map_err(|e| ProfileError::ParseError(e.to_string()))?;

    profile.validate()?;

    Ok(profile)
}

/// Save the rider profile to the default location.
pub fn save_profile(profile: &RiderProfile) -> Result<(), ProfileError> {
    save_profile_to(profile, &get_profile_path())
}

/// Save a rider profile to a specific path.
pub fn save_profile_to(profile: &RiderProfile, path: &Path) -> Result<(), ProfileError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ProfileError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(profile).map_err(|e| ProfileError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ProfileError::IoError(e.to_string()))?;

    Ok(())
}

/// Profile errors.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_valid() {
        assert!(RiderProfile::default().validate().is_ok());
    }

    #[test]
    fn test_validate_ranges() {
        assert!(RiderProfile::validate_mass(75.0));
        assert!(!RiderProfile::validate_mass(10.0));
        assert!(RiderProfile::validate_cda(0.32));
        assert!(!RiderProfile::validate_cda(2.0));
        assert!(RiderProfile::validate_efficiency(0.95));
        assert!(!RiderProfile::validate_efficiency(0.0));
    }

    #[test]
    fn test_invalid_efficiency_rejected() {
        let profile = RiderProfile {
            drivetrain_efficiency: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_set_pace_touches_updated_at() {
        let mut profile = RiderProfile::default();
        let before = profile.updated_at;
        profile.set_pace(PaceTarget::Speed(16.0));
        assert_eq!(profile.pace, PaceTarget::Speed(16.0));
        assert!(profile.updated_at >= before);
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.toml");

        let mut profile = RiderProfile::new("Test Rider".to_string());
        profile.set_pace(PaceTarget::Power(220.0));
        save_profile_to(&profile, &path).unwrap();

        let loaded = load_profile_from(&path).unwrap();
        assert_eq!(loaded.name, "Test Rider");
        assert_eq!(loaded.pace, PaceTarget::Power(220.0));
        assert_eq!(loaded.id, profile.id);
    }

    #[test]
    fn test_missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_profile_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(loaded.name, "Cyclist");
    }

    #[test]
    fn test_garbage_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        assert!(matches!(
            load_profile_from(&path),
            Err(ProfileError::ParseError(_))
        ));
    }
}
