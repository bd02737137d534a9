//! Engine configuration

use serde::Deserialize;

use crate::backoff::BackoffPolicy;
use crate::error::{Error, Result};
use crate::types::{CompassSettings, ProcessorSettings, TrackerSettings};

/// Complete engine configuration
///
/// Every section is optional in the JSON document; missing values fall back
/// to the defaults the engine was tuned with.
///
/// # Example
/// ```
/// use fusion_wind::{AxesAlignment, EngineConfig, ShiftConvention};
///
/// let config = EngineConfig::from_json(r#"{
///     "tracker": { "min_displacement_m": 8.0 },
///     "compass": { "accelerometer_alignment": "PxPyPz" },
///     "processor": { "shift_convention": "gps_minus_magnetic" }
/// }"#).unwrap();
///
/// assert_eq!(config.tracker.min_displacement_m, 8.0);
/// assert_eq!(config.tracker.min_speed_kn, 0.5);
/// assert_eq!(config.compass.accelerometer_alignment, AxesAlignment::PxPyPz);
/// assert_eq!(config.processor.shift_convention, ShiftConvention::GpsMinusMagnetic);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// GPS course filtering thresholds
    pub tracker: TrackerSettings,
    /// IMU mounting and magnetometer calibration
    pub compass: CompassSettings,
    /// Heading shift convention and heading age limit
    pub processor: ProcessorSettings,
    /// Capacity of each producer channel
    pub channel_capacity: usize,
    /// Retry policy for the GPS reader
    pub gps_backoff: BackoffPolicy,
    /// Retry policy for the IMU session
    pub imu_backoff: BackoffPolicy,
    /// Retry policy for the anemometer session
    pub anemometer_backoff: BackoffPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerSettings::default(),
            compass: CompassSettings::default(),
            processor: ProcessorSettings::default(),
            channel_capacity: 64,
            gps_backoff: BackoffPolicy::gps(),
            imu_backoff: BackoffPolicy::imu(),
            anemometer_backoff: BackoffPolicy::anemometer(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check thresholds, capacities and retry policies.
    pub fn validate(&self) -> Result<()> {
        let tracker = &self.tracker;
        if !(tracker.min_displacement_m.is_finite() && tracker.min_displacement_m >= 0.0) {
            return Err(Error::invalid_config(format!(
                "min_displacement_m must be a non-negative number, got {}",
                tracker.min_displacement_m
            )));
        }
        if !(tracker.min_speed_kn.is_finite() && tracker.min_speed_kn >= 0.0) {
            return Err(Error::invalid_config(format!(
                "min_speed_kn must be a non-negative number, got {}",
                tracker.min_speed_kn
            )));
        }
        if self.channel_capacity == 0 {
            return Err(Error::invalid_config("channel_capacity must be positive"));
        }

        let calibration = &self.compass.magnetic_calibration;
        let finite = calibration.hard_iron_offset.iter().all(|v| v.is_finite())
            && calibration
                .soft_iron_matrix
                .iter()
                .flatten()
                .all(|v| v.is_finite());
        if !finite {
            return Err(Error::invalid_config(
                "magnetic calibration must contain finite numbers",
            ));
        }

        self.gps_backoff.validate()?;
        self.imu_backoff.validate()?;
        self.anemometer_backoff.validate()?;
        Ok(())
    }
}
