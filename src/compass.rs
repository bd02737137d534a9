//! Tilt-compensated compass for the IMU heading

use nalgebra::Vector3;

use crate::axes::axes_swap;
use crate::math::Vector3Ext;
use crate::types::{CompassSettings, HeadingEstimate, HeadingSource, InertialSample};

/// Below this `|cos(pitch)|` the sensor points straight up or down and roll is undefined
const GIMBAL_LOCK_EPSILON: f64 = 1e-6;

/// Calculate tilt-compensated magnetic heading
///
/// Pitch and roll are recovered from the normalized gravity vector, the
/// magnetometer vector is projected onto the horizontal plane, and the
/// heading is the angle of that projection.
///
/// # Arguments
/// * `accelerometer` - Accelerometer reading in g, body frame
/// * `magnetometer` - Calibrated magnetometer reading in µT, body frame
///
/// # Returns
/// Magnetic heading in `[0, 360)`, or an invalid estimate when the
/// accelerometer vector is zero or the sensor is pitched to ±90°
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use fusion_wind::compass::calculate_heading;
///
/// let accel = Vector3::new(0.0, 0.0, 1.0); // Level device
/// let mag = Vector3::new(0.0, 1.0, 0.0);
/// let heading = calculate_heading(accel, mag);
/// assert!((heading.degrees - 90.0).abs() < 1e-9);
/// ```
pub fn calculate_heading(
    accelerometer: Vector3<f64>,
    magnetometer: Vector3<f64>,
) -> HeadingEstimate {
    let Some(gravity) = accelerometer.try_normalize_finite() else {
        return HeadingEstimate::invalid(HeadingSource::Magnetic);
    };
    if !magnetometer.is_finite() {
        return HeadingEstimate::invalid(HeadingSource::Magnetic);
    }

    let pitch = (-gravity.x).clamp(-1.0, 1.0).asin();
    let (sin_pitch, cos_pitch) = pitch.sin_cos();
    if cos_pitch.abs() < GIMBAL_LOCK_EPSILON {
        return HeadingEstimate::invalid(HeadingSource::Magnetic);
    }

    let roll = (gravity.y / cos_pitch).clamp(-1.0, 1.0).asin();
    let (sin_roll, cos_roll) = roll.sin_cos();

    // Project the field onto the horizontal plane
    let mx = magnetometer.x * cos_pitch + magnetometer.z * sin_pitch;
    let my = magnetometer.x * sin_roll * sin_pitch + magnetometer.y * cos_roll
        - magnetometer.z * sin_roll * cos_pitch;

    HeadingEstimate::new(my.atan2(mx).to_degrees(), HeadingSource::Magnetic)
}

/// Heading compensator for raw IMU readings
///
/// Holds only configuration: the latest readings live in an
/// [`InertialSample`] owned by the caller.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use fusion_wind::{HeadingCompensator, InertialPacket, InertialSample};
///
/// let compensator = HeadingCompensator::new();
/// let mut sample = InertialSample::default();
///
/// // WT901 at rest: gravity on sensor x, field pointing to the bow
/// sample.apply(InertialPacket::Acceleration(Vector3::new(1.0, 0.0, 0.0)));
/// sample.apply(InertialPacket::Magnetic(Vector3::new(25.0, 0.0, -40.0)));
///
/// let heading = compensator.compute(&sample);
/// assert!(heading.valid);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingCompensator {
    settings: CompassSettings,
}

impl HeadingCompensator {
    /// Create a compensator with the default WT901 mounting
    pub fn new() -> Self {
        Self::with_settings(CompassSettings::default())
    }

    /// Create a compensator with explicit mounting and calibration
    pub fn with_settings(settings: CompassSettings) -> Self {
        Self { settings }
    }

    /// Current settings
    pub fn settings(&self) -> CompassSettings {
        self.settings
    }

    /// Heading from the latest sensor-frame readings
    pub fn compute(&self, sample: &InertialSample) -> HeadingEstimate {
        let accelerometer = axes_swap(sample.acceleration, self.settings.accelerometer_alignment);
        let magnetometer = axes_swap(
            self.settings.magnetic_calibration.apply(sample.magnetic),
            self.settings.magnetometer_alignment,
        );
        calculate_heading(accelerometer, magnetometer)
    }
}
