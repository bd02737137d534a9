//! Magnetometer hard and soft iron calibration

use nalgebra::{Matrix3, Vector3};
use serde::Deserialize;

/// Applies magnetometer calibration (hard and soft iron correction)
///
/// # Arguments
/// * `uncalibrated` - Raw magnetometer reading
/// * `soft_iron_matrix` - 3x3 soft iron correction matrix
/// * `hard_iron_offset` - Hard iron offset vector
///
/// # Returns
/// Calibrated magnetometer reading
///
/// # Example
/// ```
/// use nalgebra::{Matrix3, Vector3};
/// use fusion_wind::calibration::calibrate_magnetic;
///
/// let raw = Vector3::new(30.0, -12.0, -41.0);
/// let hard_iron = Vector3::new(4.0, -2.0, 1.0);
///
/// let calibrated = calibrate_magnetic(raw, Matrix3::identity(), hard_iron);
/// assert_eq!(calibrated, Vector3::new(26.0, -10.0, -42.0));
/// ```
pub fn calibrate_magnetic(
    uncalibrated: Vector3<f64>,
    soft_iron_matrix: Matrix3<f64>,
    hard_iron_offset: Vector3<f64>,
) -> Vector3<f64> {
    soft_iron_matrix * (uncalibrated - hard_iron_offset)
}

/// Stored magnetometer calibration, loaded from configuration
///
/// The soft iron matrix is row-major. The default is the identity
/// correction, which leaves readings untouched.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MagneticCalibration {
    /// Hard iron offset in µT, subtracted first
    pub hard_iron_offset: [f64; 3],
    /// Soft iron correction matrix, row-major
    pub soft_iron_matrix: [[f64; 3]; 3],
}

impl Default for MagneticCalibration {
    fn default() -> Self {
        Self {
            hard_iron_offset: [0.0; 3],
            soft_iron_matrix: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }
}

impl MagneticCalibration {
    /// Correct a raw magnetometer reading.
    pub fn apply(&self, uncalibrated: Vector3<f64>) -> Vector3<f64> {
        let m = &self.soft_iron_matrix;
        let soft_iron = Matrix3::new(
            m[0][0], m[0][1], m[0][2], //
            m[1][0], m[1][1], m[1][2], //
            m[2][0], m[2][1], m[2][2],
        );
        calibrate_magnetic(
            uncalibrated,
            soft_iron,
            Vector3::from(self.hard_iron_offset),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnetic_calibration() {
        let raw = Vector3::new(100.0, 200.0, 300.0);
        let soft_iron = Matrix3::identity();
        let hard_iron = Vector3::new(10.0, 20.0, 30.0);

        let calibrated = calibrate_magnetic(raw, soft_iron, hard_iron);
        let expected = Vector3::new(90.0, 180.0, 270.0); // raw - hard_iron

        assert!((calibrated - expected).magnitude() < 1e-12);
    }

    #[test]
    fn test_default_calibration_is_identity() {
        let raw = Vector3::new(21.5, -3.0, -44.0);
        assert_eq!(MagneticCalibration::default().apply(raw), raw);
    }

    #[test]
    fn test_soft_iron_row_major() {
        let calibration = MagneticCalibration {
            hard_iron_offset: [1.0, 0.0, 0.0],
            soft_iron_matrix: [[2.0, 0.0, 0.0], [0.0, 1.0, 0.5], [0.0, 0.0, 1.0]],
        };
        let calibrated = calibration.apply(Vector3::new(3.0, 1.0, 2.0));
        // (raw - offset) = (2, 1, 2); rows: (4, 1 + 1, 2)
        assert_eq!(calibrated, Vector3::new(4.0, 2.0, 2.0));
    }
}
