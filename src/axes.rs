//! Sensor axes alignment for the IMU mounting orientation
//!
//! The WT901 reports its vectors in its own frame. The heading algorithm
//! expects the boat's body frame: x towards the bow, y to starboard, z along
//! gravity. Each alignment names, for body x, y and z in turn, which sensor
//! axis feeds it and with which sign.
//!
//! # Example
//! ```
//! use nalgebra::Vector3;
//! use fusion_wind::{AxesAlignment, axes_swap};
//!
//! // Raw accelerometer vector in the WT901's register order
//! let sensor = Vector3::new(1.0, 0.2, 0.1);
//!
//! // Mounted with sensor z pointing aft and sensor x along gravity
//! let body = axes_swap(sensor, AxesAlignment::NzPyPx);
//!
//! assert_eq!(body.x, -0.1); // Body X = -Sensor Z
//! assert_eq!(body.y, 0.2);  // Body Y = Sensor Y
//! assert_eq!(body.z, 1.0);  // Body Z = Sensor X
//! ```

use nalgebra::Vector3;
use serde::Deserialize;

/// Axes alignment describing the sensor axes relative to the body axes.
///
/// `P`/`N` give the sign and `x`/`y`/`z` the sensor axis feeding body X, Y
/// and Z respectively: `PyNxPz` means body X = +sensor Y, body Y = -sensor X,
/// body Z = +sensor Z. All 24 right-handed permutations are listed.
///
/// Configuration files name variants verbatim, e.g. `"NzPyPx"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[rustfmt::skip]
pub enum AxesAlignment {
    /// Identity, no remapping
    #[default]
    PxPyPz,
    // Body X from sensor X
    PxNzPy, PxNyNz, PxPzNy,
    NxPyNz, NxPzPy, NxNyPz, NxNzNy,
    // Body X from sensor Y
    PyNxPz, PyNzNx, PyPxNz, PyPzPx,
    NyPxPz, NyNzPx, NyNxNz, NyPzNx,
    // Body X from sensor Z
    PzPyNx, PzPxPy, PzNyPx, PzNxNy,
    NzPyPx, NzNxPy, NzNyNx, NzPxNy,
}

/// One body axis: index of the sensor axis feeding it and its sign
type SignedAxis = (usize, f64);

const X: usize = 0;
const Y: usize = 1;
const Z: usize = 2;

impl AxesAlignment {
    /// Every alignment, identity first
    #[rustfmt::skip]
    pub const ALL: [Self; 24] = [
        Self::PxPyPz, Self::PxNzPy, Self::PxNyNz, Self::PxPzNy,
        Self::NxPyNz, Self::NxPzPy, Self::NxNyPz, Self::NxNzNy,
        Self::PyNxPz, Self::PyNzNx, Self::PyPxNz, Self::PyPzPx,
        Self::NyPxPz, Self::NyNzPx, Self::NyNxNz, Self::NyPzNx,
        Self::PzPyNx, Self::PzPxPy, Self::PzNyPx, Self::PzNxNy,
        Self::NzPyPx, Self::NzNxPy, Self::NzNyNx, Self::NzPxNy,
    ];

    /// Sensor axis and sign feeding body X, Y and Z
    #[rustfmt::skip]
    const fn body_axes(self) -> [SignedAxis; 3] {
        const P: f64 = 1.0;
        const N: f64 = -1.0;
        match self {
            Self::PxPyPz => [(X, P), (Y, P), (Z, P)],
            Self::PxNzPy => [(X, P), (Z, N), (Y, P)],
            Self::PxNyNz => [(X, P), (Y, N), (Z, N)],
            Self::PxPzNy => [(X, P), (Z, P), (Y, N)],
            Self::NxPyNz => [(X, N), (Y, P), (Z, N)],
            Self::NxPzPy => [(X, N), (Z, P), (Y, P)],
            Self::NxNyPz => [(X, N), (Y, N), (Z, P)],
            Self::NxNzNy => [(X, N), (Z, N), (Y, N)],
            Self::PyNxPz => [(Y, P), (X, N), (Z, P)],
            Self::PyNzNx => [(Y, P), (Z, N), (X, N)],
            Self::PyPxNz => [(Y, P), (X, P), (Z, N)],
            Self::PyPzPx => [(Y, P), (Z, P), (X, P)],
            Self::NyPxPz => [(Y, N), (X, P), (Z, P)],
            Self::NyNzPx => [(Y, N), (Z, N), (X, P)],
            Self::NyNxNz => [(Y, N), (X, N), (Z, N)],
            Self::NyPzNx => [(Y, N), (Z, P), (X, N)],
            Self::PzPyNx => [(Z, P), (Y, P), (X, N)],
            Self::PzPxPy => [(Z, P), (X, P), (Y, P)],
            Self::PzNyPx => [(Z, P), (Y, N), (X, P)],
            Self::PzNxNy => [(Z, P), (X, N), (Y, N)],
            Self::NzPyPx => [(Z, N), (Y, P), (X, P)],
            Self::NzNxPy => [(Z, N), (X, N), (Y, P)],
            Self::NzNyNx => [(Z, N), (Y, N), (X, N)],
            Self::NzPxNy => [(Z, N), (X, P), (Y, N)],
        }
    }

    /// The alignment that maps body-frame vectors back to the sensor frame.
    ///
    /// Useful when a calibration is recorded in body axes but has to be
    /// applied to raw readings.
    pub fn inverse(self) -> Self {
        let forward = self.body_axes();
        let mut wanted = [(X, 1.0); 3];
        for (body, (sensor, sign)) in forward.into_iter().enumerate() {
            wanted[sensor] = (body, sign);
        }

        Self::ALL
            .into_iter()
            .find(|candidate| candidate.body_axes() == wanted)
            .unwrap_or(Self::PxPyPz)
    }
}

/// Remap a sensor-frame vector into the body frame.
#[inline]
pub fn axes_swap(sensor: Vector3<f64>, alignment: AxesAlignment) -> Vector3<f64> {
    let [x, y, z] = alignment.body_axes().map(|(axis, sign)| sign * sensor[axis]);
    Vector3::new(x, y, z)
}
