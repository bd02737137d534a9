//! Magnetic/GPS heading shift and apparent wind angle correction

use crate::math::wrap_degrees;
use crate::types::{HeadingEstimate, ShiftConvention};

/// Outcome of a heading shift correction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftCorrection {
    /// Offset between the two headings, `None` when either was unavailable
    pub shift: Option<f64>,
    /// Apparent wind angle after applying the shift, `[0, 360)`
    pub corrected_awa: f64,
}

/// Folds the compass/GPS course disagreement into the apparent wind angle
///
/// The anemometer is assumed aligned with the boat's magnetic reference.
/// When both headings are known their offset is added to the apparent
/// wind angle; otherwise the reading passes through unchanged.
///
/// # Example
/// ```
/// use fusion_wind::{HeadingEstimate, HeadingShiftCorrector, HeadingSource};
///
/// let corrector = HeadingShiftCorrector::new();
/// let correction = corrector.correct(
///     30.0,
///     &HeadingEstimate::new(10.0, HeadingSource::Magnetic),
///     &HeadingEstimate::new(0.0, HeadingSource::Gps),
/// );
/// assert_eq!(correction.shift, Some(10.0));
/// assert_eq!(correction.corrected_awa, 40.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingShiftCorrector {
    convention: ShiftConvention,
}

impl HeadingShiftCorrector {
    /// Create a corrector using `magnetic - gps`
    pub fn new() -> Self {
        Self::with_convention(ShiftConvention::default())
    }

    /// Create a corrector with an explicit sign convention
    pub fn with_convention(convention: ShiftConvention) -> Self {
        Self { convention }
    }

    /// Sign convention in use
    pub fn convention(&self) -> ShiftConvention {
        self.convention
    }

    /// Correct an apparent wind angle with the heading shift.
    pub fn correct(
        &self,
        awa: f64,
        magnetic_heading: &HeadingEstimate,
        gps_heading: &HeadingEstimate,
    ) -> ShiftCorrection {
        let (Some(magnetic), Some(gps)) = (magnetic_heading.value(), gps_heading.value()) else {
            return ShiftCorrection {
                shift: None,
                corrected_awa: awa,
            };
        };

        let shift = match self.convention {
            ShiftConvention::MagneticMinusGps => wrap_degrees(magnetic - gps),
            ShiftConvention::GpsMinusMagnetic => wrap_degrees(gps - magnetic),
        };

        ShiftCorrection {
            shift: Some(shift),
            corrected_awa: wrap_degrees(awa + shift),
        }
    }
}
