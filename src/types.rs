//! Core data model and settings for the fusion-wind engine

use chrono::{DateTime, Utc};
use nalgebra::Vector3;
use serde::Deserialize;

use crate::axes::AxesAlignment;
use crate::calibration::MagneticCalibration;
use crate::error::{Error, Result};
use crate::math::{MS_TO_KNOTS, wrap_degrees};

/// Where a heading estimate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadingSource {
    /// Tilt-compensated compass (IMU accelerometer + magnetometer)
    Magnetic,
    /// Course over ground derived from successive GPS fixes
    Gps,
}

/// A heading in degrees, tagged with its source and validity
///
/// `valid == false` means there was not enough data to produce a heading
/// (degenerate accelerometer vector, no prior GPS fix, ...). The `degrees`
/// field of an invalid estimate carries no meaning.
///
/// # Example
/// ```
/// use fusion_wind::{HeadingEstimate, HeadingSource};
///
/// let heading = HeadingEstimate::new(370.0, HeadingSource::Gps);
/// assert_eq!(heading.value(), Some(10.0));
///
/// let unknown = HeadingEstimate::invalid(HeadingSource::Magnetic);
/// assert_eq!(unknown.value(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingEstimate {
    /// Heading in degrees, `[0, 360)`
    pub degrees: f64,
    /// Which sensor produced the heading
    pub source: HeadingSource,
    /// Whether `degrees` holds a usable value
    pub valid: bool,
}

impl HeadingEstimate {
    /// Create a valid estimate, wrapping `degrees` into `[0, 360)`.
    ///
    /// A non-finite input produces an invalid estimate.
    pub fn new(degrees: f64, source: HeadingSource) -> Self {
        if degrees.is_finite() {
            Self {
                degrees: wrap_degrees(degrees),
                source,
                valid: true,
            }
        } else {
            Self::invalid(source)
        }
    }

    /// Create an estimate that carries no heading.
    pub const fn invalid(source: HeadingSource) -> Self {
        Self {
            degrees: 0.0,
            source,
            valid: false,
        }
    }

    /// The heading in degrees, if valid.
    pub fn value(&self) -> Option<f64> {
        self.valid.then_some(self.degrees)
    }
}

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Latitude, positive north
    pub latitude: f64,
    /// Longitude, positive east
    pub longitude: f64,
}

impl Position {
    /// Create a position from latitude and longitude in degrees.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A decoded GPS fix (one RMC sentence)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsFix {
    /// When the fix was received
    pub timestamp: DateTime<Utc>,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Speed over ground in knots
    pub speed_knots: f64,
    /// Receiver status flag; `false` fixes never touch fusion state
    pub fix_valid: bool,
}

impl GpsFix {
    /// The fix position.
    pub const fn position(&self) -> Position {
        Position::new(self.latitude, self.longitude)
    }

    /// Whether the fix may update fusion state: flagged valid and all numbers finite.
    pub fn is_usable(&self) -> bool {
        self.fix_valid
            && self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.speed_knots.is_finite()
    }
}

/// One decoded IMU notification
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InertialPacket {
    /// Acceleration in g, sensor frame
    Acceleration(Vector3<f64>),
    /// Magnetic field in µT, sensor frame
    Magnetic(Vector3<f64>),
}

/// Most recent accelerometer and magnetometer readings
///
/// Each vector is a last-value cell: packets of the two kinds arrive at
/// different rates and a heading always pairs the latest of each. Both start
/// at zero, so no heading is produced before the first acceleration packet.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InertialSample {
    /// Acceleration in g, sensor frame
    pub acceleration: Vector3<f64>,
    /// Magnetic field in µT, sensor frame
    pub magnetic: Vector3<f64>,
}

impl InertialSample {
    /// Store a packet into its cell.
    pub fn apply(&mut self, packet: InertialPacket) {
        match packet {
            InertialPacket::Acceleration(acceleration) => self.acceleration = acceleration,
            InertialPacket::Magnetic(magnetic) => self.magnetic = magnetic,
        }
    }
}

/// One anemometer reading, apparent wind relative to the bow
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindObservation {
    /// Apparent wind speed in knots
    pub apparent_speed_kn: f64,
    /// Apparent wind angle in degrees, `[0, 360)`
    pub apparent_angle_deg: f64,
}

impl WindObservation {
    /// Validate a reading in knots and degrees.
    ///
    /// Rejects non-finite values and negative speeds; wraps the angle into `[0, 360)`.
    pub fn new(apparent_speed_kn: f64, apparent_angle_deg: f64) -> Result<Self> {
        if !apparent_speed_kn.is_finite()
            || apparent_speed_kn < 0.0
            || !apparent_angle_deg.is_finite()
        {
            return Err(Error::InvalidObservation {
                speed_kn: apparent_speed_kn,
                angle_deg: apparent_angle_deg,
            });
        }

        Ok(Self {
            apparent_speed_kn,
            apparent_angle_deg: wrap_degrees(apparent_angle_deg),
        })
    }

    /// Validate a reading in the anemometer's native unit (m/s).
    ///
    /// # Example
    /// ```
    /// use fusion_wind::WindObservation;
    ///
    /// let observation = WindObservation::from_metres_per_second(5.0, 45.0).unwrap();
    /// assert!((observation.apparent_speed_kn - 9.71922).abs() < 1e-9);
    /// ```
    pub fn from_metres_per_second(speed_ms: f64, angle_deg: f64) -> Result<Self> {
        Self::new(speed_ms * MS_TO_KNOTS, angle_deg)
    }
}

/// Output of one fusion pass, one per anemometer reading
///
/// Optional fields are `None` when the upstream value was unavailable at
/// emission time; sinks write them as empty cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindRecord {
    /// Emission time
    pub timestamp: DateTime<Utc>,
    /// Last known GPS position
    pub position: Option<Position>,
    /// Last known boat speed (zero before the first fix)
    pub boat_speed_kn: f64,
    /// Last known magnetic heading
    pub magnetic_heading: Option<f64>,
    /// Last known GPS course over ground
    pub gps_heading: Option<f64>,
    /// Magnetic/GPS heading shift applied to the apparent wind angle
    pub heading_shift: Option<f64>,
    /// Apparent wind speed in knots
    pub apparent_wind_speed_kn: f64,
    /// Apparent wind angle as measured, degrees
    pub apparent_wind_angle_deg: f64,
    /// Apparent wind angle after the heading shift, degrees
    pub corrected_apparent_angle_deg: f64,
    /// True wind speed in knots
    pub true_wind_speed_kn: f64,
    /// True wind angle, degrees `[0, 360)`
    pub true_wind_angle_deg: f64,
}

/// Sign convention of the magnetic/GPS heading shift
///
/// The shift folds the disagreement between the compass and the GPS course
/// into the apparent wind angle. Which direction is correct depends on how
/// the anemometer and IMU are mounted, so it stays configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftConvention {
    /// `shift = magnetic - gps`
    #[default]
    MagneticMinusGps,
    /// `shift = gps - magnetic`
    GpsMinusMagnetic,
}

/// Position tracker settings
///
/// # Example
/// ```
/// use fusion_wind::TrackerSettings;
///
/// let settings = TrackerSettings {
///     min_displacement_m: 10.0, // noisier receiver
///     ..Default::default()
/// };
/// assert_eq!(settings.min_speed_kn, 0.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    /// Minimum distance from the reference fix before a course is computed, meters
    pub min_displacement_m: f64,
    /// Speed above which a course is computed regardless of distance, knots
    pub min_speed_kn: f64,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            min_displacement_m: 5.0,
            min_speed_kn: 0.5,
        }
    }
}

/// Heading compensator settings
///
/// The defaults match the WT901 mounting the engine was calibrated against:
/// the accelerometer's sensor z axis points forward, inverted.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompassSettings {
    /// Accelerometer sensor-to-body axes alignment
    pub accelerometer_alignment: AxesAlignment,
    /// Magnetometer sensor-to-body axes alignment
    pub magnetometer_alignment: AxesAlignment,
    /// Hard/soft iron correction applied to the magnetometer before alignment
    pub magnetic_calibration: MagneticCalibration,
}

impl Default for CompassSettings {
    fn default() -> Self {
        Self {
            accelerometer_alignment: AxesAlignment::NzPyPx,
            magnetometer_alignment: AxesAlignment::PxPyPz,
            magnetic_calibration: MagneticCalibration::default(),
        }
    }
}

/// Sample processor settings
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ProcessorSettings {
    /// Heading shift sign convention
    pub shift_convention: ShiftConvention,
    /// Headings older than this many milliseconds are ignored by the shift
    /// correction. `None` joins against last-known values regardless of age.
    pub max_heading_age_ms: Option<u64>,
}
