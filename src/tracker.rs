//! GPS position tracking: boat speed and course over ground

use tracing::debug;

use crate::math::{haversine_distance, initial_bearing};
use crate::types::{GpsFix, HeadingEstimate, HeadingSource, Position, TrackerSettings};

/// Result of accepting one GPS fix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerUpdate {
    /// Speed over ground reported by the fix, knots
    pub boat_speed_kn: f64,
    /// Position of the fix
    pub position: Position,
    /// Course over ground, recomputed or retained
    pub gps_heading: HeadingEstimate,
    /// Whether this fix produced a new course rather than carrying the last one
    pub course_recomputed: bool,
}

/// Derives boat speed and course over ground from successive GPS fixes
///
/// A course is computed only once the boat has moved at least
/// `min_displacement_m` from the reference fix or reports more than
/// `min_speed_kn`, so a boat at anchor does not spin its heading on GPS
/// jitter. The reference fix only advances when a course is computed.
///
/// # Example
/// ```
/// use chrono::Utc;
/// use fusion_wind::{GpsFix, PositionTracker};
///
/// let mut tracker = PositionTracker::new();
/// let fix = |latitude: f64| GpsFix {
///     timestamp: Utc::now(),
///     latitude,
///     longitude: 9.0,
///     speed_knots: 4.0,
///     fix_valid: true,
/// };
///
/// // The first fix only sets the reference point
/// let first = tracker.update(&fix(45.0)).unwrap();
/// assert!(!first.gps_heading.valid);
///
/// // Moving north
/// let second = tracker.update(&fix(45.001)).unwrap();
/// assert!(second.gps_heading.degrees < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct PositionTracker {
    settings: TrackerSettings,
    reference: Option<Position>,
    heading: HeadingEstimate,
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionTracker {
    /// Create a tracker with default thresholds (5 m, 0.5 kn)
    pub fn new() -> Self {
        Self::with_settings(TrackerSettings::default())
    }

    /// Create a tracker with explicit thresholds
    pub fn with_settings(settings: TrackerSettings) -> Self {
        Self {
            settings,
            reference: None,
            heading: HeadingEstimate::invalid(HeadingSource::Gps),
        }
    }

    /// Current course over ground
    pub fn heading(&self) -> HeadingEstimate {
        self.heading
    }

    /// Reference fix the next course will be measured from
    pub fn reference(&self) -> Option<Position> {
        self.reference
    }

    /// Accept a fix.
    ///
    /// Returns `None` and leaves the tracker untouched when the fix is flagged
    /// invalid or carries non-finite numbers.
    pub fn update(&mut self, fix: &GpsFix) -> Option<TrackerUpdate> {
        if !fix.is_usable() {
            debug!(fix_valid = fix.fix_valid, "discarding unusable gps fix");
            return None;
        }

        let position = fix.position();
        let mut course_recomputed = false;
        match self.reference {
            None => self.reference = Some(position),
            Some(reference) => {
                let distance = haversine_distance(
                    reference.latitude,
                    reference.longitude,
                    position.latitude,
                    position.longitude,
                );
                if distance >= self.settings.min_displacement_m
                    || fix.speed_knots > self.settings.min_speed_kn
                {
                    let bearing = initial_bearing(
                        reference.latitude,
                        reference.longitude,
                        position.latitude,
                        position.longitude,
                    );
                    self.heading = HeadingEstimate::new(bearing, HeadingSource::Gps);
                    self.reference = Some(position);
                    course_recomputed = true;
                }
            }
        }

        Some(TrackerUpdate {
            boat_speed_kn: fix.speed_knots,
            position,
            gps_heading: self.heading,
            course_recomputed,
        })
    }
}
