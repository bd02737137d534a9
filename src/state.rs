//! Shared fusion state written by the GPS and IMU consumers
//!
//! One mutex guards the whole aggregate. Writers touch disjoint fields and
//! readers copy every field under the same lock, so a snapshot never mixes
//! values from before and after an update.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::time::{Duration, Instant};
use tracing::trace;

use crate::tracker::TrackerUpdate;
use crate::types::{HeadingEstimate, HeadingSource, Position};

/// Typed write into [`FusionState`], one variant per producer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FusionUpdate {
    /// Accepted GPS fix: speed, position, course over ground
    Gps(TrackerUpdate),
    /// New compass heading from the IMU
    MagneticHeading(HeadingEstimate),
}

/// Consistent copy of the fusion state at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionSnapshot {
    /// Last known boat speed, zero before the first fix
    pub boat_speed_kn: f64,
    /// Last valid compass heading
    pub magnetic_heading: HeadingEstimate,
    /// Last GPS course over ground
    pub gps_heading: HeadingEstimate,
    /// Last GPS position
    pub gps_position: Option<Position>,
    /// When the GPS fields were last written
    pub gps_updated_at: Option<Instant>,
    /// When the GPS course was last recomputed, as opposed to carried over
    pub gps_heading_updated_at: Option<Instant>,
    /// When the compass heading was last written
    pub magnetic_updated_at: Option<Instant>,
}

impl Default for FusionSnapshot {
    fn default() -> Self {
        Self {
            boat_speed_kn: 0.0,
            magnetic_heading: HeadingEstimate::invalid(HeadingSource::Magnetic),
            gps_heading: HeadingEstimate::invalid(HeadingSource::Gps),
            gps_position: None,
            gps_updated_at: None,
            gps_heading_updated_at: None,
            magnetic_updated_at: None,
        }
    }
}

impl FusionSnapshot {
    /// Time since the GPS fields were written, `None` if never
    pub fn gps_age(&self, now: Instant) -> Option<Duration> {
        self.gps_updated_at
            .map(|at| now.saturating_duration_since(at))
    }

    /// Time since the GPS course was last recomputed, `None` if never
    pub fn gps_heading_age(&self, now: Instant) -> Option<Duration> {
        self.gps_heading_updated_at
            .map(|at| now.saturating_duration_since(at))
    }

    /// Time since the compass heading was written, `None` if never
    pub fn magnetic_age(&self, now: Instant) -> Option<Duration> {
        self.magnetic_updated_at
            .map(|at| now.saturating_duration_since(at))
    }
}

/// The single writable aggregate shared by producers and the sample processor
///
/// Cloning is cheap and yields another handle to the same state.
///
/// # Example
/// ```
/// use fusion_wind::{FusionState, FusionUpdate, HeadingEstimate, HeadingSource};
///
/// let state = FusionState::new();
/// state.apply(FusionUpdate::MagneticHeading(HeadingEstimate::new(
///     42.0,
///     HeadingSource::Magnetic,
/// )));
///
/// let snapshot = state.snapshot();
/// assert_eq!(snapshot.magnetic_heading.value(), Some(42.0));
/// assert_eq!(snapshot.boat_speed_kn, 0.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FusionState {
    inner: Arc<Mutex<FusionSnapshot>>,
}

impl FusionState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one producer update under the lock.
    ///
    /// Invalid compass headings are dropped so the last valid one stays in
    /// place. GPS updates always carry the tracker's current course, but only
    /// a recomputed course refreshes its age.
    pub fn apply(&self, update: FusionUpdate) {
        let now = Instant::now();
        let mut state = self.lock();
        match update {
            FusionUpdate::Gps(gps) => {
                state.boat_speed_kn = gps.boat_speed_kn;
                state.gps_position = Some(gps.position);
                state.gps_heading = gps.gps_heading;
                state.gps_updated_at = Some(now);
                if gps.course_recomputed {
                    state.gps_heading_updated_at = Some(now);
                }
            }
            FusionUpdate::MagneticHeading(heading) if heading.valid => {
                state.magnetic_heading = heading;
                state.magnetic_updated_at = Some(now);
            }
            FusionUpdate::MagneticHeading(_) => {
                trace!("keeping last compass heading over invalid estimate");
            }
        }
    }

    /// Copy every field atomically.
    pub fn snapshot(&self) -> FusionSnapshot {
        *self.lock()
    }

    // A panic while holding the lock cannot leave the plain-data snapshot half written
    fn lock(&self) -> MutexGuard<'_, FusionSnapshot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
