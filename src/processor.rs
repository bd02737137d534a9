//! One fusion pass per anemometer reading

use chrono::{DateTime, Utc};
use tokio::time::{Duration, Instant};

use crate::shift::HeadingShiftCorrector;
use crate::state::FusionSnapshot;
use crate::triangle::WindTriangleSolver;
use crate::types::{HeadingEstimate, ProcessorSettings, WindObservation, WindRecord};

/// Joins an anemometer reading with the last known boat state
///
/// Stateless between readings: every observation yields exactly one
/// [`WindRecord`] regardless of how often GPS and IMU update.
///
/// # Example
/// ```
/// use chrono::Utc;
/// use fusion_wind::{FusionState, SampleProcessor, WindObservation};
///
/// let processor = SampleProcessor::new();
/// let state = FusionState::new();
///
/// // Nothing known yet: the apparent wind passes straight through
/// let observation = WindObservation::new(8.0, 60.0).unwrap();
/// let record = processor.process(&observation, &state.snapshot(), Utc::now());
/// assert_eq!(record.heading_shift, None);
/// assert!((record.true_wind_speed_kn - 8.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleProcessor {
    corrector: HeadingShiftCorrector,
    solver: WindTriangleSolver,
    max_heading_age: Option<Duration>,
}

impl SampleProcessor {
    /// Create a processor with the default shift convention and no age limit
    pub fn new() -> Self {
        Self::with_settings(ProcessorSettings::default())
    }

    /// Create a processor from settings
    pub fn with_settings(settings: ProcessorSettings) -> Self {
        Self {
            corrector: HeadingShiftCorrector::with_convention(settings.shift_convention),
            solver: WindTriangleSolver,
            max_heading_age: settings.max_heading_age_ms.map(Duration::from_millis),
        }
    }

    /// Run the shift correction and wind triangle against one snapshot.
    pub fn process(
        &self,
        observation: &WindObservation,
        snapshot: &FusionSnapshot,
        timestamp: DateTime<Utc>,
    ) -> WindRecord {
        let now = Instant::now();
        let magnetic = self.fresh(snapshot.magnetic_heading, snapshot.magnetic_age(now));
        let gps = self.fresh(snapshot.gps_heading, snapshot.gps_heading_age(now));

        let correction =
            self.corrector
                .correct(observation.apparent_angle_deg, &magnetic, &gps);
        let true_wind = self.solver.solve(
            observation.apparent_speed_kn,
            correction.corrected_awa,
            snapshot.boat_speed_kn,
        );

        WindRecord {
            timestamp,
            position: snapshot.gps_position,
            boat_speed_kn: snapshot.boat_speed_kn,
            magnetic_heading: snapshot.magnetic_heading.value(),
            gps_heading: snapshot.gps_heading.value(),
            heading_shift: correction.shift,
            apparent_wind_speed_kn: observation.apparent_speed_kn,
            apparent_wind_angle_deg: observation.apparent_angle_deg,
            corrected_apparent_angle_deg: correction.corrected_awa,
            true_wind_speed_kn: true_wind.speed_kn,
            true_wind_angle_deg: true_wind.angle_deg,
        }
    }

    /// The heading, or an invalid one when it is older than the age limit
    fn fresh(&self, heading: HeadingEstimate, age: Option<Duration>) -> HeadingEstimate {
        match (self.max_heading_age, age) {
            (Some(limit), Some(age)) if age > limit => HeadingEstimate::invalid(heading.source),
            _ => heading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{FusionState, FusionUpdate};
    use crate::tracker::TrackerUpdate;
    use crate::types::{HeadingSource, Position, ShiftConvention};
    use approx::assert_abs_diff_eq;

    fn populated_state() -> FusionState {
        let state = FusionState::new();
        state.apply(FusionUpdate::Gps(TrackerUpdate {
            boat_speed_kn: 5.0,
            position: Position::new(43.7, 7.3),
            gps_heading: HeadingEstimate::new(0.0, HeadingSource::Gps),
            course_recomputed: true,
        }));
        state.apply(FusionUpdate::MagneticHeading(HeadingEstimate::new(
            10.0,
            HeadingSource::Magnetic,
        )));
        state
    }

    #[test]
    fn test_full_pass() {
        let state = populated_state();
        let observation = WindObservation::new(12.0, 30.0).unwrap();
        let timestamp = Utc::now();

        let record = SampleProcessor::new().process(&observation, &state.snapshot(), timestamp);

        assert_eq!(record.timestamp, timestamp);
        assert_eq!(record.position, Some(Position::new(43.7, 7.3)));
        assert_eq!(record.boat_speed_kn, 5.0);
        assert_eq!(record.magnetic_heading, Some(10.0));
        assert_eq!(record.gps_heading, Some(0.0));
        assert_eq!(record.heading_shift, Some(10.0));
        assert_eq!(record.apparent_wind_angle_deg, 30.0);
        assert_eq!(record.corrected_apparent_angle_deg, 40.0);

        let expected = WindTriangleSolver.solve(12.0, 40.0, 5.0);
        assert_abs_diff_eq!(record.true_wind_speed_kn, expected.speed_kn);
        assert_abs_diff_eq!(record.true_wind_angle_deg, expected.angle_deg);
    }

    #[test]
    fn test_empty_state_uses_zero_speed() {
        let observation = WindObservation::new(9.0, 300.0).unwrap();
        let record =
            SampleProcessor::new().process(&observation, &FusionSnapshot::default(), Utc::now());

        assert_eq!(record.position, None);
        assert_eq!(record.magnetic_heading, None);
        assert_eq!(record.gps_heading, None);
        assert_eq!(record.heading_shift, None);
        assert_eq!(record.corrected_apparent_angle_deg, 300.0);
        assert_abs_diff_eq!(record.true_wind_speed_kn, 9.0, epsilon = 1e-9);
        assert_abs_diff_eq!(record.true_wind_angle_deg, 300.0, epsilon = 1e-9);
    }

    #[test]
    fn test_convention_from_settings() {
        let processor = SampleProcessor::with_settings(ProcessorSettings {
            shift_convention: ShiftConvention::GpsMinusMagnetic,
            max_heading_age_ms: None,
        });
        let observation = WindObservation::new(12.0, 30.0).unwrap();
        let record = processor.process(&observation, &populated_state().snapshot(), Utc::now());

        assert_eq!(record.heading_shift, Some(350.0));
        assert_eq!(record.corrected_apparent_angle_deg, 20.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_heading_skips_shift() {
        let processor = SampleProcessor::with_settings(ProcessorSettings {
            max_heading_age_ms: Some(2_000),
            ..Default::default()
        });
        let state = populated_state();
        let observation = WindObservation::new(12.0, 30.0).unwrap();

        let fresh = processor.process(&observation, &state.snapshot(), Utc::now());
        assert_eq!(fresh.heading_shift, Some(10.0));

        tokio::time::advance(Duration::from_secs(5)).await;

        let stale = processor.process(&observation, &state.snapshot(), Utc::now());
        assert_eq!(stale.heading_shift, None);
        assert_eq!(stale.corrected_apparent_angle_deg, 30.0);
        // Last known values are still reported
        assert_eq!(stale.magnetic_heading, Some(10.0));
        assert_eq!(stale.boat_speed_kn, 5.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_course_retained_at_anchor_goes_stale() {
        use crate::tracker::PositionTracker;
        use crate::types::GpsFix;

        let processor = SampleProcessor::with_settings(ProcessorSettings {
            max_heading_age_ms: Some(2_000),
            ..Default::default()
        });
        let state = FusionState::new();
        let mut tracker = PositionTracker::new();
        let fix = |latitude: f64, speed_knots: f64| GpsFix {
            timestamp: Utc::now(),
            latitude,
            longitude: 7.3,
            speed_knots,
            fix_valid: true,
        };

        // Course established under way, then the boat anchors
        for update in [fix(43.7, 5.0), fix(43.701, 5.0)] {
            state.apply(FusionUpdate::Gps(tracker.update(&update).unwrap()));
        }
        for _ in 0..60 {
            tokio::time::advance(Duration::from_secs(1)).await;
            state.apply(FusionUpdate::Gps(tracker.update(&fix(43.701, 0.1)).unwrap()));
            state.apply(FusionUpdate::MagneticHeading(HeadingEstimate::new(
                10.0,
                HeadingSource::Magnetic,
            )));
        }

        let observation = WindObservation::new(12.0, 30.0).unwrap();
        let record = processor.process(&observation, &state.snapshot(), Utc::now());

        assert_eq!(record.heading_shift, None);
        assert_eq!(record.corrected_apparent_angle_deg, 30.0);
        assert_eq!(record.gps_heading, Some(0.0));
        assert_eq!(record.boat_speed_kn, 0.1);
    }
}
