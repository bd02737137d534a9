//! Property-based tests for angle ranges and finiteness across the pipeline

use chrono::Utc;
use fusion_wind::{
    FusionState, FusionUpdate, HeadingEstimate, HeadingShiftCorrector, HeadingSource,
    SampleProcessor, WindObservation, WindTriangleSolver, calculate_heading, wrap_degrees,
};
use nalgebra::Vector3;
use proptest::prelude::*;

fn in_circle(angle: f64) -> bool {
    angle.is_finite() && (0.0..360.0).contains(&angle)
}

fn component() -> impl Strategy<Value = f64> {
    -100.0..100.0f64
}

fn vector() -> impl Strategy<Value = Vector3<f64>> {
    (component(), component(), component()).prop_map(|(x, y, z)| Vector3::new(x, y, z))
}

proptest! {
    #[test]
    fn wrapped_angles_stay_in_range(angle in -1.0e6..1.0e6f64) {
        let wrapped = wrap_degrees(angle);
        prop_assert!(in_circle(wrapped));
    }

    #[test]
    fn compass_heading_in_range_or_invalid(accel in vector(), mag in vector()) {
        let heading = calculate_heading(accel, mag);
        if heading.valid {
            prop_assert!(in_circle(heading.degrees));
        }
    }

    #[test]
    fn shift_and_corrected_angle_in_range(
        magnetic in 0.0..360.0f64,
        gps in 0.0..360.0f64,
        awa in 0.0..360.0f64,
    ) {
        let correction = HeadingShiftCorrector::new().correct(
            awa,
            &HeadingEstimate::new(magnetic, HeadingSource::Magnetic),
            &HeadingEstimate::new(gps, HeadingSource::Gps),
        );
        let shift = correction.shift.unwrap();
        prop_assert!(in_circle(shift));
        prop_assert!(in_circle(correction.corrected_awa));
    }

    #[test]
    fn true_wind_is_finite_and_in_range(
        aws in 0.0..80.0f64,
        awa in 0.0..360.0f64,
        boat_speed in 0.0..30.0f64,
    ) {
        let wind = WindTriangleSolver.solve(aws, awa, boat_speed);
        prop_assert!(wind.speed_kn.is_finite());
        prop_assert!(wind.speed_kn >= 0.0);
        prop_assert!(in_circle(wind.angle_deg));
        // Triangle inequality on the wind vectors
        prop_assert!(wind.speed_kn <= aws + boat_speed + 1e-9);
    }

    #[test]
    fn processed_record_is_well_formed(
        aws in 0.0..80.0f64,
        awa in -720.0..720.0f64,
        magnetic in proptest::option::of(0.0..360.0f64),
        gps in proptest::option::of(0.0..360.0f64),
    ) {
        let state = FusionState::new();
        if let Some(magnetic) = magnetic {
            state.apply(FusionUpdate::MagneticHeading(HeadingEstimate::new(
                magnetic,
                HeadingSource::Magnetic,
            )));
        }

        let observation = WindObservation::new(aws, awa).unwrap();
        let mut snapshot = state.snapshot();
        if let Some(gps) = gps {
            snapshot.gps_heading = HeadingEstimate::new(gps, HeadingSource::Gps);
        }

        let record = SampleProcessor::new().process(&observation, &snapshot, Utc::now());
        prop_assert_eq!(record.heading_shift.is_some(), magnetic.is_some() && gps.is_some());
        prop_assert!(in_circle(record.apparent_wind_angle_deg));
        prop_assert!(in_circle(record.corrected_apparent_angle_deg));
        prop_assert!(in_circle(record.true_wind_angle_deg));
        prop_assert!(record.true_wind_speed_kn.is_finite());
    }
}
