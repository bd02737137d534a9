//! Fusion Wind - true wind estimation for sailing boats
//!
//! This library fuses three asynchronous sensor streams into a stream of
//! true-wind records:
//!
//! - a GPS receiver, giving position, speed over ground and (derived) course
//! - a 9-axis IMU, giving a tilt-compensated magnetic heading
//! - a masthead anemometer, giving apparent wind speed and angle
//!
//! Every anemometer reading triggers one fusion pass against the most recent
//! GPS and compass values. The apparent wind angle is corrected by the
//! disagreement between the magnetic and GPS headings, then the wind
//! triangle is solved for true wind speed and angle.
//!
//! # Features
//!
//! - Tilt-compensated compass with configurable sensor mounting and hard/soft iron calibration
//! - GPS course from successive fixes, filtered against position jitter when stationary
//! - Heading shift correction with a configurable sign convention
//! - Lock-protected fusion state shared by independent producer tasks
//! - Exponential backoff supervision for reconnecting producers
//! - CSV wind log with empty cells for unavailable values
//!
//! # Quick Start
//!
//! ```rust
//! use chrono::Utc;
//! use fusion_wind::{
//!     FusionState, FusionUpdate, GpsFix, HeadingEstimate, HeadingSource, PositionTracker,
//!     SampleProcessor, WindObservation,
//! };
//!
//! let state = FusionState::new();
//! let mut tracker = PositionTracker::new();
//!
//! // Two fixes due north of each other give a course of 0 deg
//! for latitude in [45.0, 45.001] {
//!     let fix = GpsFix {
//!         timestamp: Utc::now(),
//!         latitude,
//!         longitude: 9.0,
//!         speed_knots: 5.0,
//!         fix_valid: true,
//!     };
//!     if let Some(update) = tracker.update(&fix) {
//!         state.apply(FusionUpdate::Gps(update));
//!     }
//! }
//!
//! // Compass reads 10 deg
//! state.apply(FusionUpdate::MagneticHeading(HeadingEstimate::new(10.0, HeadingSource::Magnetic)));
//!
//! let observation = WindObservation::new(12.0, 30.0).unwrap();
//! let record = SampleProcessor::new().process(&observation, &state.snapshot(), Utc::now());
//!
//! assert!((record.corrected_apparent_angle_deg - 40.0).abs() < 1e-6);
//! assert!((record.true_wind_speed_kn - 8.78).abs() < 0.01);
//! ```
//!
//! For a running system, [`Engine::spawn`] wires the same pipeline onto tokio
//! tasks fed by channels.

mod axes;
mod backoff;
pub mod calibration;
pub mod compass;
mod config;
mod engine;
mod error;
mod math;
mod processor;
mod producer;
mod shift;
mod sink;
mod state;
mod tracker;
mod triangle;
mod types;
pub mod wt901;

// Re-export all public types and functions
pub use axes::{AxesAlignment, axes_swap};
pub use backoff::{Backoff, BackoffPolicy};
pub use calibration::{MagneticCalibration, calibrate_magnetic};
pub use compass::{HeadingCompensator, calculate_heading};
pub use config::EngineConfig;
pub use engine::{Engine, EngineHandle};
pub use error::{Error, ProducerError, Result};
pub use math::{
    EARTH_RADIUS_M, MS_TO_KNOTS, Vector3Ext, haversine_distance, initial_bearing, round2,
    wrap_degrees,
};
pub use processor::SampleProcessor;
pub use producer::supervise;
pub use shift::{HeadingShiftCorrector, ShiftCorrection};
pub use sink::{CSV_HEADER, CsvSink, RecordSink};
pub use state::{FusionSnapshot, FusionState, FusionUpdate};
pub use tracker::{PositionTracker, TrackerUpdate};
pub use triangle::{TrueWind, WindTriangleSolver};
pub use types::*;
