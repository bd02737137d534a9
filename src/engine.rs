//! Async runtime wiring producers, fusion state and the record sink
//!
//! Three consumer tasks run independently:
//!
//! - GPS: [`GpsFix`] → [`PositionTracker`] → [`FusionState`]
//! - IMU: [`InertialPacket`] → [`HeadingCompensator`] → [`FusionState`]
//! - Wind: [`WindObservation`] → [`SampleProcessor`] → [`RecordSink`]
//!
//! Producer adapters feed the tasks through bounded channels obtained from
//! the [`EngineHandle`]. A slow or dead producer never blocks the others: the
//! wind task always joins against the last values written to the state.

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::compass::HeadingCompensator;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::processor::SampleProcessor;
use crate::sink::RecordSink;
use crate::state::{FusionState, FusionUpdate};
use crate::tracker::PositionTracker;
use crate::types::{GpsFix, InertialPacket, InertialSample, WindObservation};

/// Entry point of the fusion runtime
pub struct Engine;

impl Engine {
    /// Start the consumer tasks on the current tokio runtime.
    ///
    /// Must be called from within a runtime context.
    ///
    /// # Example
    /// ```
    /// use fusion_wind::{Engine, EngineConfig, WindObservation, WindRecord};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> fusion_wind::Result<()> {
    /// let engine = Engine::spawn(EngineConfig::default(), Vec::<WindRecord>::new());
    ///
    /// let wind = engine.wind_sender();
    /// wind.send(WindObservation::new(10.0, 45.0)?).await.ok();
    /// drop(wind);
    ///
    /// let records = engine.shutdown().await?;
    /// assert_eq!(records.len(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn spawn<S>(config: EngineConfig, sink: S) -> EngineHandle<S>
    where
        S: RecordSink + Send + 'static,
    {
        let capacity = config.channel_capacity.max(1);
        let state = FusionState::new();

        let (gps, gps_rx) = mpsc::channel(capacity);
        let (imu, imu_rx) = mpsc::channel(capacity);
        let (wind, wind_rx) = mpsc::channel(capacity);

        let gps_task = tokio::spawn(run_gps(
            gps_rx,
            PositionTracker::with_settings(config.tracker),
            state.clone(),
        ));
        let imu_task = tokio::spawn(run_imu(
            imu_rx,
            HeadingCompensator::with_settings(config.compass),
            state.clone(),
        ));
        let wind_task = tokio::spawn(run_wind(
            wind_rx,
            SampleProcessor::with_settings(config.processor),
            state.clone(),
            sink,
        ));

        info!(capacity, "fusion engine started");

        EngineHandle {
            gps,
            imu,
            wind,
            state,
            gps_task,
            imu_task,
            wind_task,
        }
    }
}

/// Handle to a running engine
///
/// Hands out channel senders for producer adapters and owns the tasks.
pub struct EngineHandle<S> {
    gps: mpsc::Sender<GpsFix>,
    imu: mpsc::Sender<InertialPacket>,
    wind: mpsc::Sender<WindObservation>,
    state: FusionState,
    gps_task: JoinHandle<()>,
    imu_task: JoinHandle<()>,
    wind_task: JoinHandle<S>,
}

impl<S> EngineHandle<S> {
    /// Sender for decoded GPS fixes
    pub fn gps_sender(&self) -> mpsc::Sender<GpsFix> {
        self.gps.clone()
    }

    /// Sender for decoded IMU packets
    pub fn imu_sender(&self) -> mpsc::Sender<InertialPacket> {
        self.imu.clone()
    }

    /// Sender for anemometer readings
    pub fn wind_sender(&self) -> mpsc::Sender<WindObservation> {
        self.wind.clone()
    }

    /// Shared fusion state, for monitoring
    pub fn state(&self) -> &FusionState {
        &self.state
    }

    /// Close the engine's own senders, wait for the tasks to drain, and
    /// return the sink.
    ///
    /// The tasks finish once every sender handed out has been dropped, so
    /// producer adapters must be stopped first.
    pub async fn shutdown(self) -> Result<S> {
        let Self {
            gps,
            imu,
            wind,
            gps_task,
            imu_task,
            wind_task,
            ..
        } = self;
        drop((gps, imu, wind));

        gps_task.await?;
        imu_task.await?;
        let sink = wind_task.await?;
        info!("fusion engine stopped");
        Ok(sink)
    }
}

async fn run_gps(
    mut fixes: mpsc::Receiver<GpsFix>,
    mut tracker: PositionTracker,
    state: FusionState,
) {
    while let Some(fix) = fixes.recv().await {
        if let Some(update) = tracker.update(&fix) {
            trace!(speed_kn = update.boat_speed_kn, "gps update");
            state.apply(FusionUpdate::Gps(update));
        }
    }
    debug!("gps channel closed");
}

async fn run_imu(
    mut packets: mpsc::Receiver<InertialPacket>,
    compensator: HeadingCompensator,
    state: FusionState,
) {
    let mut sample = InertialSample::default();
    while let Some(packet) = packets.recv().await {
        sample.apply(packet);

        // Headings are recomputed on magnetometer replies, which arrive slowest
        if let InertialPacket::Magnetic(_) = packet {
            let heading = compensator.compute(&sample);
            if heading.valid {
                trace!(heading = heading.degrees, "compass update");
            } else {
                debug!("degenerate imu sample, keeping last heading");
            }
            state.apply(FusionUpdate::MagneticHeading(heading));
        }
    }
    debug!("imu channel closed");
}

async fn run_wind<S: RecordSink>(
    mut observations: mpsc::Receiver<WindObservation>,
    processor: SampleProcessor,
    state: FusionState,
    mut sink: S,
) -> S {
    while let Some(observation) = observations.recv().await {
        // Fields are public: re-check anything built without the constructor
        let observation = match WindObservation::new(
            observation.apparent_speed_kn,
            observation.apparent_angle_deg,
        ) {
            Ok(observation) => observation,
            Err(err) => {
                debug!(error = %err, "dropping anemometer reading");
                continue;
            }
        };

        let record = processor.process(&observation, &state.snapshot(), Utc::now());
        if let Err(err) = sink.append(&record) {
            warn!(error = %err, "failed to persist wind record");
        }
    }

    if let Err(err) = sink.flush() {
        warn!(error = %err, "failed to flush wind log");
    }
    debug!("wind channel closed");
    sink
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WindRecord;

    #[tokio::test]
    async fn test_malformed_observation_is_dropped() {
        let engine = Engine::spawn(EngineConfig::default(), Vec::<WindRecord>::new());
        let wind = engine.wind_sender();

        wind.send(WindObservation {
            apparent_speed_kn: f64::NAN,
            apparent_angle_deg: 10.0,
        })
        .await
        .unwrap();
        wind.send(WindObservation::new(6.0, 90.0).unwrap()).await.unwrap();
        drop(wind);

        let records = engine.shutdown().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].apparent_wind_speed_kn, 6.0);
    }

    #[tokio::test]
    async fn test_sink_failure_does_not_stop_processing() {
        struct FlakySink {
            calls: usize,
            kept: Vec<WindRecord>,
        }

        impl RecordSink for FlakySink {
            fn append(&mut self, record: &WindRecord) -> Result<()> {
                self.calls += 1;
                if self.calls == 1 {
                    return Err(crate::Error::Io(std::io::Error::other("disk full")));
                }
                self.kept.push(*record);
                Ok(())
            }
        }

        let engine = Engine::spawn(
            EngineConfig::default(),
            FlakySink {
                calls: 0,
                kept: Vec::new(),
            },
        );
        let wind = engine.wind_sender();
        for angle in [10.0, 20.0, 30.0] {
            wind.send(WindObservation::new(8.0, angle).unwrap()).await.unwrap();
        }
        drop(wind);

        let sink = engine.shutdown().await.unwrap();
        assert_eq!(sink.calls, 3);
        assert_eq!(sink.kept.len(), 2);
        assert_eq!(sink.kept[0].apparent_wind_angle_deg, 20.0);
    }
}
