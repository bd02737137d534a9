//! Output sinks for wind records

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::math::{round2, wrap_degrees};
use crate::types::WindRecord;

/// Column names of the wind log, in order
pub const CSV_HEADER: [&str; 12] = [
    "timestamp",
    "lat",
    "lon",
    "gps_speed_kn",
    "heading_gps",
    "heading_mag",
    "shift_deg",
    "AWS_kn",
    "AWA_deg",
    "AWA_corr_deg",
    "TWS_kn",
    "TWA_deg",
];

/// Destination for emitted wind records
///
/// The engine moves every record into the sink as soon as it is produced and
/// keeps no reference to it.
pub trait RecordSink {
    /// Persist one record.
    fn append(&mut self, record: &WindRecord) -> Result<()>;

    /// Push buffered records to durable storage.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// In-memory sink, handy for replay and tests
impl RecordSink for Vec<WindRecord> {
    fn append(&mut self, record: &WindRecord) -> Result<()> {
        self.push(*record);
        Ok(())
    }
}

/// Header-stamped CSV wind log
///
/// Unavailable values are written as empty cells, never as a sentinel
/// number. Every row is flushed as soon as it is written.
///
/// # Example
/// ```
/// use fusion_wind::CsvSink;
///
/// let sink = CsvSink::new(Vec::new()).unwrap();
/// let bytes = sink.into_inner().unwrap();
/// assert!(String::from_utf8(bytes).unwrap().starts_with("timestamp,lat,lon,"));
/// ```
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    /// Wrap a writer and stamp the header row.
    pub fn new(inner: W) -> Result<Self> {
        let mut sink = Self::without_header(inner);
        sink.writer.write_record(CSV_HEADER)?;
        sink.writer.flush()?;
        Ok(sink)
    }

    /// Wrap a writer that already holds a header.
    pub fn without_header(inner: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(inner),
        }
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|err| Error::Io(err.into_error()))
    }
}

impl CsvSink<File> {
    /// Open a log for appending, writing the header only if the file is new or empty.
    pub fn open_append(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        if file.metadata()?.len() == 0 {
            debug!(path = %path.display(), "starting new wind log");
            Self::new(file)
        } else {
            debug!(path = %path.display(), "appending to existing wind log");
            Ok(Self::without_header(file))
        }
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn append(&mut self, record: &WindRecord) -> Result<()> {
        self.writer.write_record(record_row(record))?;
        self.writer.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Angle rounded for the log, kept in `[0, 360)`
fn rounded_angle(degrees: f64) -> f64 {
    wrap_degrees(round2(degrees))
}

/// Render a record with the log's precision rules
fn record_row(record: &WindRecord) -> [String; 12] {
    let angle = |value: Option<f64>| {
        value
            .map(|v| rounded_angle(v).to_string())
            .unwrap_or_default()
    };
    let position = record.position;

    [
        record.timestamp.timestamp().to_string(),
        position.map(|p| p.latitude.to_string()).unwrap_or_default(),
        position.map(|p| p.longitude.to_string()).unwrap_or_default(),
        record.boat_speed_kn.to_string(),
        angle(record.gps_heading),
        angle(record.magnetic_heading),
        angle(record.heading_shift),
        round2(record.apparent_wind_speed_kn).to_string(),
        record.apparent_wind_angle_deg.to_string(),
        rounded_angle(record.corrected_apparent_angle_deg).to_string(),
        round2(record.true_wind_speed_kn).to_string(),
        rounded_angle(record.true_wind_angle_deg).to_string(),
    ]
}
