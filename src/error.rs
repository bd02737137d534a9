//! Error types for the fusion-wind crate

use thiserror::Error;

/// Errors raised by the fusion core and its record sinks.
#[derive(Debug, Error)]
pub enum Error {
    /// Anemometer reading that cannot enter a fusion pass.
    #[error("invalid wind observation: speed {speed_kn} kn, angle {angle_deg} deg")]
    InvalidObservation {
        /// Apparent wind speed as received, in knots.
        speed_kn: f64,
        /// Apparent wind angle as received, in degrees.
        angle_deg: f64,
    },

    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O failure while opening or writing a record log.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding failure.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed JSON configuration.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// An engine task panicked or was cancelled.
    #[error("engine task failed: {0}")]
    TaskFailed(String),
}

impl Error {
    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskFailed(err.to_string())
    }
}

/// Result type for fusion-wind operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by a producer session (serial reader, BLE client, ...).
///
/// Transport failures are retried with backoff by [`crate::supervise`];
/// configuration failures end that producer only.
#[derive(Debug, Error)]
pub enum ProducerError {
    /// Recoverable: disconnect, scan timeout, failed write, parse storm.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Irrecoverable: the configured device cannot be used at all.
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ProducerError {
    /// Creates a transport failure.
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport(reason.into())
    }

    /// Creates a configuration failure.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration(reason.into())
    }

    /// Whether the producer should back off and retry.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<std::io::Error> for ProducerError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                Self::Configuration(err.to_string())
            }
            _ => Self::Transport(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_observation() {
        let err = Error::InvalidObservation {
            speed_kn: -1.0,
            angle_deg: 30.0,
        };
        assert!(err.to_string().contains("invalid wind observation"));
        assert!(err.to_string().contains("-1"));
    }

    #[test]
    fn error_invalid_config() {
        let err = Error::invalid_config("channel capacity must be positive");
        assert!(err.to_string().contains("invalid configuration"));
    }

    #[test]
    fn producer_error_recoverability() {
        assert!(ProducerError::transport("disconnected").is_recoverable());
        assert!(!ProducerError::configuration("no such port").is_recoverable());
    }

    #[test]
    fn producer_error_from_io() {
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "/dev/serial0");
        assert!(!ProducerError::from(missing).is_recoverable());

        let timeout = std::io::Error::new(std::io::ErrorKind::TimedOut, "read timed out");
        assert!(ProducerError::from(timeout).is_recoverable());
    }
}
