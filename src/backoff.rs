//! Bounded exponential backoff for producer retries

use serde::Deserialize;
use tokio::time::Duration;

use crate::error::{Error, Result};

/// Retry delay policy: start at `initial_ms`, multiply after every failure,
/// never exceed `ceiling_ms`
///
/// # Example
/// ```
/// use std::time::Duration;
/// use fusion_wind::BackoffPolicy;
///
/// let mut backoff = BackoffPolicy::default().backoff();
/// assert_eq!(backoff.next_delay(), Duration::from_secs(2));
/// assert_eq!(backoff.next_delay(), Duration::from_secs(4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BackoffPolicy {
    /// First delay, milliseconds
    pub initial_ms: u64,
    /// Growth factor applied after each failure
    pub multiplier: u32,
    /// Upper bound on any delay, milliseconds
    pub ceiling_ms: u64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_ms: 2_000,
            multiplier: 2,
            ceiling_ms: 30_000,
        }
    }
}

impl BackoffPolicy {
    /// Policy for the GPS serial reader: short pauses between failed reads
    pub const fn gps() -> Self {
        Self {
            initial_ms: 200,
            multiplier: 2,
            ceiling_ms: 5_000,
        }
    }

    /// Policy for the IMU BLE session
    pub const fn imu() -> Self {
        Self {
            initial_ms: 2_000,
            multiplier: 2,
            ceiling_ms: 30_000,
        }
    }

    /// Policy for the anemometer BLE session
    pub const fn anemometer() -> Self {
        Self {
            initial_ms: 2_000,
            multiplier: 2,
            ceiling_ms: 60_000,
        }
    }

    /// Reject policies that would never delay or never grow.
    pub fn validate(&self) -> Result<()> {
        if self.initial_ms == 0 {
            return Err(Error::invalid_config("backoff initial delay must be positive"));
        }
        if self.multiplier == 0 {
            return Err(Error::invalid_config("backoff multiplier must be positive"));
        }
        if self.ceiling_ms < self.initial_ms {
            return Err(Error::invalid_config(format!(
                "backoff ceiling {} ms is below initial delay {} ms",
                self.ceiling_ms, self.initial_ms
            )));
        }
        Ok(())
    }

    /// Start a fresh delay sequence
    pub fn backoff(&self) -> Backoff {
        Backoff {
            policy: *self,
            next_ms: self.initial_ms.min(self.ceiling_ms),
        }
    }
}

/// Stateful delay sequence produced by a [`BackoffPolicy`]
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: BackoffPolicy,
    next_ms: u64,
}

impl Backoff {
    /// Delay to wait before the next attempt; grows the following delay.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.next_ms;
        self.next_ms = delay
            .saturating_mul(u64::from(self.policy.multiplier))
            .min(self.policy.ceiling_ms);
        Duration::from_millis(delay)
    }

    /// Back to the initial delay, after a successful session
    pub fn reset(&mut self) {
        self.next_ms = self.policy.initial_ms.min(self.policy.ceiling_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn millis(backoff: &mut Backoff, count: usize) -> Vec<u128> {
        (0..count).map(|_| backoff.next_delay().as_millis()).collect()
    }

    #[test]
    fn test_doubles_then_saturates() {
        let mut backoff = BackoffPolicy::imu().backoff();
        assert_eq!(
            millis(&mut backoff, 6),
            vec![2_000, 4_000, 8_000, 16_000, 30_000, 30_000]
        );
    }

    #[test]
    fn test_anemometer_ceiling() {
        let mut backoff = BackoffPolicy::anemometer().backoff();
        assert_eq!(
            millis(&mut backoff, 7),
            vec![2_000, 4_000, 8_000, 16_000, 32_000, 60_000, 60_000]
        );
    }

    #[test]
    fn test_reset_returns_to_initial() {
        let mut backoff = BackoffPolicy::gps().backoff();
        millis(&mut backoff, 4);
        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_millis(200));
    }

    #[test]
    fn test_large_multiplier_does_not_overflow() {
        let mut backoff = BackoffPolicy {
            initial_ms: u64::MAX / 2,
            multiplier: u32::MAX,
            ceiling_ms: u64::MAX,
        }
        .backoff();
        backoff.next_delay();
        assert_eq!(backoff.next_delay(), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_validate() {
        assert!(BackoffPolicy::default().validate().is_ok());
        assert!(
            BackoffPolicy {
                initial_ms: 0,
                ..Default::default()
            }
            .validate()
            .is_err()
        );
        assert!(
            BackoffPolicy {
                initial_ms: 5_000,
                ceiling_ms: 1_000,
                ..Default::default()
            }
            .validate()
            .is_err()
        );
    }
}
