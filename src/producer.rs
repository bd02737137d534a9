//! Supervision of producer sessions (GPS serial reader, BLE clients)
//!
//! An adapter describes one connection attempt as an async session that
//! pushes decoded frames into an engine channel until it fails. [`supervise`]
//! restarts it forever with bounded exponential backoff, and only a
//! configuration failure ends the producer. Other producers keep running.

use std::future::Future;

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::backoff::BackoffPolicy;
use crate::error::ProducerError;

/// Run `session` until it reports an irrecoverable failure.
///
/// - `Err(Transport)`: wait for the next backoff delay and reconnect
/// - `Ok(())`: the session ended cleanly (device closed the link); reset
///   the backoff and reconnect after the initial delay
/// - `Err(Configuration)`: log and return the error
///
/// # Example
/// ```no_run
/// use fusion_wind::{EngineConfig, ProducerError, supervise};
///
/// # async fn open_serial() -> Result<(), ProducerError> { Ok(()) }
/// # async fn run() {
/// let config = EngineConfig::from_json(r#"{ "gps_backoff": { "ceiling_ms": 2000 } }"#).unwrap();
/// let fatal = supervise("gps", config.gps_backoff, || async {
///     open_serial().await?;
///     // read lines, decode fixes, send them into the engine ...
///     Err(ProducerError::transport("serial port closed"))
/// })
/// .await;
/// eprintln!("gps producer stopped: {fatal}");
/// # }
/// ```
pub async fn supervise<F, Fut>(name: &str, policy: BackoffPolicy, mut session: F) -> ProducerError
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), ProducerError>>,
{
    let mut backoff = policy.backoff();

    loop {
        info!(producer = name, "starting session");
        match session().await {
            Ok(()) => {
                backoff.reset();
                let delay = backoff.next_delay();
                info!(
                    producer = name,
                    delay_ms = delay.as_millis() as u64,
                    "session ended, reconnecting"
                );
                sleep(delay).await;
            }
            Err(err) if err.is_recoverable() => {
                let delay = backoff.next_delay();
                warn!(
                    producer = name,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "session failed, backing off"
                );
                sleep(delay).await;
            }
            Err(err) => {
                error!(producer = name, error = %err, "producer stopped");
                return err;
            }
        }
    }
}
