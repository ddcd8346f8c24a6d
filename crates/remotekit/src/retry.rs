//! Retry policies for SSH transport failures.
//!
//! Only [`crate::Error::Connection`] is retried. Everything else, including a
//! failed install, is returned on the first occurrence.

use crate::error::Result;
use crate::types::RetryConfig;
use std::thread;
use std::time::Duration;

/// Run `operation`, retrying transport failures with exponential backoff.
///
/// Gives up after `config.max_attempts` attempts and returns the last error.
pub fn with_retry<T, F>(config: &RetryConfig, host: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut attempt = 0;
    loop {
        match operation() {
            Err(e) if e.is_retryable() && attempt + 1 < config.max_attempts => {
                let delay = config.delay_for_attempt(attempt);
                attempt += 1;
                log::warn!(
                    "{}: attempt {}/{} failed: {}. Retrying in {}s...",
                    host,
                    attempt,
                    config.max_attempts,
                    e,
                    delay.as_secs()
                );
                thread::sleep(delay);
            }
            result => return result,
        }
    }
}

/// Run `operation` until the host stops refusing connections.
///
/// Transport failures are retried every `interval` with no attempt cap. A
/// host that is still booting has no sshd yet, and waiting on it is not an
/// error.
pub fn until_reachable<T, F>(host: &str, interval: Duration, mut operation: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut refused: u64 = 0;
    loop {
        match operation() {
            Err(e) if e.is_retryable() => {
                refused += 1;
                if refused == 1 {
                    log::info!(
                        "{} not reachable yet ({}), retrying every {}s",
                        host,
                        e,
                        interval.as_secs()
                    );
                } else {
                    log::debug!("{host} still unreachable after {refused} attempts");
                }
                thread::sleep(interval);
            }
            result => return result,
        }
    }
}
