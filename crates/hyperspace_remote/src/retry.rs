//! Fixed-backoff retry for remote calls

use std::time::Duration;
use backon::{BlockingRetryable, ConstantBuilder};
use crate::cancel::CancelToken;
use crate::error::RemoteError;

/// How often and how patiently a remote call is retried
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: usize,
    /// Pause between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: usize, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Single attempt, no retries
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Run `op` until it succeeds, fails permanently or runs out of retries
    ///
    /// Only transient errors are retried. The token is checked before every
    /// attempt; once cancelled the call ends with [`RemoteError::Cancelled`].
    pub fn run<T, F>(&self, cancel: &CancelToken, label: &str, mut op: F) -> Result<T, RemoteError>
    where
        F: FnMut() -> Result<T, RemoteError>,
    {
        let attempt = || {
            if cancel.is_cancelled() {
                return Err(RemoteError::Cancelled);
            }
            op()
        };
        attempt
            .retry(
                ConstantBuilder::default()
                    .with_delay(self.delay)
                    .with_max_times(self.max_retries),
            )
            .sleep(std::thread::sleep)
            .when(|e: &RemoteError| e.is_transient() && !cancel.is_cancelled())
            .notify(|e: &RemoteError, after: Duration| {
                log::warn!("{} failed ({}), retrying in {:?}", label, e, after);
            })
            .call()
    }
}
