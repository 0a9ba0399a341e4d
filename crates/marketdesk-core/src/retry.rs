//! Fixed-delay retry and cancellation helpers shared by the session accessor
//! and the entity read path. Writes never go through `run_with_retry`.

use crate::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_MS};
use std::{future::Future, time::Duration};
use tokio_util::sync::CancellationToken;

///
/// RetryPolicy
///
/// `max_retries` counts retries after the first attempt, so the default of
/// 2 allows at most 3 attempts.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// No retries; the first failure is surfaced.
    pub const NONE: Self = Self {
        max_retries: 0,
        delay: Duration::ZERO,
    };

    #[must_use]
    pub const fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_RETRIES,
            Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        )
    }
}

///
/// RetryOutcome
///

#[derive(Debug)]
pub(crate) enum RetryOutcome<T, E> {
    Done { value: T, attempts: u32 },
    Failed { error: E, attempts: u32 },
    Cancelled,
}

/// Race `fut` against `cancel`; `None` means the token fired first.
pub(crate) async fn cancellable<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Option<F::Output> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => None,
        out = fut => Some(out),
    }
}

/// Run `op` until it succeeds, fails with a non-transient error, or runs out
/// of retries. Cancellation is observed during attempts and delays.
pub(crate) async fn run_with_retry<T, E, F, Fut>(
    policy: RetryPolicy,
    cancel: &CancellationToken,
    is_transient: impl Fn(&E) -> bool,
    mut op: F,
) -> RetryOutcome<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempts = 0;
    loop {
        attempts += 1;
        let Some(result) = cancellable(cancel, op()).await else {
            return RetryOutcome::Cancelled;
        };

        match result {
            Ok(value) => return RetryOutcome::Done { value, attempts },
            Err(error) if attempts > policy.max_retries || !is_transient(&error) => {
                return RetryOutcome::Failed { error, attempts };
            }
            Err(_) => {
                let delay_ms = u64::try_from(policy.delay.as_millis()).unwrap_or(u64::MAX);
                tracing::trace!(attempts, delay_ms, "retry.wait");
                if cancellable(cancel, tokio::time::sleep(policy.delay))
                    .await
                    .is_none()
                {
                    return RetryOutcome::Cancelled;
                }
            }
        }
    }
}

///
/// TESTS
///
