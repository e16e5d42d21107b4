//! Status write-back with bounded, linearly backed-off retries.
//!
//! Attempt `n` that fails (with `n < max_attempts`) is followed by a sleep
//! of `n × backoff_step` before attempt `n + 1`:
//!
//! | Attempt | Sleep after failure (step = 1 000 ms) |
//! |---------|---------------------------------------|
//! | 1       | 1 000 ms                              |
//! | 2       | 2 000 ms                              |
//! | 3       | none (terminal with `max_attempts = 3`) |
//!
//! Permission failures are retried like any other failure; they only differ
//! in the diagnostic reported once the budget is exhausted.

use std::time::Duration;

use linkcheck_core::ClassificationResult;
use thiserror::Error;

use crate::error::SheetsError;
use crate::layout::SheetLayout;
use crate::store::SheetStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Values below 1 are treated as 1.
    pub max_attempts: u32,
    pub backoff_step: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, backoff_step: Duration) -> Self {
        Self {
            max_attempts,
            backoff_step,
        }
    }

    /// Sleep inserted after failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff_step.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1_000))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateSuccess {
    pub row: u32,
    pub attempts: u32,
}

/// Terminal failure after the attempt budget was spent.
#[derive(Debug, Error)]
#[error("updating row {row} failed after {attempts} attempt(s): {last_error}")]
pub struct UpdateFailure {
    pub row: u32,
    pub attempts: u32,
    #[source]
    pub last_error: SheetsError,
}

impl UpdateFailure {
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        self.last_error.is_permission_denied()
    }

    #[must_use]
    pub fn diagnostic(&self) -> String {
        self.last_error.diagnostic()
    }
}

/// Persist `result`'s status and confidence into `row`.
///
/// Each attempt performs exactly one [`SheetStore::write_range`] call on the
/// row's status range.
///
/// # Errors
///
/// Returns [`UpdateFailure`] carrying the attempt count and the last error
/// once `policy.max_attempts` attempts have failed.
pub async fn update_with_retry(
    store: &dyn SheetStore,
    layout: &SheetLayout,
    row: u32,
    result: &ClassificationResult,
    policy: RetryPolicy,
) -> Result<UpdateSuccess, UpdateFailure> {
    let range = layout.status_range(row);
    let values = vec![vec![
        result.status.as_sheet_value().to_owned(),
        result.confidence_label(),
    ]];
    let max_attempts = policy.max_attempts.max(1);

    let mut attempt = 1u32;
    loop {
        match store.write_range(&range, values.clone()).await {
            Ok(()) => {
                tracing::debug!(row, attempt, status = %result.status, "sheet row updated");
                return Ok(UpdateSuccess {
                    row,
                    attempts: attempt,
                });
            }
            Err(err) if attempt >= max_attempts => {
                tracing::error!(
                    row,
                    attempts = attempt,
                    permission_denied = err.is_permission_denied(),
                    "{}",
                    err.diagnostic()
                );
                return Err(UpdateFailure {
                    row,
                    attempts: attempt,
                    last_error: err,
                });
            }
            Err(err) => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    row,
                    attempt,
                    max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "sheet update failed; retrying after backoff"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use linkcheck_core::ConnectionStatus;
    use tokio::time::Instant;

    use super::*;

    /// Store whose first `failures` writes fail; records every call time.
    struct FlakyStore {
        failures: u32,
        permission_denied: bool,
        calls: Mutex<Vec<(Instant, String, Vec<Vec<String>>)>>,
    }

    impl FlakyStore {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                permission_denied: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn gaps(&self) -> Vec<Duration> {
            let calls = self.calls.lock().unwrap();
            calls.windows(2).map(|w| w[1].0 - w[0].0).collect()
        }
    }

    #[async_trait]
    impl SheetStore for FlakyStore {
        async fn read_range(&self, _range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
            Ok(Vec::new())
        }

        async fn write_range(
            &self,
            range: &str,
            values: Vec<Vec<String>>,
        ) -> Result<(), SheetsError> {
            let mut calls = self.calls.lock().unwrap();
            calls.push((Instant::now(), range.to_owned(), values));
            let n = u32::try_from(calls.len()).unwrap();
            if n <= self.failures {
                if self.permission_denied {
                    return Err(SheetsError::PermissionDenied {
                        status: 403,
                        message: "The caller does not have permission".to_owned(),
                    });
                }
                return Err(SheetsError::RateLimited {
                    message: "quota exceeded".to_owned(),
                });
            }
            Ok(())
        }
    }

    fn pending() -> ClassificationResult {
        ClassificationResult::new(ConnectionStatus::Pending, 0.95, "pending indicator found")
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_first_try_without_sleeping() {
        let store = FlakyStore::new(0);
        let start = Instant::now();
        let outcome = update_with_retry(
            &store,
            &SheetLayout::default(),
            5,
            &pending(),
            RetryPolicy::default(),
        )
        .await
        .unwrap();
        assert_eq!(outcome, UpdateSuccess { row: 5, attempts: 1 });
        assert_eq!(store.call_count(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn fails_twice_then_succeeds_with_linear_waits() {
        let store = FlakyStore::new(2);
        let start = Instant::now();
        let outcome = update_with_retry(
            &store,
            &SheetLayout::default(),
            3,
            &pending(),
            RetryPolicy::default(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.attempts, 3);
        assert_eq!(store.call_count(), 3);
        assert_eq!(
            store.gaps(),
            vec![Duration::from_millis(1_000), Duration::from_millis(2_000)]
        );
        assert_eq!(start.elapsed(), Duration::from_millis(3_000));
    }

    #[tokio::test(start_paused = true)]
    async fn always_failing_stops_after_max_attempts() {
        let store = FlakyStore::new(u32::MAX);
        let failure = update_with_retry(
            &store,
            &SheetLayout::default(),
            9,
            &pending(),
            RetryPolicy::default(),
        )
        .await
        .unwrap_err();

        assert_eq!(store.call_count(), 3, "must never attempt a 4th write");
        assert_eq!(failure.attempts, 3);
        assert_eq!(failure.row, 9);
        assert!(matches!(failure.last_error, SheetsError::RateLimited { .. }));
        assert!(!failure.is_permission_denied());
    }

    #[tokio::test(start_paused = true)]
    async fn permission_denied_is_retried_then_diagnosed() {
        let mut store = FlakyStore::new(u32::MAX);
        store.permission_denied = true;
        let failure = update_with_retry(
            &store,
            &SheetLayout::default(),
            2,
            &pending(),
            RetryPolicy::default(),
        )
        .await
        .unwrap_err();

        assert_eq!(store.call_count(), 3);
        assert!(failure.is_permission_denied());
        assert!(failure.diagnostic().contains("not writable"));
    }

    #[tokio::test(start_paused = true)]
    async fn every_attempt_targets_the_same_row_cells() {
        let store = FlakyStore::new(1);
        update_with_retry(
            &store,
            &SheetLayout::default(),
            12,
            &ClassificationResult::new(ConnectionStatus::NotConnected, 0.9, "x"),
            RetryPolicy::default(),
        )
        .await
        .unwrap();

        let calls = store.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        for (_, range, values) in calls.iter() {
            assert_eq!(range, "Sheet1!B12:C12");
            assert_eq!(
                values,
                &vec![vec!["Not Connected".to_owned(), "0.90".to_owned()]]
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn zero_max_attempts_still_tries_once() {
        let store = FlakyStore::new(u32::MAX);
        let failure = update_with_retry(
            &store,
            &SheetLayout::default(),
            2,
            &pending(),
            RetryPolicy::new(0, Duration::from_millis(1_000)),
        )
        .await
        .unwrap_err();
        assert_eq!(failure.attempts, 1);
        assert_eq!(store.call_count(), 1);
    }

    #[test]
    fn delay_grows_linearly() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_millis(1_000));
        assert_eq!(policy.delay_after(2), Duration::from_millis(2_000));
        assert_eq!(policy.delay_after(3), Duration::from_millis(3_000));
    }
}
