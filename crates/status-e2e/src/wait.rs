//! Wait Mechanisms
//!
//! Fixed-interval polling used by every element wrapper. Waits block the
//! calling thread; the per-call timeout is the only cancellation.

use crate::result::{E2eError, E2eResult};
use std::time::{Duration, Instant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default element timeout (5 seconds), used by `is_displayed` and friends
pub const DEFAULT_ELEMENT_TIMEOUT_SECS: u64 = 5;

/// Default timeout for explicit waits (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 10;

/// Default polling interval (500ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_SECS * 1000,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a timeout given in seconds, as scenarios express them
    #[must_use]
    pub const fn secs(seconds: u64) -> Self {
        Self {
            timeout_ms: seconds.saturating_mul(1000),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a successful wait
#[derive(Debug, Clone)]
pub struct WaitResult<T> {
    /// Value produced by the condition
    pub value: T,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of times the condition was evaluated
    pub attempts: u32,
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll `probe` until it yields `Some`, an error, or the timeout elapses.
///
/// The probe always runs at least once, so a zero timeout is a single check.
/// Errors from the probe abort the wait immediately.
pub fn poll<T, F>(options: &WaitOptions, waited_for: &str, mut probe: F) -> E2eResult<WaitResult<T>>
where
    F: FnMut() -> E2eResult<Option<T>>,
{
    let start = Instant::now();
    let timeout = options.timeout();
    let mut attempts = 0;

    loop {
        attempts += 1;
        if let Some(value) = probe()? {
            tracing::trace!(waited_for, attempts, "wait satisfied");
            return Ok(WaitResult {
                value,
                elapsed: start.elapsed(),
                attempts,
            });
        }
        let elapsed = start.elapsed();
        if elapsed >= timeout {
            break;
        }
        std::thread::sleep(options.poll_interval().min(timeout - elapsed));
    }

    tracing::debug!(waited_for, attempts, timeout_ms = options.timeout_ms, "wait timed out");
    Err(E2eError::Timeout {
        ms: options.timeout_ms,
        waited_for: waited_for.to_string(),
    })
}

/// Wait for a predicate to return true
pub fn wait_until<F>(options: &WaitOptions, waited_for: &str, mut predicate: F) -> E2eResult<()>
where
    F: FnMut() -> E2eResult<bool>,
{
    poll(options, waited_for, || Ok(predicate()?.then_some(())))?;
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fast(timeout_ms: u64) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(timeout_ms)
            .with_poll_interval(1)
    }

    mod wait_options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout_ms, 10_000);
            assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }

        #[test]
        fn test_secs() {
            let opts = WaitOptions::secs(30);
            assert_eq!(opts.timeout_ms, 30_000);
            assert_eq!(opts.timeout(), Duration::from_secs(30));
        }

        #[test]
        fn test_secs_saturates() {
            assert_eq!(WaitOptions::secs(u64::MAX).timeout_ms, u64::MAX);
        }

        #[test]
        fn test_builders() {
            let opts = WaitOptions::new().with_timeout(100).with_poll_interval(5);
            assert_eq!(opts.timeout_ms, 100);
            assert_eq!(opts.poll_interval(), Duration::from_millis(5));
        }
    }

    mod poll_tests {
        use super::*;

        #[test]
        fn test_immediate_success() {
            let result = poll(&fast(100), "value", || Ok(Some(7))).unwrap();
            assert_eq!(result.value, 7);
            assert_eq!(result.attempts, 1);
        }

        #[test]
        fn test_success_after_retries() {
            let calls = Cell::new(0);
            let result = poll(&fast(1000), "third call", || {
                calls.set(calls.get() + 1);
                Ok((calls.get() >= 3).then_some("done"))
            })
            .unwrap();
            assert_eq!(result.value, "done");
            assert_eq!(result.attempts, 3);
        }

        #[test]
        fn test_timeout() {
            let err = poll::<(), _>(&fast(20), "never", || Ok(None)).unwrap_err();
            match err {
                E2eError::Timeout { ms, waited_for } => {
                    assert_eq!(ms, 20);
                    assert_eq!(waited_for, "never");
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_zero_timeout_checks_once() {
            let calls = Cell::new(0);
            let _ = poll::<(), _>(&fast(0), "once", || {
                calls.set(calls.get() + 1);
                Ok(None)
            });
            assert_eq!(calls.get(), 1);
        }

        #[test]
        fn test_probe_error_aborts() {
            let calls = Cell::new(0);
            let err = poll::<(), _>(&fast(1000), "broken", || {
                calls.set(calls.get() + 1);
                Err(E2eError::driver("session gone"))
            })
            .unwrap_err();
            assert!(matches!(err, E2eError::Driver { .. }));
            assert_eq!(calls.get(), 1);
        }

        #[test]
        fn test_wait_until() {
            let calls = Cell::new(0);
            wait_until(&fast(1000), "flag", || {
                calls.set(calls.get() + 1);
                Ok(calls.get() == 2)
            })
            .unwrap();
            assert_eq!(calls.get(), 2);
        }
    }
}
