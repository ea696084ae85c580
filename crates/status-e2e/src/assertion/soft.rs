//! Soft Assertions
//!
//! Scenario-scoped list of failures that do not stop the scenario. Checks
//! append human-readable messages; a checkpoint drains the list and turns any
//! entries into a single [`SoftAssertionError`].

use super::AssertionResult;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A single assertion failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionFailure {
    /// Message describing the failure
    pub message: String,
    /// Index of this failure in the scenario
    pub index: usize,
}

impl AssertionFailure {
    /// Create a new assertion failure
    #[must_use]
    pub fn new(message: impl Into<String>, index: usize) -> Self {
        Self {
            message: message.into(),
            index,
        }
    }
}

/// Soft assertion collector owned by one scenario.
///
/// ## Example
///
/// ```
/// use status_e2e::SoftErrors;
///
/// let mut errors = SoftErrors::new();
/// errors.check(true, "join button is shown");
/// errors.append("Community title is not shown");
/// let err = errors.verify_no_errors().unwrap_err();
/// assert_eq!(err.count, 1);
/// assert!(errors.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct SoftErrors {
    failures: Vec<AssertionFailure>,
    assertion_count: usize,
    failed_count: usize,
}

impl SoftErrors {
    /// Create an empty list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure message as-is
    pub fn append(&mut self, message: impl Into<String>) {
        self.assertion_count += 1;
        self.record_failure(message.into());
    }

    /// Record `message` unless `condition` holds. Returns `condition`.
    pub fn check(&mut self, condition: bool, message: impl Into<String>) -> bool {
        self.assertion_count += 1;
        if !condition {
            self.record_failure(message.into());
        }
        condition
    }

    /// Record a failure when two values differ
    pub fn check_eq<T: PartialEq + Debug>(&mut self, actual: &T, expected: &T, message: &str) -> bool {
        self.assertion_count += 1;
        let equal = actual == expected;
        if !equal {
            self.record_failure(format!("{message}: expected {expected:?}, got {actual:?}"));
        }
        equal
    }

    /// Record a failed [`AssertionResult`], prefixed with `context`
    pub fn record(&mut self, result: &AssertionResult, context: &str) -> bool {
        self.assertion_count += 1;
        if !result.passed {
            self.record_failure(format!("{context}: {}", result.message));
        }
        result.passed
    }

    fn record_failure(&mut self, message: String) {
        self.failed_count += 1;
        tracing::warn!(index = self.failures.len(), "{message}");
        let failure = AssertionFailure::new(message, self.failures.len());
        self.failures.push(failure);
    }

    /// Recorded failures
    #[must_use]
    pub fn failures(&self) -> &[AssertionFailure] {
        &self.failures
    }

    /// Recorded failure messages, in order
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.message.as_str()).collect()
    }

    /// Number of recorded failures
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Whether no failure has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total number of checks performed
    #[must_use]
    pub const fn assertion_count(&self) -> usize {
        self.assertion_count
    }

    /// Remove and return every recorded message
    pub fn drain(&mut self) -> Vec<String> {
        self.failures.drain(..).map(|f| f.message).collect()
    }

    /// Checkpoint: drain the list, failing if anything was recorded
    ///
    /// # Errors
    ///
    /// Returns every drained message when the list was not empty
    pub fn verify_no_errors(&mut self) -> Result<(), SoftAssertionError> {
        let messages = self.drain();
        if messages.is_empty() {
            Ok(())
        } else {
            Err(SoftAssertionError::new(messages))
        }
    }

    /// Checks performed so far. Failures drained by a checkpoint still count.
    #[must_use]
    pub fn summary(&self) -> AssertionSummary {
        AssertionSummary {
            total: self.assertion_count,
            passed: self.assertion_count.saturating_sub(self.failed_count),
            failed: self.failed_count,
        }
    }
}

/// Summary of assertion results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionSummary {
    /// Total assertions checked
    pub total: usize,
    /// Assertions that passed
    pub passed: usize,
    /// Assertions that failed
    pub failed: usize,
}

/// Aggregated soft assertion failures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftAssertionError {
    /// All failure messages
    pub failures: Vec<String>,
    /// Number of failed assertions
    pub count: usize,
}

impl SoftAssertionError {
    /// Create a new error from failure messages
    #[must_use]
    pub fn new(failures: Vec<String>) -> Self {
        let count = failures.len();
        Self { failures, count }
    }
}

impl std::fmt::Display for SoftAssertionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} assertion(s) failed:", self.count)?;
        for (i, failure) in self.failures.iter().enumerate() {
            writeln!(f, "  {}. {failure}", i + 1)?;
        }
        Ok(())
    }
}

impl std::error::Error for SoftAssertionError {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod collect_tests {
        use super::*;

        #[test]
        fn test_new_is_empty() {
            let errors = SoftErrors::new();
            assert!(errors.is_empty());
            assert_eq!(errors.assertion_count(), 0);
        }

        #[test]
        fn test_check_returns_condition() {
            let mut errors = SoftErrors::new();
            assert!(errors.check(true, "fine"));
            assert!(!errors.check(false, "Join button is not shown"));
            assert_eq!(errors.messages(), vec!["Join button is not shown"]);
            assert_eq!(errors.assertion_count(), 2);
        }

        #[test]
        fn test_check_eq_message() {
            let mut errors = SoftErrors::new();
            let _ = errors.check_eq(&"Closed", &"Open", "Community title");
            assert_eq!(
                errors.messages(),
                vec!["Community title: expected \"Open\", got \"Closed\""]
            );
        }

        #[test]
        fn test_record_result() {
            let mut errors = SoftErrors::new();
            let _ = errors.record(&AssertionResult::fail("expected 'a' to end with 'b'"), "Profile");
            assert_eq!(errors.messages(), vec!["Profile: expected 'a' to end with 'b'"]);
        }

        #[test]
        fn test_summary() {
            let mut errors = SoftErrors::new();
            let _ = errors.check(true, "a");
            let _ = errors.check(false, "b");
            let summary = errors.summary();
            assert_eq!(summary.total, 2);
            assert_eq!(summary.passed, 1);
            assert_eq!(summary.failed, 1);
        }

        #[test]
        fn test_summary_survives_checkpoint() {
            let mut errors = SoftErrors::new();
            let _ = errors.check_eq(&"Closed", &"Open", "Community title");
            let _ = errors.check(true, "join button");
            assert!(errors.verify_no_errors().is_err());
            let summary = errors.summary();
            assert_eq!((summary.total, summary.passed, summary.failed), (2, 1, 1));
        }
    }

    mod verify_tests {
        use super::*;

        #[test]
        fn test_verify_empty_ok() {
            assert!(SoftErrors::new().verify_no_errors().is_ok());
        }

        #[test]
        fn test_verify_drains() {
            let mut errors = SoftErrors::new();
            errors.append("first");
            errors.append("second");
            let err = errors.verify_no_errors().unwrap_err();
            assert_eq!(err.count, 2);
            assert_eq!(err.failures, vec!["first", "second"]);
            assert!(errors.is_empty());
            assert!(errors.verify_no_errors().is_ok());
        }

        #[test]
        fn test_display_lists_failures() {
            let err = SoftAssertionError::new(vec!["a".into(), "b".into()]);
            assert_eq!(err.to_string(), "2 assertion(s) failed:\n  1. a\n  2. b\n");
        }
    }

    proptest! {
        #[test]
        fn prop_n_failures_yield_n_messages(outcomes in proptest::collection::vec(any::<bool>(), 0..40)) {
            let mut errors = SoftErrors::new();
            for (i, ok) in outcomes.iter().enumerate() {
                let _ = errors.check(*ok, format!("check {i}"));
            }
            let failed = outcomes.iter().filter(|ok| !**ok).count();
            match errors.verify_no_errors() {
                Ok(()) => prop_assert_eq!(failed, 0),
                Err(err) => {
                    prop_assert_eq!(err.count, failed);
                    prop_assert_eq!(err.failures.len(), failed);
                }
            }
            prop_assert!(errors.is_empty());
        }
    }
}
