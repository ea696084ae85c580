//! Assertions for scenario checks.
//!
//! Stateless helpers produce an [`AssertionResult`]; [`SoftErrors`] collects
//! the failing ones for the current scenario.

mod soft;

pub use soft::{AssertionFailure, AssertionSummary, SoftAssertionError, SoftErrors};

/// Result of an assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
}

impl AssertionResult {
    /// Create a passing assertion result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    /// Create a failing assertion result
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }
}

/// Assertion helpers
pub struct Assertion;

impl Assertion {
    /// Assert a string ends with a suffix
    #[must_use]
    pub fn ends_with(haystack: &str, suffix: &str) -> AssertionResult {
        if haystack.ends_with(suffix) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected '{haystack}' to end with '{suffix}'"))
        }
    }
}
