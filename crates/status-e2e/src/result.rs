//! Result and error types for status-e2e.

use crate::assertion::SoftAssertionError;
use thiserror::Error;

/// Result type for status-e2e operations
pub type E2eResult<T> = Result<T, E2eError>;

/// Errors that can occur while driving the app
///
/// Everything except [`E2eError::SoftAssertions`] is fatal to the current
/// test step.
#[derive(Debug, Error)]
pub enum E2eError {
    /// A required element was absent after its timeout
    #[error("Element not found after {timeout_ms}ms: {locator}")]
    ElementNotFound {
        /// Rendered locator
        locator: String,
        /// How long the lookup waited
        timeout_ms: u64,
    },

    /// An explicit wait condition never became true
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// What was waited for
        waited_for: String,
    },

    /// Automation driver failure (session lost, HTTP error, bad response)
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// A navigation produced a different screen than the caller asked for
    #[error("Expected {expected} screen, got {actual}")]
    UnexpectedScreen {
        /// Screen the caller wanted
        expected: String,
        /// Screen the navigation table produced
        actual: String,
    },

    /// Translation key not present in the translation table
    #[error("No translation for key '{key}'")]
    MissingTranslation {
        /// Missing key
        key: String,
    },

    /// A link string could not be interpreted
    #[error("Invalid link {link}: {reason}")]
    InvalidLink {
        /// Offending link
        link: String,
        /// Why it was rejected
        reason: String,
    },

    /// A page-object step gave up explicitly
    #[error("Step failed: {message}")]
    StepFailed {
        /// Error message
        message: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Accumulated soft assertion failures, surfaced at a checkpoint
    #[error(transparent)]
    SoftAssertions(#[from] SoftAssertionError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl E2eError {
    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a step failure
    #[must_use]
    pub fn step(message: impl Into<String>) -> Self {
        Self::StepFailed {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error means "the element was not there"
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. })
    }

    /// Whether this error is a wait timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
