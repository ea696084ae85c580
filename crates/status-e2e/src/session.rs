//! One device session: a driver plus everything element wrappers need.

use crate::config::{E2eConfig, Timeouts};
use crate::driver::{AutomationDriver, By};
use crate::locator::Locator;
use crate::result::{E2eError, E2eResult};
use crate::translations::Translations;
use crate::wait::WaitOptions;
use std::sync::Arc;

/// A device under test.
///
/// Element handles and page objects borrow the session, so none of them can
/// outlive it. Sessions are driven from one thread at a time.
pub struct Session {
    number: usize,
    driver: Box<dyn AutomationDriver>,
    timeouts: Timeouts,
    translations: Arc<Translations>,
    app_package: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("number", &self.number)
            .field("app_package", &self.app_package)
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Wrap a driver with default timeouts and the built-in translations
    pub fn new(number: usize, driver: impl AutomationDriver + 'static) -> Self {
        Self {
            number,
            driver: Box::new(driver),
            timeouts: Timeouts::default(),
            translations: Arc::new(Translations::builtin()),
            app_package: E2eConfig::default().app_package,
        }
    }

    /// Wrap a driver using the run configuration
    pub fn from_config(
        number: usize,
        driver: Box<dyn AutomationDriver>,
        config: &E2eConfig,
        translations: Arc<Translations>,
    ) -> Self {
        Self {
            number,
            driver,
            timeouts: config.timeouts,
            translations,
            app_package: config.app_package.clone(),
        }
    }

    /// Override timeouts
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Override the translation table
    #[must_use]
    pub fn with_translations(mut self, translations: Arc<Translations>) -> Self {
        self.translations = translations;
        self
    }

    /// Override the app package
    #[must_use]
    pub fn with_app_package(mut self, package: impl Into<String>) -> Self {
        self.app_package = package.into();
        self
    }

    /// Device number within its group (1-based in logs)
    #[must_use]
    pub const fn number(&self) -> usize {
        self.number
    }

    /// The underlying driver
    #[must_use]
    pub fn driver(&self) -> &dyn AutomationDriver {
        self.driver.as_ref()
    }

    /// Session timeouts
    #[must_use]
    pub const fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// Translation table
    #[must_use]
    pub fn translations(&self) -> &Translations {
        &self.translations
    }

    /// Package of the app under test
    #[must_use]
    pub fn app_package(&self) -> &str {
        &self.app_package
    }

    /// Resolve a locator to its wire form
    pub fn resolve(&self, locator: &Locator) -> E2eResult<By> {
        locator.resolve(&self.translations)
    }

    /// Wait options for a timeout in seconds, with the session poll interval
    #[must_use]
    pub const fn wait_options(&self, seconds: u64) -> WaitOptions {
        WaitOptions::secs(self.timeouts.clamp(seconds))
            .with_poll_interval(self.timeouts.poll_interval_ms)
    }

    /// Log a device-level step
    pub fn info(&self, message: &str) {
        tracing::info!(device = self.number, "{message}");
    }

    /// Build a step failure tagged with this device
    #[must_use]
    pub fn fail(&self, message: &str) -> E2eError {
        tracing::error!(device = self.number, "{message}");
        E2eError::step(format!("Device {}: {message}", self.number))
    }

    /// End the remote session
    pub fn quit(&self) -> E2eResult<()> {
        self.info("Quitting session");
        self.driver.quit()
    }
}
