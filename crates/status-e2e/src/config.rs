//! Run configuration: where the devices are and how patient to be.

use crate::result::{E2eError, E2eResult};
use crate::wait::{DEFAULT_ELEMENT_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL_MS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment override for [`E2eConfig::appium_url`]
pub const ENV_APPIUM_URL: &str = "STATUS_E2E_APPIUM_URL";

/// Environment override for [`E2eConfig::app_package`]
pub const ENV_APP_PACKAGE: &str = "STATUS_E2E_APP_PACKAGE";

/// Timeouts shared by every element wrapper of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Default element lookup timeout in seconds
    pub element_secs: u64,
    /// Quick presence probe used between retried clicks, in seconds
    pub probe_secs: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
    /// Long-press hold time in milliseconds
    pub long_press_ms: u64,
    /// Upper bound applied to every wait, in seconds
    pub max_wait_secs: Option<u64>,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            element_secs: DEFAULT_ELEMENT_TIMEOUT_SECS,
            probe_secs: 1,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            long_press_ms: 1500,
            max_wait_secs: None,
        }
    }
}

impl Timeouts {
    /// Timeouts for driving the in-memory device: single probes, short polls
    #[must_use]
    pub const fn instant() -> Self {
        Self {
            element_secs: 0,
            probe_secs: 0,
            poll_interval_ms: 1,
            long_press_ms: 0,
            max_wait_secs: Some(0),
        }
    }

    /// Clamp a requested wait to `max_wait_secs`
    #[must_use]
    pub const fn clamp(&self, seconds: u64) -> u64 {
        match self.max_wait_secs {
            Some(cap) if cap < seconds => cap,
            _ => seconds,
        }
    }

    /// Long-press hold time
    #[must_use]
    pub const fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }
}

/// Top-level configuration, usually loaded from `status-e2e.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct E2eConfig {
    /// Appium server base URL
    pub appium_url: String,
    /// Android package of the app under test
    pub app_package: String,
    /// Capabilities shared by every device
    pub capabilities: BTreeMap<String, serde_json::Value>,
    /// Per-device capability overrides, in device order
    pub devices: Vec<BTreeMap<String, serde_json::Value>>,
    /// Element timeouts
    pub timeouts: Timeouts,
    /// App translation file; the built-in table is used when absent
    pub translations: Option<PathBuf>,
}

impl Default for E2eConfig {
    fn default() -> Self {
        let mut capabilities = BTreeMap::new();
        let _ = capabilities.insert("platformName".to_string(), "Android".into());
        let _ = capabilities.insert("appium:automationName".to_string(), "UiAutomator2".into());
        let _ = capabilities.insert("appium:noReset".to_string(), false.into());
        Self {
            appium_url: "http://127.0.0.1:4723".to_string(),
            app_package: "im.status.ethereum".to_string(),
            capabilities,
            devices: Vec::new(),
            timeouts: Timeouts::default(),
            translations: None,
        }
    }
}

impl E2eConfig {
    /// Create a default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse YAML, then apply environment overrides and validate
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.with_env_overrides().validated()
    }

    /// Load from a YAML file
    pub fn load(path: &Path) -> E2eResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            E2eError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&yaml)
    }

    /// Set the Appium URL
    #[must_use]
    pub fn with_appium_url(mut self, url: impl Into<String>) -> Self {
        self.appium_url = url.into();
        self
    }

    /// Set the app package
    #[must_use]
    pub fn with_app_package(mut self, package: impl Into<String>) -> Self {
        self.app_package = package.into();
        self
    }

    /// Set timeouts
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Apply `STATUS_E2E_*` environment variables
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_APPIUM_URL) {
            self.appium_url = url;
        }
        if let Some(package) = lookup(ENV_APP_PACKAGE) {
            self.app_package = package;
        }
        self
    }

    /// Reject configurations that cannot drive a device
    pub fn validated(self) -> E2eResult<Self> {
        if !(self.appium_url.starts_with("http://") || self.appium_url.starts_with("https://")) {
            return Err(E2eError::config(format!(
                "appium_url must be an http(s) URL, got '{}'",
                self.appium_url
            )));
        }
        if self.app_package.trim().is_empty() {
            return Err(E2eError::config("app_package must not be empty"));
        }
        if self.timeouts.poll_interval_ms == 0 {
            return Err(E2eError::config("timeouts.poll_interval_ms must be positive"));
        }
        Ok(self)
    }

    /// Capabilities for device `index`: shared ones overlaid with its overrides
    #[must_use]
    pub fn capabilities_for(&self, index: usize) -> BTreeMap<String, serde_json::Value> {
        let mut caps = self.capabilities.clone();
        if let Some(overrides) = self.devices.get(index) {
            caps.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        let _ = caps
            .entry("appium:appPackage".to_string())
            .or_insert_with(|| self.app_package.clone().into());
        caps
    }
}
