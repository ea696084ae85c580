//! Built-in suites, selectable by name.

pub mod deep_links;

pub use deep_links::DeepLinksOneDevice;

use crate::orchestration::{ScenarioMeta, SessionGroup, SharedDeviceSuite, SuiteReport, SuiteRunner};
use crate::result::E2eError;
use std::fmt;
use std::str::FromStr;

/// Every suite shipped with the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinSuite {
    /// [`DeepLinksOneDevice`]
    DeepLinksOneDevice,
}

impl BuiltinSuite {
    /// All suites
    pub const ALL: [Self; 1] = [Self::DeepLinksOneDevice];

    /// Name used on the command line
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::DeepLinksOneDevice => "deep_links_one_device",
        }
    }

    /// Worker group the suite belongs to
    #[must_use]
    pub fn group(self) -> &'static str {
        match self {
            Self::DeepLinksOneDevice => "new_one_1",
        }
    }

    /// Devices the suite needs
    #[must_use]
    pub fn device_count(self) -> usize {
        match self {
            Self::DeepLinksOneDevice => DeepLinksOneDevice::new().device_count(),
        }
    }

    /// Metadata of every case, in run order
    #[must_use]
    pub fn cases(self) -> Vec<ScenarioMeta> {
        match self {
            Self::DeepLinksOneDevice => DeepLinksOneDevice::new()
                .cases()
                .into_iter()
                .map(|c| c.meta)
                .collect(),
        }
    }

    /// Run a fresh instance of the suite on `group`
    pub fn run(self, runner: &SuiteRunner, group: &SessionGroup) -> SuiteReport {
        match self {
            Self::DeepLinksOneDevice => runner.run(&mut DeepLinksOneDevice::new(), group),
        }
    }
}

impl fmt::Display for BuiltinSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuiltinSuite {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|suite| suite.name() == s)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|s| s.name()).collect();
                E2eError::config(format!("unknown suite '{s}', expected one of: {}", known.join(", ")))
            })
    }
}
