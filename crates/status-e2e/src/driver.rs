//! Automation driver seam.
//!
//! Everything below the element wrappers goes through [`AutomationDriver`]:
//! the remote-automation protocol of a real device (see `appium`) or the
//! in-memory [`crate::mock::MockDevice`]. The trait is synchronous; every
//! call blocks the test thread until the device answers.

use crate::result::E2eResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Android `KEYCODE_HOME`
pub const KEYCODE_HOME: u32 = 3;

/// Android `KEYCODE_ENTER`
pub const KEYCODE_ENTER: u32 = 66;

/// Wire form of a locator, as sent to the driver
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum By {
    /// `accessibility id` strategy
    AccessibilityId(String),
    /// `xpath` strategy
    XPath(String),
}

impl By {
    /// W3C/Appium strategy name
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::AccessibilityId(_) => "accessibility id",
            Self::XPath(_) => "xpath",
        }
    }

    /// Strategy argument
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::AccessibilityId(v) | Self::XPath(v) => v,
        }
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy(), self.value())
    }
}

/// Opaque element id handed out by the driver.
///
/// Only valid until the screen changes; wrappers re-resolve instead of
/// keeping these around.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef(pub String);

impl ElementRef {
    /// Wrap a driver element id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Driver element id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Remote automation of one device session
pub trait AutomationDriver: Send {
    /// All elements currently matching `by` (empty when none)
    fn find_elements(&self, by: &By) -> E2eResult<Vec<ElementRef>>;

    /// Whether the element is rendered and visible
    fn is_displayed(&self, element: &ElementRef) -> E2eResult<bool>;

    /// Tap the element
    fn click(&self, element: &ElementRef) -> E2eResult<()>;

    /// Type into an editable element
    fn send_keys(&self, element: &ElementRef, text: &str) -> E2eResult<()>;

    /// Clear an editable element
    fn clear(&self, element: &ElementRef) -> E2eResult<()>;

    /// Rendered text of the element
    fn text(&self, element: &ElementRef) -> E2eResult<String>;

    /// Raw attribute value (`checked`, `content-desc`, ...), `None` when unset
    fn attribute(&self, element: &ElementRef, name: &str) -> E2eResult<Option<String>>;

    /// Press and hold the element
    fn long_press(&self, element: &ElementRef, duration: Duration) -> E2eResult<()>;

    /// System back button
    fn back(&self) -> E2eResult<()>;

    /// Android key event, e.g. [`KEYCODE_ENTER`]
    fn press_keycode(&self, keycode: u32) -> E2eResult<()>;

    /// Hand a URL to the OS so it is routed to `package`
    fn open_deep_link(&self, url: &str, package: &str) -> E2eResult<()>;

    /// Package currently in the foreground
    fn current_package(&self) -> E2eResult<String>;

    /// Kill the app
    fn terminate_app(&self, package: &str) -> E2eResult<()>;

    /// Bring the app to the foreground, launching it if needed
    fn activate_app(&self, package: &str) -> E2eResult<()>;

    /// End the remote session
    fn quit(&self) -> E2eResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_strategy_names() {
        assert_eq!(By::AccessibilityId("x".into()).strategy(), "accessibility id");
        assert_eq!(By::XPath("//*".into()).strategy(), "xpath");
    }

    #[test]
    fn test_by_display() {
        assert_eq!(
            By::XPath("//*[@text='hi']".into()).to_string(),
            "xpath: //*[@text='hi']"
        );
    }

    #[test]
    fn test_element_ref() {
        let el = ElementRef::new("abc-1");
        assert_eq!(el.id(), "abc-1");
    }
}
