//! status-e2e: end-to-end UI testing for the Status mobile app
//!
//! Page objects, element wrappers with polling, deep-link checks and
//! multi-device scenarios, driven through Appium or an in-memory device.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                       STATUS-E2E Layers                            │
//! ├────────────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌────────────┐   ┌────────────┐   ┌───────────┐  │
//! │  │ Scenarios  │──►│ Page       │──►│ Element    │──►│ Driver    │  │
//! │  │ + Suites   │   │ Objects    │   │ Wrappers   │   │ (Appium / │  │
//! │  │            │   │ (views)    │   │ (polling)  │   │  Mock)    │  │
//! │  └────────────┘   └────────────┘   └────────────┘   └───────────┘  │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Control only flows left to right. A [`Session`] owns one driver; element
//! handles and views borrow it. Scenarios own a [`SessionGroup`] for the
//! lifetime of a suite and collect soft failures in a [`ScenarioContext`].
//!
//! ```
//! use status_e2e::prelude::*;
//!
//! let device = MockDevice::with_nodes([MockNode::with_id("contact-name").text("zQ3...5XU1aa")]);
//! let session = Session::new(1, device).with_timeouts(Timeouts::instant());
//! let profile = ProfileView::new(&session);
//! let link = "status-app://u#zQ3shVVxZMwLVEQvuu1KF6h4D2mzVyCC4F4mHLZm5dz5XU1aa";
//! let shown = profile.contact_name_text.text()?;
//! assert!(IdentityCheck::new().matches(&shown, None, link));
//! # Ok::<(), E2eError>(())
//! ```

#![warn(missing_docs)]

#[cfg(feature = "appium")]
mod appium;
pub mod assertion;
mod config;
mod driver;
mod element;
pub mod links;
mod locator;
pub mod mock;
pub mod orchestration;
mod result;
pub mod scenarios;
mod session;
mod translations;
pub mod views;
mod wait;

#[cfg(feature = "appium")]
pub use appium::AppiumDriver;
pub use assertion::{
    Assertion, AssertionResult, AssertionSummary, SoftAssertionError, SoftErrors,
};
pub use config::{E2eConfig, Timeouts, ENV_APPIUM_URL, ENV_APP_PACKAGE};
pub use driver::{AutomationDriver, By, ElementRef, KEYCODE_ENTER, KEYCODE_HOME};
pub use element::{
    BaseElement, Button, CheckBox, EditBox, Text, DEFAULT_CLICK_ATTEMPTS, TARGET_WAIT_SECS,
};
pub use links::{convert_scheme, IdentityCheck, LinkKind, LinkScheme, StatusLink, TAIL_LEN};
pub use locator::{xpath_literal, Locator, Step, TextMatch, XPath};
pub use orchestration::{
    CaseOutcome, CaseReport, Mark, ScenarioCase, ScenarioContext, ScenarioMeta, SessionGroup,
    SharedDeviceSuite, SuiteReport, SuiteRunner, TestCaseId,
};
pub use result::{E2eError, E2eResult};
pub use scenarios::BuiltinSuite;
pub use session::Session;
pub use translations::Translations;
pub use wait::{
    poll, wait_until, WaitOptions, WaitResult, DEFAULT_ELEMENT_TIMEOUT_SECS,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_SECS,
};

/// Everything a scenario usually needs
pub mod prelude {
    pub use super::mock::{MockAction, MockDevice, MockNode, MockUi};
    pub use super::views::{
        BaseView, BrowserView, ChatKind, ChatView, CommunityType, CommunityView,
        CreateCommunityView, HomeView, PageObject, ProfileView, Screen, ScreenKind, SignInView,
        DEFAULT_PASSWORD,
    };
    pub use super::{
        convert_scheme, BaseElement, Button, CheckBox, E2eConfig, E2eError, E2eResult, EditBox,
        IdentityCheck, LinkScheme, Locator, Mark, ScenarioContext, ScenarioMeta, Session,
        SessionGroup, SharedDeviceSuite, SoftErrors, StatusLink, SuiteRunner, Text, TextMatch,
        Timeouts, XPath,
    };
}
