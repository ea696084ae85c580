//! Element wrappers: a locator bound to a session.
//!
//! Every operation resolves the locator against the live UI tree; nothing
//! is cached between calls. Strict operations fail with
//! [`E2eError::ElementNotFound`] or [`E2eError::Timeout`]. The tolerant
//! [`BaseElement::is_displayed`] returns `Ok(false)` instead and only
//! propagates driver failures.

use crate::driver::{By, ElementRef};
use crate::locator::{Locator, XPath};
use crate::result::{E2eError, E2eResult};
use crate::session::Session;
use crate::wait::{poll, wait_until, WaitOptions};
use std::fmt;
use std::ops::Deref;

/// Default number of retried taps for the `click_until_*` helpers
pub const DEFAULT_CLICK_ATTEMPTS: u32 = 4;

/// Seconds to wait for the target after each retried tap
pub const TARGET_WAIT_SECS: u64 = 5;

/// A UI element identified by a locator, possibly not yet on screen
#[derive(Debug, Clone)]
pub struct BaseElement<'s> {
    session: &'s Session,
    locator: Locator,
}

impl<'s> BaseElement<'s> {
    /// Bind a locator to a session
    pub fn new(session: &'s Session, locator: impl Into<Locator>) -> Self {
        Self {
            session,
            locator: locator.into(),
        }
    }

    /// Element by accessibility id
    pub fn by_id(session: &'s Session, id: &str) -> Self {
        Self::new(session, Locator::accessibility_id(id))
    }

    /// Element by translation key
    pub fn by_translation(session: &'s Session, key: &str) -> Self {
        Self::new(session, Locator::translation(key))
    }

    /// Session the element belongs to
    #[must_use]
    pub const fn session(&self) -> &'s Session {
        self.session
    }

    /// The element's locator
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.locator
    }

    /// The locator as a path, for building child locators
    pub fn xpath(&self) -> E2eResult<XPath> {
        self.locator.to_xpath(self.session.translations())
    }

    fn by(&self) -> E2eResult<By> {
        self.session.resolve(&self.locator)
    }

    fn options(&self, seconds: u64) -> WaitOptions {
        self.session.wait_options(seconds)
    }

    fn first(&self, by: &By) -> E2eResult<Option<ElementRef>> {
        Ok(self.session.driver().find_elements(by)?.into_iter().next())
    }

    /// First matching element that reports itself visible. Elements that
    /// went stale between lookup and check count as not visible.
    fn first_visible(&self, by: &By) -> E2eResult<Option<ElementRef>> {
        let driver = self.session.driver();
        for element in driver.find_elements(by)? {
            match driver.is_displayed(&element) {
                Ok(true) => return Ok(Some(element)),
                Ok(false) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    fn not_found(&self, timeout_ms: u64) -> E2eError {
        E2eError::ElementNotFound {
            locator: self.locator.to_string(),
            timeout_ms,
        }
    }

    /// All elements currently matching, without waiting
    pub fn find_elements(&self) -> E2eResult<Vec<ElementRef>> {
        self.session.driver().find_elements(&self.by()?)
    }

    /// Number of elements currently matching
    pub fn count(&self) -> E2eResult<usize> {
        Ok(self.find_elements()?.len())
    }

    /// Wait the session default for the element to be present
    pub fn find_element(&self) -> E2eResult<ElementRef> {
        self.wait_for_element(self.session.timeouts().element_secs)
    }

    /// Wait up to `seconds` for the element to be present (visible or not)
    pub fn wait_for_element(&self, seconds: u64) -> E2eResult<ElementRef> {
        let by = self.by()?;
        let opts = self.options(seconds);
        match poll(&opts, &self.locator.to_string(), || self.first(&by)) {
            Ok(found) => {
                tracing::trace!(
                    device = self.session.number(),
                    locator = %self.locator,
                    attempts = found.attempts,
                    elapsed_ms = u64::try_from(found.elapsed.as_millis()).unwrap_or(u64::MAX),
                    "present"
                );
                Ok(found.value)
            }
            Err(E2eError::Timeout { ms, .. }) => Err(self.not_found(ms)),
            Err(e) => Err(e),
        }
    }

    /// Whether the element is present (visible or not) within `seconds`.
    /// Never fails for an absent element.
    pub fn is_present(&self, seconds: u64) -> E2eResult<bool> {
        match self.wait_for_element(seconds) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Whether the element shows up within `seconds`. Never fails for an
    /// absent element.
    pub fn is_displayed(&self, seconds: u64) -> E2eResult<bool> {
        let by = self.by()?;
        let opts = self.options(seconds);
        match poll(&opts, &self.locator.to_string(), || self.first_visible(&by)) {
            Ok(_) => Ok(true),
            Err(E2eError::Timeout { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Wait up to `seconds` for the element to be visible
    pub fn wait_for_visibility(&self, seconds: u64) -> E2eResult<ElementRef> {
        let by = self.by()?;
        let opts = self.options(seconds);
        tracing::debug!(device = self.session.number(), locator = %self.locator, seconds, "waiting for visibility");
        let found = poll(&opts, &format!("{} to be visible", self.locator), || self.first_visible(&by))?;
        tracing::trace!(
            device = self.session.number(),
            locator = %self.locator,
            attempts = found.attempts,
            elapsed_ms = u64::try_from(found.elapsed.as_millis()).unwrap_or(u64::MAX),
            "visible"
        );
        Ok(found.value)
    }

    /// Wait up to `seconds` for the element to disappear
    pub fn wait_for_invisibility(&self, seconds: u64) -> E2eResult<()> {
        let by = self.by()?;
        let opts = self.options(seconds);
        tracing::debug!(device = self.session.number(), locator = %self.locator, seconds, "waiting for invisibility");
        wait_until(&opts, &format!("{} to disappear", self.locator), || {
            Ok(self.first_visible(&by)?.is_none())
        })
    }

    /// Tap the element
    pub fn click(&self) -> E2eResult<()> {
        let element = self.find_element()?;
        tracing::info!(device = self.session.number(), locator = %self.locator, "tap");
        self.session.driver().click(&element)
    }

    /// Rendered text
    pub fn text(&self) -> E2eResult<String> {
        let element = self.find_element()?;
        let text = self.session.driver().text(&element)?;
        tracing::debug!(device = self.session.number(), locator = %self.locator, text = %text, "read text");
        Ok(text)
    }

    /// Raw attribute value
    pub fn attribute(&self, name: &str) -> E2eResult<Option<String>> {
        let element = self.find_element()?;
        self.session.driver().attribute(&element, name)
    }

    /// Press and hold to open a context menu
    pub fn long_press(&self) -> E2eResult<()> {
        let element = self.find_element()?;
        tracing::info!(device = self.session.number(), locator = %self.locator, "long press");
        self.session
            .driver()
            .long_press(&element, self.session.timeouts().long_press())
    }
}

impl fmt::Display for BaseElement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.locator, f)
    }
}

macro_rules! element_wrapper {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name<'s>(BaseElement<'s>);

        impl<'s> $name<'s> {
            /// Bind a locator to a session
            pub fn new(session: &'s Session, locator: impl Into<Locator>) -> Self {
                Self(BaseElement::new(session, locator))
            }

            /// Element by accessibility id
            pub fn by_id(session: &'s Session, id: &str) -> Self {
                Self(BaseElement::by_id(session, id))
            }

            /// Element by translation key
            pub fn by_translation(session: &'s Session, key: &str) -> Self {
                Self(BaseElement::by_translation(session, key))
            }
        }

        impl<'s> Deref for $name<'s> {
            type Target = BaseElement<'s>;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl<'s> From<BaseElement<'s>> for $name<'s> {
            fn from(element: BaseElement<'s>) -> Self {
                Self(element)
            }
        }

        impl fmt::Display for $name<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

element_wrapper!(
    /// Tappable element with retrying taps
    Button
);
element_wrapper!(
    /// Read-only text element
    Text
);
element_wrapper!(
    /// Editable text field
    EditBox
);
element_wrapper!(
    /// Checkbox or switch
    CheckBox
);

impl Button<'_> {
    /// Wait for visibility, then tap
    pub fn wait_and_click(&self, seconds: u64) -> E2eResult<()> {
        let element = self.wait_for_visibility(seconds)?;
        tracing::info!(device = self.session().number(), locator = %self.locator(), "tap");
        self.session().driver().click(&element)
    }

    /// Tap until `target` shows up, at most `attempts` taps.
    ///
    /// Presence, not visibility, is checked before and after every tap.
    /// Nothing is tapped when `target` is already present. Taps that fail
    /// because this element is gone count as attempts.
    pub fn click_until_presence_of(&self, target: &BaseElement<'_>, attempts: u32) -> E2eResult<()> {
        let session = self.session();
        let probe = session.timeouts().probe_secs;
        tracing::info!(device = session.number(), locator = %self.locator(), target = %target, "tap until present");
        let mut taps = 0;
        while taps < attempts.max(1) {
            if target.is_present(probe)? {
                return Ok(());
            }
            taps += 1;
            match self.click() {
                Ok(()) => {}
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            }
            if target.is_present(TARGET_WAIT_SECS)? {
                return Ok(());
            }
        }
        Err(E2eError::ElementNotFound {
            locator: target.locator().to_string(),
            timeout_ms: session
                .wait_options(TARGET_WAIT_SECS)
                .timeout_ms
                .saturating_mul(u64::from(taps)),
        })
    }

    /// Tap until `target` is gone, at most `attempts` taps
    pub fn click_until_absence_of(&self, target: &BaseElement<'_>, attempts: u32) -> E2eResult<()> {
        let session = self.session();
        let probe = session.timeouts().probe_secs;
        tracing::info!(device = session.number(), locator = %self.locator(), target = %target, "tap until absent");
        let mut taps = 0;
        while target.is_displayed(probe)? {
            if taps >= attempts.max(1) {
                return Err(E2eError::Timeout {
                    ms: session.wait_options(probe).timeout_ms.saturating_mul(u64::from(taps)),
                    waited_for: format!("{target} to disappear"),
                });
            }
            taps += 1;
            match self.click() {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl Text<'_> {
    /// Whether the rendered text starts with `prefix`; `false` when absent
    pub fn starts_with(&self, prefix: &str) -> E2eResult<bool> {
        match self.text() {
            Ok(text) => Ok(text.starts_with(prefix)),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl EditBox<'_> {
    /// Type into the field
    pub fn send_keys(&self, text: &str) -> E2eResult<()> {
        let element = self.find_element()?;
        tracing::info!(device = self.session().number(), locator = %self.locator(), text, "type");
        self.session().driver().send_keys(&element, text)
    }

    /// Clear the field
    pub fn clear(&self) -> E2eResult<()> {
        let element = self.find_element()?;
        self.session().driver().clear(&element)
    }
}

impl CheckBox<'_> {
    /// Whether the box is checked
    pub fn is_checked(&self) -> E2eResult<bool> {
        Ok(self.attribute("checked")?.as_deref() == Some("true"))
    }

    /// Tap until the box is checked
    pub fn enable(&self) -> E2eResult<()> {
        if !self.is_checked()? {
            self.click()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Timeouts;
    use crate::mock::{MockAction, MockDevice, MockNode, CHECKBOX_CLASS};

    fn session(device: &MockDevice) -> Session {
        Session::new(1, device.clone()).with_timeouts(Timeouts::instant())
    }

    mod lookup_tests {
        use super::*;

        #[test]
        fn test_find_element_absent() {
            let device = MockDevice::new();
            let session = session(&device);
            let err = BaseElement::by_id(&session, "missing").find_element().unwrap_err();
            assert!(err.is_not_found());
            assert!(err.to_string().contains("accessibility id: missing"));
        }

        #[test]
        fn test_count() {
            let device = MockDevice::with_nodes([
                MockNode::with_id("user-list"),
                MockNode::with_id("user-list"),
            ]);
            let session = session(&device);
            assert_eq!(BaseElement::by_id(&session, "user-list").count().unwrap(), 2);
        }

        #[test]
        fn test_is_displayed_tolerant_and_idempotent() {
            let device = MockDevice::new();
            let session = session(&device);
            let el = BaseElement::by_id(&session, "toast");
            for _ in 0..3 {
                assert!(!el.is_displayed(5).unwrap());
            }
            let _ = device.ui().add(MockNode::with_id("toast"));
            assert!(el.is_displayed(5).unwrap());
        }

        #[test]
        fn test_hidden_is_not_displayed() {
            let device = MockDevice::with_nodes([MockNode::with_id("sheet").hidden()]);
            let session = session(&device);
            let el = BaseElement::by_id(&session, "sheet");
            assert!(!el.is_displayed(1).unwrap());
            assert!(el.is_present(1).unwrap());
            assert!(el.find_element().is_ok());
            assert!(!BaseElement::by_id(&session, "other").is_present(1).unwrap());
        }

        #[test]
        fn test_polling_waits_for_late_element() {
            let device = MockDevice::with_nodes([MockNode::with_id("late").appears_after(3)]);
            let session = Session::new(1, device.clone()).with_timeouts(Timeouts {
                poll_interval_ms: 1,
                ..Timeouts::default()
            });
            assert!(BaseElement::by_id(&session, "late").is_displayed(2).unwrap());
        }

        #[test]
        fn test_missing_translation_is_fatal() {
            let device = MockDevice::new();
            let session = session(&device);
            let err = BaseElement::by_translation(&session, "no-such-key")
                .is_displayed(1)
                .unwrap_err();
            assert!(matches!(err, E2eError::MissingTranslation { .. }));
        }
    }

    mod wait_tests {
        use super::*;

        #[test]
        fn test_wait_for_visibility_timeout() {
            let device = MockDevice::new();
            let session = session(&device);
            let err = BaseElement::by_id(&session, "x").wait_for_visibility(3).unwrap_err();
            assert!(err.is_timeout());
        }

        #[test]
        fn test_wait_for_invisibility() {
            let device = MockDevice::with_nodes([MockNode::with_id("toast")]);
            let session = session(&device);
            let el = BaseElement::by_id(&session, "toast");
            assert!(el.wait_for_invisibility(1).unwrap_err().is_timeout());
            device.ui().set_visible(&By::AccessibilityId("toast".into()), false);
            el.wait_for_invisibility(1).unwrap();
        }
    }

    mod action_tests {
        use super::*;

        #[test]
        fn test_click_and_text() {
            let device = MockDevice::with_nodes([MockNode::with_id("ok").text("OK")]);
            let session = session(&device);
            let button = Button::by_id(&session, "ok");
            button.click().unwrap();
            assert_eq!(button.text().unwrap(), "OK");
            assert_eq!(device.clicks(), vec!["ok"]);
        }

        #[test]
        fn test_click_absent_fails() {
            let device = MockDevice::new();
            let session = session(&device);
            assert!(Button::by_id(&session, "ok").click().unwrap_err().is_not_found());
        }

        #[test]
        fn test_edit_box() {
            let device = MockDevice::with_nodes([MockNode::with_id("input").editable().text("old")]);
            let session = session(&device);
            let input = EditBox::by_id(&session, "input");
            input.clear().unwrap();
            input.send_keys("hello").unwrap();
            assert_eq!(input.text().unwrap(), "hello");
        }

        #[test]
        fn test_long_press() {
            let device = MockDevice::with_nodes([MockNode::with_id("chat")]);
            let session = session(&device);
            BaseElement::by_id(&session, "chat").long_press().unwrap();
            assert_eq!(device.actions(), vec![MockAction::LongPress("chat".into())]);
        }

        #[test]
        fn test_checkbox() {
            let device = MockDevice::with_nodes([MockNode::with_id("cb").class(CHECKBOX_CLASS)]);
            let session = session(&device);
            let cb = CheckBox::by_id(&session, "cb");
            assert!(!cb.is_checked().unwrap());
            cb.enable().unwrap();
            cb.enable().unwrap();
            assert!(cb.is_checked().unwrap());
            assert_eq!(device.clicks().len(), 1);
        }

        #[test]
        fn test_text_starts_with() {
            let device = MockDevice::with_nodes([MockNode::with_id("name").text("zQ3...arJQSj")]);
            let session = session(&device);
            assert!(Text::by_id(&session, "name").starts_with("zQ3").unwrap());
            assert!(!Text::by_id(&session, "other").starts_with("zQ3").unwrap());
        }
    }

    mod retry_tests {
        use super::*;

        #[test]
        fn test_click_until_presence_retries_swallowed_taps() {
            let device = MockDevice::with_nodes([MockNode::with_id("tab").ignores_clicks(2)]);
            device.on_click(By::AccessibilityId("tab".into()), |ui| {
                let _ = ui.add(MockNode::with_id("plus"));
            });
            let session = session(&device);
            Button::by_id(&session, "tab")
                .click_until_presence_of(&BaseElement::by_id(&session, "plus"), DEFAULT_CLICK_ATTEMPTS)
                .unwrap();
            assert_eq!(device.clicks().len(), 3);
        }

        #[test]
        fn test_click_until_presence_skips_when_present() {
            let device = MockDevice::with_nodes([MockNode::with_id("tab"), MockNode::with_id("plus")]);
            let session = session(&device);
            Button::by_id(&session, "tab")
                .click_until_presence_of(&BaseElement::by_id(&session, "plus"), 2)
                .unwrap();
            assert!(device.clicks().is_empty());
        }

        #[test]
        fn test_click_until_presence_accepts_hidden_target() {
            let device = MockDevice::with_nodes([
                MockNode::with_id("tab"),
                MockNode::with_id("plus").hidden(),
            ]);
            let session = session(&device);
            Button::by_id(&session, "tab")
                .click_until_presence_of(&BaseElement::by_id(&session, "plus"), 2)
                .unwrap();
            assert!(device.clicks().is_empty());
        }

        #[test]
        fn test_click_until_presence_stops_when_hidden_target_appears() {
            let device = MockDevice::with_nodes([MockNode::with_id("tab")]);
            device.on_click(By::AccessibilityId("tab".into()), |ui| {
                let _ = ui.add(MockNode::with_id("plus").hidden());
            });
            let session = session(&device);
            Button::by_id(&session, "tab")
                .click_until_presence_of(&BaseElement::by_id(&session, "plus"), 3)
                .unwrap();
            assert_eq!(device.clicks().len(), 1);
        }

        #[test]
        fn test_click_until_presence_gives_up() {
            let device = MockDevice::with_nodes([MockNode::with_id("tab")]);
            let session = session(&device);
            let err = Button::by_id(&session, "tab")
                .click_until_presence_of(&BaseElement::by_id(&session, "plus"), 3)
                .unwrap_err();
            assert!(err.is_not_found());
            assert_eq!(device.clicks().len(), 3);
        }

        #[test]
        fn test_click_until_absence_of_self() {
            let device = MockDevice::with_nodes([MockNode::with_id("close").ignores_clicks(1)]);
            device.on_click(By::AccessibilityId("close".into()), |ui| {
                ui.remove(&By::AccessibilityId("close".into()));
            });
            let session = session(&device);
            let close = Button::by_id(&session, "close");
            close.click_until_absence_of(&close, DEFAULT_CLICK_ATTEMPTS).unwrap();
            assert_eq!(device.clicks().len(), 2);
        }

        #[test]
        fn test_click_until_absence_gives_up() {
            let device = MockDevice::with_nodes([MockNode::with_id("import")]);
            let session = session(&device);
            let import = Button::by_id(&session, "import");
            assert!(import.click_until_absence_of(&import, 2).unwrap_err().is_timeout());
            assert_eq!(device.clicks().len(), 2);
        }
    }
}
