//! Locators: how a page object names an element on screen.
//!
//! A [`Locator`] is a small tagged value (accessibility id, structural path
//! or translation key). Structural paths are built with [`XPath`] and
//! [`Step`] instead of string interpolation, so the text-matching policy of
//! every predicate ([`TextMatch`]) is explicit and escaping is handled in
//! one place.
//!
//! Locators never hold a reference to a live element: every lookup resolves
//! the locator against the current UI tree.

use crate::driver::By;
use crate::result::E2eResult;
use crate::translations::Translations;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute the Android app exposes accessibility identifiers through
pub const ACCESSIBILITY_ATTR: &str = "content-desc";

/// Attribute holding the rendered text of an element
pub const TEXT_ATTR: &str = "text";

/// How a text predicate compares the element attribute with the needle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextMatch {
    /// Attribute equals the needle
    #[default]
    Exact,
    /// Attribute starts with the needle
    StartsWith,
    /// Attribute contains the needle anywhere
    Contains,
}

impl TextMatch {
    /// Render an XPath predicate body (without brackets) for `@attr`
    #[must_use]
    pub fn predicate(self, attr: &str, value: &str) -> String {
        let literal = xpath_literal(value);
        match self {
            Self::Exact => format!("@{attr}={literal}"),
            Self::StartsWith => format!("starts-with(@{attr},{literal})"),
            Self::Contains => format!("contains(@{attr},{literal})"),
        }
    }

    /// Evaluate the policy against a concrete attribute value
    #[must_use]
    pub fn matches(self, actual: &str, needle: &str) -> bool {
        match self {
            Self::Exact => actual == needle,
            Self::StartsWith => actual.starts_with(needle),
            Self::Contains => actual.contains(needle),
        }
    }
}

/// Quote a string as an XPath 1.0 literal.
///
/// XPath has no escape sequences, so strings holding both quote kinds are
/// split into a `concat()` call.
#[must_use]
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{part}'"))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

/// One location step, e.g. `*[@content-desc='chat-icon']`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Step(String);

impl Step {
    /// Any element: `*`
    #[must_use]
    pub fn any() -> Self {
        Self("*".to_string())
    }

    /// Element of a widget class, e.g. `android.widget.TextView`
    #[must_use]
    pub fn class(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Add an attribute predicate
    #[must_use]
    pub fn with(mut self, attr: &str, policy: TextMatch, value: &str) -> Self {
        push_predicate(&mut self.0, &policy.predicate(attr, value));
        self
    }

    /// Add an exact accessibility-id predicate
    #[must_use]
    pub fn with_id(self, id: &str) -> Self {
        self.with(ACCESSIBILITY_ATTR, TextMatch::Exact, id)
    }

    /// Add a text predicate
    #[must_use]
    pub fn with_text(self, policy: TextMatch, text: &str) -> Self {
        self.with(TEXT_ATTR, policy, text)
    }

    /// Positional predicate (1-based, as in XPath)
    #[must_use]
    pub fn at(mut self, position: usize) -> Self {
        push_predicate(&mut self.0, &position.to_string());
        self
    }

    /// Rendered step
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A structural path, always rooted at the document (`//...`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XPath(String);

impl XPath {
    /// `//step`
    #[must_use]
    pub fn root(step: Step) -> Self {
        Self(format!("//{}", step.0))
    }

    /// `//*`
    #[must_use]
    pub fn any() -> Self {
        Self::root(Step::any())
    }

    /// `//class`
    #[must_use]
    pub fn class(name: &str) -> Self {
        Self::root(Step::class(name))
    }

    /// `//*[@content-desc='id']`
    #[must_use]
    pub fn accessibility_id(id: &str) -> Self {
        Self::any().with_id(id)
    }

    /// `//*[@text='text']` with the given policy
    #[must_use]
    pub fn text(policy: TextMatch, text: &str) -> Self {
        Self::any().with_text(policy, text)
    }

    /// Wrap a hand-written path
    #[must_use]
    pub fn raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Add an attribute predicate to the last step
    #[must_use]
    pub fn with(mut self, attr: &str, policy: TextMatch, value: &str) -> Self {
        push_predicate(&mut self.0, &policy.predicate(attr, value));
        self
    }

    /// Add an exact accessibility-id predicate to the last step
    #[must_use]
    pub fn with_id(self, id: &str) -> Self {
        self.with(ACCESSIBILITY_ATTR, TextMatch::Exact, id)
    }

    /// Add a text predicate to the last step
    #[must_use]
    pub fn with_text(self, policy: TextMatch, text: &str) -> Self {
        self.with(TEXT_ATTR, policy, text)
    }

    /// Require a matching child: `[step]`
    #[must_use]
    pub fn with_child(mut self, step: &Step) -> Self {
        push_predicate(&mut self.0, &step.0);
        self
    }

    /// Require a matching descendant: `[descendant::step]`
    #[must_use]
    pub fn with_descendant(mut self, step: &Step) -> Self {
        push_predicate(&mut self.0, &format!("descendant::{}", step.0));
        self
    }

    /// Positional predicate on the last step: `[n]`
    #[must_use]
    pub fn at(mut self, position: usize) -> Self {
        push_predicate(&mut self.0, &position.to_string());
        self
    }

    /// `//step`
    #[must_use]
    pub fn descendant(mut self, step: Step) -> Self {
        self.0.push_str("//");
        self.0.push_str(&step.0);
        self
    }

    /// `/step`
    #[must_use]
    pub fn child(mut self, step: Step) -> Self {
        self.0.push('/');
        self.0.push_str(&step.0);
        self
    }

    /// `/..`
    #[must_use]
    pub fn parent(mut self) -> Self {
        self.0.push_str("/..");
        self
    }

    /// `/..` repeated `levels` times
    #[must_use]
    pub fn up(self, levels: usize) -> Self {
        (0..levels).fold(self, |path, _| path.parent())
    }

    /// `/ancestor::step`
    #[must_use]
    pub fn ancestor(mut self, step: Step) -> Self {
        self.0.push_str("/ancestor::");
        self.0.push_str(&step.0);
        self
    }

    /// `/following-sibling::step`
    #[must_use]
    pub fn following_sibling(mut self, step: Step) -> Self {
        self.0.push_str("/following-sibling::");
        self.0.push_str(&step.0);
        self
    }

    /// `/preceding-sibling::step`
    #[must_use]
    pub fn preceding_sibling(mut self, step: Step) -> Self {
        self.0.push_str("/preceding-sibling::");
        self.0.push_str(&step.0);
        self
    }

    /// `(path)[n]`: the n-th match of the whole path
    #[must_use]
    pub fn nth(self, position: usize) -> Self {
        Self(format!("({})[{position}]", self.0))
    }

    /// Rendered path
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for XPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn push_predicate(path: &mut String, predicate: &str) {
    path.push('[');
    path.push_str(predicate);
    path.push(']');
}

/// How to find an element. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "by", content = "value")]
pub enum Locator {
    /// App-assigned accessibility identifier
    AccessibilityId(String),
    /// Structural path
    XPath(String),
    /// Translation key, resolved to the rendered English text
    Translation(String),
}

impl Locator {
    /// Locator by accessibility id
    #[must_use]
    pub fn accessibility_id(id: impl Into<String>) -> Self {
        Self::AccessibilityId(id.into())
    }

    /// Locator by translation key
    #[must_use]
    pub fn translation(key: impl Into<String>) -> Self {
        Self::Translation(key.into())
    }

    /// Locator by exact rendered text
    #[must_use]
    pub fn text(text: &str) -> Self {
        XPath::text(TextMatch::Exact, text).into()
    }

    /// Locator by a fragment of the rendered text
    #[must_use]
    pub fn text_part(text: &str) -> Self {
        XPath::text(TextMatch::Contains, text).into()
    }

    /// The accessibility id, for locators built from one
    #[must_use]
    pub fn accessibility_id_value(&self) -> Option<&str> {
        match self {
            Self::AccessibilityId(id) => Some(id),
            _ => None,
        }
    }

    /// Express the locator as a path so child locators can extend it
    pub fn to_xpath(&self, translations: &Translations) -> E2eResult<XPath> {
        Ok(match self {
            Self::AccessibilityId(id) => XPath::accessibility_id(id),
            Self::XPath(path) => XPath::raw(path.clone()),
            Self::Translation(key) => XPath::text(TextMatch::Exact, translations.get(key)?),
        })
    }

    /// Resolve to the wire form the driver understands
    pub fn resolve(&self, translations: &Translations) -> E2eResult<By> {
        Ok(match self {
            Self::AccessibilityId(id) => By::AccessibilityId(id.clone()),
            Self::XPath(path) => By::XPath(path.clone()),
            Self::Translation(_) => By::XPath(self.to_xpath(translations)?.0),
        })
    }
}

impl From<XPath> for Locator {
    fn from(path: XPath) -> Self {
        Self::XPath(path.0)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessibilityId(id) => write!(f, "accessibility id: {id}"),
            Self::XPath(path) => write!(f, "xpath: {path}"),
            Self::Translation(key) => write!(f, "translation: {key}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod text_match_tests {
        use super::*;

        #[test]
        fn test_predicates() {
            assert_eq!(TextMatch::Exact.predicate("text", "hi"), "@text='hi'");
            assert_eq!(
                TextMatch::StartsWith.predicate("text", "hi"),
                "starts-with(@text,'hi')"
            );
            assert_eq!(
                TextMatch::Contains.predicate("content-desc", "hi"),
                "contains(@content-desc,'hi')"
            );
        }

        #[test]
        fn test_matches() {
            assert!(TextMatch::Exact.matches("alice", "alice"));
            assert!(!TextMatch::Exact.matches("alice smith", "alice"));
            assert!(TextMatch::StartsWith.matches("alice smith", "alice"));
            assert!(!TextMatch::StartsWith.matches("bob alice", "alice"));
            assert!(TextMatch::Contains.matches("bob alice", "alice"));
        }
    }

    mod literal_tests {
        use super::*;

        #[test]
        fn test_plain() {
            assert_eq!(xpath_literal("general"), "'general'");
        }

        #[test]
        fn test_single_quote() {
            assert_eq!(xpath_literal("it's"), "\"it's\"");
        }

        #[test]
        fn test_both_quotes() {
            assert_eq!(
                xpath_literal("a'b\"c"),
                "concat('a', \"'\", 'b\"c')"
            );
        }
    }

    mod xpath_tests {
        use super::*;

        #[test]
        fn test_community_chat_element() {
            let path = XPath::accessibility_id("chat-name-text")
                .with_text(TextMatch::StartsWith, "open community")
                .parent();
            assert_eq!(
                path.as_str(),
                "//*[@content-desc='chat-name-text'][starts-with(@text,'open community')]/.."
            );
        }

        #[test]
        fn test_channel_element() {
            let path = XPath::accessibility_id("channel-list-item")
                .descendant(Step::any().with_text(TextMatch::StartsWith, "# general"))
                .parent();
            assert_eq!(
                path.as_str(),
                "//*[@content-desc='channel-list-item']//*[starts-with(@text,'# general')]/.."
            );
        }

        #[test]
        fn test_nth_and_class() {
            let path = XPath::accessibility_id("user-list")
                .descendant(Step::class("android.widget.TextView"))
                .nth(2);
            assert_eq!(
                path.as_str(),
                "(//*[@content-desc='user-list']//android.widget.TextView)[2]"
            );
        }

        #[test]
        fn test_child_and_descendant_predicates() {
            let with_child = XPath::accessibility_id("user-list")
                .with_child(&Step::any().with_text(TextMatch::Contains, "bob"));
            assert_eq!(
                with_child.as_str(),
                "//*[@content-desc='user-list'][*[contains(@text,'bob')]]"
            );

            let with_desc = XPath::accessibility_id("community-card-item").with_descendant(
                &Step::any()
                    .with_id("chat-name-text")
                    .with_text(TextMatch::Exact, "SNT community"),
            );
            assert_eq!(
                with_desc.as_str(),
                "//*[@content-desc='community-card-item'][descendant::*[@content-desc='chat-name-text'][@text='SNT community']]"
            );
        }

        #[test]
        fn test_axes() {
            let path = XPath::text(TextMatch::Contains, "alice")
                .ancestor(Step::any().with_id("activity"));
            assert_eq!(
                path.as_str(),
                "//*[contains(@text,'alice')]/ancestor::*[@content-desc='activity']"
            );
            let up = XPath::text(TextMatch::Exact, "hi").up(2);
            assert_eq!(up.as_str(), "//*[@text='hi']/../..");
            let sib = XPath::text(TextMatch::Exact, "User found")
                .following_sibling(Step::any())
                .child(Step::class("android.widget.TextView").at(1));
            assert_eq!(
                sib.as_str(),
                "//*[@text='User found']/following-sibling::*/android.widget.TextView[1]"
            );
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_resolve_accessibility_id() {
            let tr = Translations::builtin();
            let by = Locator::accessibility_id("new-chat-button").resolve(&tr).unwrap();
            assert_eq!(by, By::AccessibilityId("new-chat-button".to_string()));
        }

        #[test]
        fn test_resolve_translation() {
            let tr = Translations::from_pairs([("select", "Select")]);
            let by = Locator::translation("select").resolve(&tr).unwrap();
            assert_eq!(by, By::XPath("//*[@text='Select']".to_string()));
        }

        #[test]
        fn test_resolve_missing_translation() {
            let tr = Translations::from_pairs([("select", "Select")]);
            assert!(Locator::translation("nope").resolve(&tr).is_err());
        }

        #[test]
        fn test_to_xpath_for_composition() {
            let tr = Translations::builtin();
            let path = Locator::accessibility_id("tab-mention")
                .to_xpath(&tr)
                .unwrap()
                .descendant(Step::any().with_id("notification-dot"));
            assert_eq!(
                path.as_str(),
                "//*[@content-desc='tab-mention']//*[@content-desc='notification-dot']"
            );
        }

        #[test]
        fn test_text_locators() {
            assert_eq!(
                Locator::text("Syncing"),
                Locator::XPath("//*[@text='Syncing']".to_string())
            );
            assert_eq!(
                Locator::text_part("Sync"),
                Locator::XPath("//*[contains(@text,'Sync')]".to_string())
            );
        }

        #[test]
        fn test_display() {
            assert_eq!(
                Locator::accessibility_id("x").to_string(),
                "accessibility id: x"
            );
            assert_eq!(Locator::translation("k").to_string(), "translation: k");
        }
    }
}
