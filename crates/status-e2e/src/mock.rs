//! In-memory device for exercising page objects without an emulator.
//!
//! A [`MockDevice`] holds a flat list of [`MockNode`]s. Lookups match nodes by
//! accessibility id, by explicit locator aliases, or by evaluating
//! single-step XPath expressions such as
//! `//*[@content-desc='x'][starts-with(@text,'y')]`. Scripted reactions
//! mutate the UI when an element is clicked, a deep link is opened or the
//! back button is pressed. Every driver call is recorded in an action log.
//!
//! Cloning a `MockDevice` shares its state, so a test can keep a handle
//! after moving the device into a [`crate::Session`].

use crate::driver::{AutomationDriver, By, ElementRef, KEYCODE_HOME};
use crate::locator::TextMatch;
use crate::result::{E2eError, E2eResult};
use regex::Regex;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::Duration;

/// Launcher package reported after pressing home or `terminate_app()`
pub const LAUNCHER_PACKAGE: &str = "com.google.android.apps.nexuslauncher";

/// Widget class whose checked state flips on click
pub const CHECKBOX_CLASS: &str = "android.widget.CheckBox";

/// Stable id of a node inside one mock UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

/// One element of the mock UI tree
#[derive(Debug, Clone, Default)]
pub struct MockNode {
    /// Accessibility id (`content-desc`)
    pub accessibility_id: Option<String>,
    /// Rendered text
    pub text: String,
    /// Widget class
    pub class: String,
    /// Android resource id
    pub resource_id: Option<String>,
    /// Whether the node is visible
    pub visible: bool,
    /// Whether `send_keys` is accepted
    pub editable: bool,
    /// Checked state of checkboxes and switches
    pub checked: bool,
    aliases: Vec<By>,
    hidden_for_lookups: u32,
    ignored_clicks: u32,
}

impl MockNode {
    /// A visible `android.view.View`
    #[must_use]
    pub fn new() -> Self {
        Self {
            class: "android.view.View".to_string(),
            visible: true,
            ..Self::default()
        }
    }

    /// A node with an accessibility id
    #[must_use]
    pub fn with_id(id: &str) -> Self {
        Self::new().id(id)
    }

    /// A `TextView` with text
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        Self::new().class("android.widget.TextView").text(text)
    }

    /// Set the accessibility id
    #[must_use]
    pub fn id(mut self, id: &str) -> Self {
        self.accessibility_id = Some(id.to_string());
        self
    }

    /// Set the text
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Set the widget class
    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        self.class = class.to_string();
        self
    }

    /// Set the resource id
    #[must_use]
    pub fn resource_id(mut self, id: &str) -> Self {
        self.resource_id = Some(id.to_string());
        self
    }

    /// Make the node present but not visible
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Accept typed text
    #[must_use]
    pub fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    /// Start checked
    #[must_use]
    pub const fn checked(mut self) -> Self {
        self.checked = true;
        self
    }

    /// Also match this exact locator (for structural paths the evaluator
    /// does not understand)
    #[must_use]
    pub fn alias(mut self, by: By) -> Self {
        self.aliases.push(by);
        self
    }

    /// Shorthand for an XPath alias
    #[must_use]
    pub fn alias_xpath(self, path: &str) -> Self {
        self.alias(By::XPath(path.to_string()))
    }

    /// Stay unfindable for the first `lookups` matching queries
    #[must_use]
    pub const fn appears_after(mut self, lookups: u32) -> Self {
        self.hidden_for_lookups = lookups;
        self
    }

    /// Swallow the first `clicks` taps
    #[must_use]
    pub const fn ignores_clicks(mut self, clicks: u32) -> Self {
        self.ignored_clicks = clicks;
        self
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        match name {
            "content-desc" => self.accessibility_id.as_deref(),
            "text" => Some(&self.text),
            "class" => Some(&self.class),
            "resource-id" => self.resource_id.as_deref(),
            "checked" => Some(if self.checked { "true" } else { "false" }),
            "displayed" => Some(if self.visible { "true" } else { "false" }),
            _ => None,
        }
    }

    fn label(&self) -> String {
        self.accessibility_id
            .clone()
            .or_else(|| (!self.text.is_empty()).then(|| self.text.clone()))
            .unwrap_or_else(|| self.class.clone())
    }

    fn matches(&self, by: &By) -> bool {
        if self.aliases.contains(by) {
            return true;
        }
        match by {
            By::AccessibilityId(id) => self.accessibility_id.as_deref() == Some(id.as_str()),
            By::XPath(path) => xpath_matches(self, path),
        }
    }
}

/// A driver call observed by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockAction {
    /// Tap on the labelled element
    Click(String),
    /// Text typed into the labelled element
    SendKeys(String, String),
    /// Labelled element cleared
    Clear(String),
    /// Long press on the labelled element
    LongPress(String),
    /// System back
    Back,
    /// Android key event
    KeyCode(u32),
    /// Deep link handed to the OS
    OpenDeepLink(String),
    /// App terminated
    Terminate(String),
    /// App activated
    Activate(String),
    /// Session ended
    Quit,
}

type Reaction = Box<dyn FnMut(&mut MockUi) + Send>;
type LinkReaction = Box<dyn FnMut(&mut MockUi, &str) + Send>;

/// Mutable UI state, handed to scripted reactions
#[derive(Debug)]
pub struct MockUi {
    nodes: Vec<(NodeId, MockNode)>,
    next_id: u64,
    log: Vec<MockAction>,
    foreground: String,
}

impl Default for MockUi {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            next_id: 0,
            log: Vec::new(),
            foreground: "im.status.ethereum".to_string(),
        }
    }
}

impl MockUi {
    /// Add a node, returning its id
    pub fn add(&mut self, node: MockNode) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        self.nodes.push((id, node));
        id
    }

    /// Add several nodes
    pub fn add_all(&mut self, nodes: impl IntoIterator<Item = MockNode>) {
        for node in nodes {
            let _ = self.add(node);
        }
    }

    /// Remove every node matching `by`
    pub fn remove(&mut self, by: &By) {
        self.nodes.retain(|(_, node)| !node.matches(by));
    }

    /// Remove every node
    pub fn clear_screen(&mut self) {
        self.nodes.clear();
    }

    /// Whether any node matches, ignoring visibility and delays
    #[must_use]
    pub fn contains(&self, by: &By) -> bool {
        self.nodes.iter().any(|(_, node)| node.matches(by))
    }

    /// Text of the first node matching `by`
    #[must_use]
    pub fn text_of(&self, by: &By) -> Option<String> {
        self.nodes
            .iter()
            .find(|(_, node)| node.matches(by))
            .map(|(_, node)| node.text.clone())
    }

    /// Set the text of every node matching `by`
    pub fn set_text(&mut self, by: &By, text: &str) {
        for (_, node) in self.nodes.iter_mut().filter(|(_, n)| n.matches(by)) {
            node.text = text.to_string();
        }
    }

    /// Show or hide every node matching `by`
    pub fn set_visible(&mut self, by: &By, visible: bool) {
        for (_, node) in self.nodes.iter_mut().filter(|(_, n)| n.matches(by)) {
            node.visible = visible;
        }
    }

    /// Package in the foreground
    #[must_use]
    pub fn foreground(&self) -> &str {
        &self.foreground
    }

    fn node(&self, element: &ElementRef) -> E2eResult<&MockNode> {
        self.nodes
            .iter()
            .find(|(id, _)| node_ref(*id) == *element)
            .map(|(_, node)| node)
            .ok_or_else(|| stale(element))
    }

    fn node_mut(&mut self, element: &ElementRef) -> E2eResult<&mut MockNode> {
        self.nodes
            .iter_mut()
            .find(|(id, _)| node_ref(*id) == *element)
            .map(|(_, node)| node)
            .ok_or_else(|| stale(element))
    }
}

fn node_ref(id: NodeId) -> ElementRef {
    ElementRef::new(format!("mock-{}", id.0))
}

fn stale(element: &ElementRef) -> E2eError {
    E2eError::ElementNotFound {
        locator: format!("stale element {}", element.id()),
        timeout_ms: 0,
    }
}

/// Scriptable in-memory device
#[derive(Clone, Default)]
pub struct MockDevice {
    ui: Arc<Mutex<MockUi>>,
    click_reactions: Arc<Mutex<Vec<(By, Reaction)>>>,
    link_reactions: Arc<Mutex<Vec<LinkReaction>>>,
    back_reactions: Arc<Mutex<Vec<Reaction>>>,
    key_reactions: Arc<Mutex<Vec<(u32, Reaction)>>>,
}

impl std::fmt::Debug for MockDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDevice")
            .field("ui", &self.ui)
            .finish_non_exhaustive()
    }
}

impl MockDevice {
    /// Empty screen, app in the foreground
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the given nodes on screen
    #[must_use]
    pub fn with_nodes(nodes: impl IntoIterator<Item = MockNode>) -> Self {
        let device = Self::new();
        device.ui().add_all(nodes);
        device
    }

    /// Lock the UI state
    pub fn ui(&self) -> MutexGuard<'_, MockUi> {
        self.ui.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Run `reaction` whenever an element matching `by` is clicked
    pub fn on_click(&self, by: By, reaction: impl FnMut(&mut MockUi) + Send + 'static) {
        lock(&self.click_reactions).push((by, Box::new(reaction)));
    }

    /// Run `reaction` whenever a deep link is opened
    pub fn on_deep_link(&self, reaction: impl FnMut(&mut MockUi, &str) + Send + 'static) {
        lock(&self.link_reactions).push(Box::new(reaction));
    }

    /// Run `reaction` whenever system back is pressed
    pub fn on_back(&self, reaction: impl FnMut(&mut MockUi) + Send + 'static) {
        lock(&self.back_reactions).push(Box::new(reaction));
    }

    /// Run `reaction` whenever `keycode` is pressed
    pub fn on_key(&self, keycode: u32, reaction: impl FnMut(&mut MockUi) + Send + 'static) {
        lock(&self.key_reactions).push((keycode, Box::new(reaction)));
    }

    /// Snapshot of the action log
    #[must_use]
    pub fn actions(&self) -> Vec<MockAction> {
        self.ui().log.clone()
    }

    /// Labels of clicked elements, in order
    #[must_use]
    pub fn clicks(&self) -> Vec<String> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                MockAction::Click(label) => Some(label),
                _ => None,
            })
            .collect()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl AutomationDriver for MockDevice {
    fn find_elements(&self, by: &By) -> E2eResult<Vec<ElementRef>> {
        let mut ui = self.ui();
        let mut found = Vec::new();
        for (id, node) in &mut ui.nodes {
            if !node.matches(by) {
                continue;
            }
            if node.hidden_for_lookups > 0 {
                node.hidden_for_lookups -= 1;
                continue;
            }
            found.push(node_ref(*id));
        }
        Ok(found)
    }

    fn is_displayed(&self, element: &ElementRef) -> E2eResult<bool> {
        Ok(self.ui().node(element)?.visible)
    }

    fn click(&self, element: &ElementRef) -> E2eResult<()> {
        let mut ui = self.ui();
        let node = ui.node_mut(element)?;
        let label = node.label();
        if node.ignored_clicks > 0 {
            node.ignored_clicks -= 1;
            ui.log.push(MockAction::Click(label));
            return Ok(());
        }
        if node.class == CHECKBOX_CLASS {
            node.checked = !node.checked;
        }
        let node = node.clone();
        ui.log.push(MockAction::Click(label));
        let mut reactions = lock(&self.click_reactions);
        for (by, reaction) in reactions.iter_mut() {
            if node.matches(by) {
                reaction(&mut *ui);
            }
        }
        Ok(())
    }

    fn send_keys(&self, element: &ElementRef, text: &str) -> E2eResult<()> {
        let mut ui = self.ui();
        let node = ui.node_mut(element)?;
        if !node.editable {
            return Err(E2eError::driver(format!(
                "element {} is not editable",
                node.label()
            )));
        }
        node.text.push_str(text);
        let label = node.label();
        ui.log.push(MockAction::SendKeys(label, text.to_string()));
        Ok(())
    }

    fn clear(&self, element: &ElementRef) -> E2eResult<()> {
        let mut ui = self.ui();
        let node = ui.node_mut(element)?;
        node.text.clear();
        let label = node.label();
        ui.log.push(MockAction::Clear(label));
        Ok(())
    }

    fn text(&self, element: &ElementRef) -> E2eResult<String> {
        Ok(self.ui().node(element)?.text.clone())
    }

    fn attribute(&self, element: &ElementRef, name: &str) -> E2eResult<Option<String>> {
        Ok(self.ui().node(element)?.attribute(name).map(str::to_string))
    }

    fn long_press(&self, element: &ElementRef, _duration: Duration) -> E2eResult<()> {
        let mut ui = self.ui();
        let label = ui.node(element)?.label();
        ui.log.push(MockAction::LongPress(label));
        Ok(())
    }

    fn back(&self) -> E2eResult<()> {
        let mut ui = self.ui();
        ui.log.push(MockAction::Back);
        for reaction in lock(&self.back_reactions).iter_mut() {
            reaction(&mut *ui);
        }
        Ok(())
    }

    fn press_keycode(&self, keycode: u32) -> E2eResult<()> {
        let mut ui = self.ui();
        ui.log.push(MockAction::KeyCode(keycode));
        if keycode == KEYCODE_HOME {
            ui.foreground = LAUNCHER_PACKAGE.to_string();
        }
        for (code, reaction) in lock(&self.key_reactions).iter_mut() {
            if *code == keycode {
                reaction(&mut *ui);
            }
        }
        Ok(())
    }

    fn open_deep_link(&self, url: &str, package: &str) -> E2eResult<()> {
        let mut ui = self.ui();
        ui.log.push(MockAction::OpenDeepLink(url.to_string()));
        ui.foreground = package.to_string();
        for reaction in lock(&self.link_reactions).iter_mut() {
            reaction(&mut *ui, url);
        }
        Ok(())
    }

    fn current_package(&self) -> E2eResult<String> {
        Ok(self.ui().foreground.clone())
    }

    fn terminate_app(&self, package: &str) -> E2eResult<()> {
        let mut ui = self.ui();
        ui.log.push(MockAction::Terminate(package.to_string()));
        ui.foreground = LAUNCHER_PACKAGE.to_string();
        Ok(())
    }

    fn activate_app(&self, package: &str) -> E2eResult<()> {
        let mut ui = self.ui();
        ui.log.push(MockAction::Activate(package.to_string()));
        ui.foreground = package.to_string();
        Ok(())
    }

    fn quit(&self) -> E2eResult<()> {
        self.ui().log.push(MockAction::Quit);
        Ok(())
    }
}

// =============================================================================
// Single-step XPath evaluation
// =============================================================================

fn step_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^//(\*|[A-Za-z][\w.]*)((?:\[[^\[\]]+\])*)$").expect("valid step regex")
    })
}

fn predicate_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^(?:@([\w-]+)=(?:'([^']*)'|"([^"]*)")|(starts-with|contains)\(@([\w-]+),\s*(?:'([^']*)'|"([^"]*)")\))$"#,
        )
        .expect("valid predicate regex")
    })
}

/// Evaluate `//class[pred][pred]...` against one node. Anything with more
/// than one step, positional predicates or functions other than
/// `starts-with`/`contains` does not match.
fn xpath_matches(node: &MockNode, path: &str) -> bool {
    let Some(caps) = step_regex().captures(path) else {
        return false;
    };
    let class = &caps[1];
    if class != "*" && class != node.class {
        return false;
    }
    let predicates = caps.get(2).map_or("", |m| m.as_str());
    predicates
        .split(']')
        .filter(|p| !p.is_empty())
        .all(|p| predicate_matches(node, p.trim_start_matches('[')))
}

fn predicate_matches(node: &MockNode, predicate: &str) -> bool {
    let Some(caps) = predicate_regex().captures(predicate) else {
        return false;
    };
    let (policy, attr, value) = if let Some(attr) = caps.get(1) {
        let value = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
        (TextMatch::Exact, attr.as_str(), value)
    } else {
        let policy = if &caps[4] == "starts-with" {
            TextMatch::StartsWith
        } else {
            TextMatch::Contains
        };
        let value = caps.get(6).or_else(|| caps.get(7)).map_or("", |m| m.as_str());
        (policy, caps.get(5).map_or("", |m| m.as_str()), value)
    };
    node.attribute(attr)
        .is_some_and(|actual| policy.matches(actual, value))
}
