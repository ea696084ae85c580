//! Runs the deep-link suite end to end against a scripted in-memory app.
//!
//! The simulated app keeps every screen's nodes on one flat list and only
//! reacts where the flow needs state to change: onboarding, community
//! creation, sending a message, opening links and closing sheets.

use status_e2e::mock::{MockAction, MockDevice, MockNode, MockUi};
use status_e2e::scenarios::deep_links::{
    CHANNEL_NAME, CLOSED_COMMUNITY_NAME, OPEN_COMMUNITY_NAME, PROFILE_URLS, SNT_COMMUNITY_NAME,
};
use status_e2e::scenarios::DeepLinksOneDevice;
use status_e2e::{
    By, CaseOutcome, LinkKind, Session, SessionGroup, StatusLink, Step, SuiteRunner, TextMatch,
    Timeouts, XPath, KEYCODE_ENTER,
};
use std::sync::{Arc, Mutex};

const OPEN_LINK: &str = "https://status.app/c/G00AAGS#zQ3shOpenCommunityKey0000000000000000000000000open01";
const CLOSED_LINK: &str = "https://status.app/c/G00AAGT#zQ3shClosedCommunityKey00000000000000000000000closed";
const SNT_LINK: &str = "https://status.app/c/G00AAGU#zQ3shSntCommunityKey00000000000000000000000000snt001";

/// Profiles whose display name the app already knows
const KNOWN_PROFILES: [(&str, &str); 2] = [
    ("zQ3shcFXYnGXxJZnsMThziUNMwyA5uGLp58bLGmfb3qaWD1F6", "TestUserE2E"),
    ("zQ3shsKnV5HJMWJR61c6dssWzHszdbLfBoMF1gcLtSQAYdw2d", "Restored desktop"),
];

#[derive(Debug, Default)]
struct Sim {
    home_built: bool,
    pending_link: Option<String>,
    links_in_chat_broken: bool,
    wrong_name_keys: Vec<String>,
}

fn id(value: &str) -> By {
    By::AccessibilityId(value.to_string())
}

fn xpath(path: &XPath) -> By {
    By::XPath(path.as_str().to_string())
}

fn community_entry_path(name: &str) -> XPath {
    XPath::accessibility_id("chat-name-text")
        .with_text(TextMatch::StartsWith, name)
        .parent()
}

fn channel_entry_path(name: &str) -> XPath {
    XPath::accessibility_id("channel-list-item")
        .descendant(Step::any().with_text(TextMatch::StartsWith, &format!("# {name}")))
        .parent()
}

fn message_body_path(text: &str) -> XPath {
    XPath::text(TextMatch::StartsWith, text)
        .ancestor(Step::any().with_id("chat-item"))
        .descendant(Step::any().with_text(TextMatch::StartsWith, text))
}

fn share_text() -> By {
    By::XPath("//*[@resource-id='android:id/content_preview_text']".to_string())
}

fn community_name(key: &str) -> Option<&'static str> {
    [
        (OPEN_LINK, OPEN_COMMUNITY_NAME),
        (CLOSED_LINK, CLOSED_COMMUNITY_NAME),
        (SNT_LINK, SNT_COMMUNITY_NAME),
    ]
    .into_iter()
    .find(|(link, _)| link.ends_with(key))
    .map(|(_, name)| name)
}

fn home_nodes() -> Vec<MockNode> {
    vec![
        MockNode::with_id("chats-stack-tab"),
        MockNode::with_id("communities-stack-tab"),
        MockNode::with_id("browser-stack-tab"),
        MockNode::with_id("new-communities-button"),
        MockNode::with_id("create-open-community"),
        MockNode::with_id("create-closed-community"),
        MockNode::with_id("create-token-gated-community"),
        MockNode::with_id("community-options-for-community"),
        MockNode::with_id("share-community"),
        MockNode::with_id("share-community-link"),
        MockNode::new().resource_id("android:id/content_preview_text"),
        MockNode::with_id("dapp-url-input").editable(),
        MockNode::with_id("contact-name"),
        MockNode::with_id("contact-request-btn").hidden(),
        MockNode::with_id("close-button"),
        MockNode::with_id("community-title"),
        MockNode::with_id("show-request-to-join-screen-button").hidden(),
    ]
}

fn open_link(ui: &mut MockUi, sim: &Sim, url: &str) {
    let Ok(link) = url.parse::<StatusLink>() else {
        return;
    };
    match link.kind {
        LinkKind::Profile => {
            let name = if sim.wrong_name_keys.contains(&link.key) {
                "Unknown".to_string()
            } else {
                KNOWN_PROFILES
                    .iter()
                    .find(|(key, _)| *key == link.key)
                    .map_or_else(|| link.abbreviated_key(), |(_, name)| (*name).to_string())
            };
            ui.set_text(&id("contact-name"), &name);
            ui.set_visible(&id("contact-request-btn"), true);
        }
        LinkKind::Community | LinkKind::Channel => {
            if let Some(name) = community_name(&link.key) {
                ui.set_text(&id("community-title"), name);
                ui.set_visible(&id("show-request-to-join-screen-button"), true);
            }
        }
    }
}

fn close_sheets(ui: &mut MockUi) {
    ui.set_visible(&id("contact-request-btn"), false);
    ui.set_visible(&id("show-request-to-join-screen-button"), false);
}

/// The app as the deep-link suite sees it
fn simulated_app(sim: Sim) -> (MockDevice, Arc<Mutex<Sim>>) {
    let sim = Arc::new(Mutex::new(sim));
    let device = MockDevice::with_nodes([
        MockNode::with_id("new-to-status-button"),
        MockNode::with_id("next-button"),
        MockNode::with_id("password-input").editable(),
        MockNode::with_id("repeat-password-input").editable(),
        MockNode::with_id("confirm-password-button"),
        MockNode::with_id("show-new-profile-options"),
        MockNode::with_id("create-new-profile"),
    ]);

    device.on_click(id("new-to-status-button"), |ui| {
        let _ = ui.add(MockNode::with_id("generate-keys"));
    });
    device.on_click(id("generate-keys"), |ui| {
        let _ = ui.add(MockNode::with_id("profile-title-input").editable());
    });
    let state = Arc::clone(&sim);
    device.on_click(id("confirm-password-button"), move |ui| {
        let mut sim = state.lock().unwrap();
        if !sim.home_built {
            ui.add_all(home_nodes());
            sim.home_built = true;
        }
    });

    device.on_click(id("create-open-community"), |ui| {
        let _ = ui.add(
            MockNode::with_id("chat-name-text")
                .text(OPEN_COMMUNITY_NAME)
                .alias(xpath(&community_entry_path(OPEN_COMMUNITY_NAME))),
        );
        ui.set_text(&share_text(), OPEN_LINK);
    });
    device.on_click(id("create-closed-community"), |ui| {
        ui.set_text(&share_text(), CLOSED_LINK);
    });
    device.on_click(id("create-token-gated-community"), |ui| {
        ui.set_text(&share_text(), SNT_LINK);
    });
    device.on_click(xpath(&community_entry_path(OPEN_COMMUNITY_NAME)), |ui| {
        let _ = ui.add(MockNode::with_id("community-description-text"));
        let _ = ui.add(
            MockNode::with_id("channel-list-item").alias(xpath(&channel_entry_path(CHANNEL_NAME))),
        );
    });
    device.on_click(xpath(&channel_entry_path(CHANNEL_NAME)), |ui| {
        let _ = ui.add(MockNode::with_id("chat-message-input").editable());
        let _ = ui.add(MockNode::with_id("send-message-button"));
    });

    let state = Arc::clone(&sim);
    device.on_click(id("send-message-button"), move |ui| {
        let input = id("chat-message-input");
        let text = ui.text_of(&input).unwrap_or_default();
        ui.set_text(&input, "");
        let _ = ui.add(
            MockNode::with_text(&text)
                .id("chat-message")
                .alias(xpath(&message_body_path(&text))),
        );
        state.lock().unwrap().pending_link = Some(text);
    });
    let state = Arc::clone(&sim);
    device.on_click(id("chat-message"), move |ui| {
        let mut sim = state.lock().unwrap();
        if sim.links_in_chat_broken {
            return;
        }
        if let Some(url) = sim.pending_link.take() {
            open_link(ui, &sim, &url);
        }
    });

    let state = Arc::clone(&sim);
    device.on_key(KEYCODE_ENTER, move |ui| {
        let input = id("dapp-url-input");
        let url = ui.text_of(&input).unwrap_or_default();
        ui.set_text(&input, "");
        open_link(ui, &state.lock().unwrap(), &url);
    });
    device.on_click(id("close-button"), close_sheets);
    device.on_back(close_sheets);

    (device, sim)
}

fn group(device: &MockDevice) -> SessionGroup {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    SessionGroup::new(vec![
        Session::new(1, device.clone()).with_timeouts(Timeouts::instant())
    ])
}

#[test]
fn test_suite_passes_against_a_healthy_app() {
    let (device, _) = simulated_app(Sim::default());
    let group = group(&device);
    let mut suite = DeepLinksOneDevice::new();
    let report = SuiteRunner::new().run(&mut suite, &group);

    assert!(report.all_passed(), "{}", report.render_text());
    assert_eq!(report.passed_count(), 3);
    assert_eq!(report.skipped_count(), 1);
    assert_eq!(suite.open_community_url(), Some(OPEN_LINK));
}

#[test]
fn test_prepare_creates_user_and_opens_channel() {
    let (device, _) = simulated_app(Sim::default());
    let group = group(&device);
    let mut suite = DeepLinksOneDevice::new();
    let _ = SuiteRunner::new()
        .with_filter("no case has this name")
        .run(&mut suite, &group);
    assert!(suite.open_community_url().is_none());

    let report = SuiteRunner::new().with_filter("704613").run(&mut suite, &group);
    assert!(report.all_passed(), "{}", report.render_text());
    let clicks = device.clicks();
    let position = |label: &str| clicks.iter().position(|c| c == label).unwrap();
    assert!(position("new-to-status-button") < position("create-open-community"));
    assert!(position("create-open-community") < position("share-community-link"));
    assert!(position("share-community-link") < position("send-message-button"));
}

#[test]
fn test_universal_links_are_sent_as_messages() {
    let (device, _) = simulated_app(Sim::default());
    let group = group(&device);
    let mut suite = DeepLinksOneDevice::new();
    let _ = SuiteRunner::new().with_filter("704613").run(&mut suite, &group);

    let sent: Vec<String> = device
        .actions()
        .into_iter()
        .filter_map(|a| match a {
            MockAction::SendKeys(target, text) if target == "chat-message-input" => {
                Some(text)
            }
            _ => None,
        })
        .collect();
    let expected: Vec<String> = PROFILE_URLS
        .iter()
        .map(|(url, _)| (*url).to_string())
        .collect();
    assert_eq!(sent, expected);
}

#[test]
fn test_every_unopened_profile_is_reported() {
    let (device, _) = simulated_app(Sim {
        links_in_chat_broken: true,
        ..Sim::default()
    });
    let group = group(&device);
    let mut suite = DeepLinksOneDevice::new();
    let report = SuiteRunner::new().with_filter("704613").run(&mut suite, &group);

    match &report.case(704_613).unwrap().outcome {
        CaseOutcome::Failed { soft } => {
            assert_eq!(soft.len(), 3);
            assert!(soft
                .iter()
                .all(|m| m.starts_with("Profile was not opened by the profile url https://status.app/u")));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn test_wrong_name_fails_only_the_affected_link() {
    let (device, _) = simulated_app(Sim {
        wrong_name_keys: vec!["zQ3shsKnV5HJMWJR61c6dssWzHszdbLfBoMF1gcLtSQAYdw2d".to_string()],
        ..Sim::default()
    });
    let group = group(&device);
    let mut suite = DeepLinksOneDevice::new();
    let report = SuiteRunner::new().run(&mut suite, &group);

    assert_eq!(report.case(704_613).unwrap().outcome, CaseOutcome::Passed);
    assert_eq!(report.case(739_307).unwrap().outcome, CaseOutcome::Passed);
    assert_eq!(
        report.case(702_775).unwrap().outcome,
        CaseOutcome::Failed {
            soft: vec![
                "Profile was not opened by the profile deep link status-app://u/Ow==#zQ3shsKnV5HJMWJR61c6dssWzHszdbLfBoMF1gcLtSQAYdw2d"
                    .to_string()
            ]
        }
    );
}

#[test]
fn test_wrong_name_from_chat_link_names_both_rules() {
    let (device, _) = simulated_app(Sim {
        wrong_name_keys: vec!["zQ3shcFXYnGXxJZnsMThziUNMwyA5uGLp58bLGmfb3qaWD1F6".to_string()],
        ..Sim::default()
    });
    let group = group(&device);
    let mut suite = DeepLinksOneDevice::new();
    let report = SuiteRunner::new().with_filter("704613").run(&mut suite, &group);

    let case = report.case(704_613).unwrap();
    assert_eq!(
        case.outcome,
        CaseOutcome::Failed {
            soft: vec![format!(
                "Incorrect username is shown for profile url {}: 'Unknown' is not 'TestUserE2E' and does not end with 'aWD1F6'",
                PROFILE_URLS[2].0
            )]
        }
    );
    assert_eq!((case.checks.total, case.checks.failed), (3, 1));
}

#[test]
fn test_broken_onboarding_errors_every_case() {
    let (device, _) = simulated_app(Sim::default());
    device.ui().remove(&id("confirm-password-button"));
    let group = group(&device);
    let mut suite = DeepLinksOneDevice::new();
    let report = SuiteRunner::new().run(&mut suite, &group);

    assert_eq!(report.errored_count(), 3);
    assert_eq!(report.skipped_count(), 1);
    for case in report.cases.iter().filter(|c| c.outcome.is_failure()) {
        match &case.outcome {
            CaseOutcome::Errored { fatal, soft } => {
                assert!(fatal.starts_with("prepare_devices failed"));
                assert!(soft.is_empty());
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}

#[test]
fn test_community_links_are_opened_with_the_custom_scheme() {
    let (device, _) = simulated_app(Sim::default());
    let group = group(&device);
    let mut suite = DeepLinksOneDevice::new();
    let report = SuiteRunner::new().with_filter("739307").run(&mut suite, &group);
    assert!(report.all_passed(), "{}", report.render_text());

    let typed: Vec<String> = device
        .actions()
        .into_iter()
        .filter_map(|a| match a {
            MockAction::SendKeys(target, text) if target == "dapp-url-input" => {
                Some(text)
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        typed,
        vec![
            SNT_LINK.replace("https://status.app/", "status-app://"),
            OPEN_LINK.replace("https://status.app/", "status-app://"),
            CLOSED_LINK.replace("https://status.app/", "status-app://"),
        ]
    );
    assert!(device
        .actions()
        .contains(&MockAction::Terminate("im.status.ethereum".to_string())));
}
