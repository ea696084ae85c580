//! Deep and universal links on one device.
//!
//! The device signs up once, creates an open community and parks in its
//! `general` channel. Every case starts from there.

use crate::assertion::Assertion;
use crate::element::DEFAULT_CLICK_ATTEMPTS;
use crate::links::{convert_scheme, tail, IdentityCheck, LinkScheme, TAIL_LEN};
use crate::orchestration::{
    Mark, ScenarioCase, ScenarioContext, ScenarioMeta, SessionGroup, SharedDeviceSuite,
};
use crate::result::E2eResult;
use crate::views::{
    BaseView, BrowserView, ChatKind, ChatView, CommunityType, CommunityView, HomeView, ProfileView,
    SignInView, DEFAULT_CHAT_WAIT_SECS, DEFAULT_PASSWORD,
};
use crate::wait::DEFAULT_WAIT_TIMEOUT_SECS;

/// Name of the first profile
pub const USERNAME: &str = "test user";
/// Name of the profile created after the app is reopened
pub const SECOND_USERNAME: &str = "second user";
/// Community created while preparing the device
pub const OPEN_COMMUNITY_NAME: &str = "open community";
/// Closed community created by the community links case
pub const CLOSED_COMMUNITY_NAME: &str = "closed community";
/// Token-gated community created by the community links case
pub const SNT_COMMUNITY_NAME: &str = "SNT community";
/// Channel the device stays in between cases
pub const CHANNEL_NAME: &str = "general";

/// Universal profile links posted into the channel, with the name each
/// profile should show
pub const PROFILE_URLS: [(&str, &str); 3] = [
    (
        "https://status.app/u/G10A4B0JdgwyRww90WXtnP1oNH1ZLQNM0yX0Ja9YyAMjrqSZIYINOHCbFhrnKRAcPGStPxCMJDSZlGCKzmZrJcimHY8BbcXlORrElv_BbQEegnMDPx1g9C5VVNl0fE4y#zQ3shwQPhRuDJSjVGVBnTjCdgXy5i9WQaeVPdGJD6yTarJQSj",
        "zQ3...arJQSj",
    ),
    (
        "https://status.app/u#zQ3shVVxZMwLVEQvuu1KF6h4D2mzVyCC4F4mHLZm5dz5XU1aa",
        "zQ3...5XU1aa",
    ),
    (
        "https://status.app/u/CweACg0KC1Rlc3RVc2VyRTJFAw==#zQ3shcFXYnGXxJZnsMThziUNMwyA5uGLp58bLGmfb3qaWD1F6",
        "TestUserE2E",
    ),
];

/// Custom-scheme profile links opened from the browser. `None` means only
/// the key tail can prove the identity.
pub const PROFILE_DEEP_LINKS: [(&str, Option<&str>); 4] = [
    (
        "status-app://u/G10A4B0JdgwyRww90WXtnP1oNH1ZLQNM0yX0Ja9YyAMjrqSZIYINOHCbFhrnKRAcPGStPxCMJDSZlGCKzmZrJcimHY8BbcXlORrElv_BbQEegnMDPx1g9C5VVNl0fE4y#zQ3shwQPhRuDJSjVGVBnTjCdgXy5i9WQaeVPdGJD6yTarJQSj",
        None,
    ),
    (
        "status-app://u#zQ3shVVxZMwLVEQvuu1KF6h4D2mzVyCC4F4mHLZm5dz5XU1aa",
        None,
    ),
    (
        "status-app://u/Ow==#zQ3shsKnV5HJMWJR61c6dssWzHszdbLfBoMF1gcLtSQAYdw2d",
        Some("Restored desktop"),
    ),
    (
        "status-app://u/CweACg0KC1Rlc3RVc2VyRTJFAw==#zQ3shcFXYnGXxJZnsMThziUNMwyA5uGLp58bLGmfb3qaWD1F6",
        Some("TestUserE2E"),
    ),
];

/// Profile link opened from outside the app
pub const EXTERNAL_PROFILE_URL: &str =
    "https://status.app/u#zQ3shVVxZMwLVEQvuu1KF6h4D2mzVyCC4F4mHLZm5dz5XU1aa";
/// Closed community link opened from outside the app while logged out
pub const EXTERNAL_COMMUNITY_URL: &str =
    "https://status.app/c/Ow==#zQ3shbmfT3hvh4mKa1v6uAjjyztQEroh8Mfn6Ckegjd7LT3XK";

/// Links opened from chat, the browser and other apps
#[derive(Debug, Default)]
pub struct DeepLinksOneDevice {
    open_community_url: Option<String>,
}

impl DeepLinksOneDevice {
    /// Suite with nothing prepared yet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Share link of the open community, once the device is prepared
    #[must_use]
    pub fn open_community_url(&self) -> Option<&str> {
        self.open_community_url.as_deref()
    }

    fn universal_links_from_chat(
        &mut self,
        group: &SessionGroup,
        ctx: &mut ScenarioContext,
    ) -> E2eResult<()> {
        let session = group.device(0)?;
        let channel = ChatView::new(session);
        let check = IdentityCheck::new();

        for (url, name) in PROFILE_URLS {
            channel.just_fyi(&format!("Opening profile '{name}' by the url {url}"));
            channel.chat_message_input.clear()?;
            channel.send_message(url)?;
            let profile = channel
                .chat_element_by_text(url)
                .click_on_link_inside_message_body()?
                .into_profile()?;
            if profile
                .send_contact_request_button
                .is_displayed(DEFAULT_WAIT_TIMEOUT_SECS)?
            {
                let shown = profile.contact_name_text.text()?;
                let _ = ctx.errors.record(
                    &check.verify(&shown, Some(name), url),
                    &format!("Incorrect username is shown for profile url {url}"),
                );
            } else {
                ctx.errors
                    .append(format!("Profile was not opened by the profile url {url}"));
            }
            ProfileView::new(session).close_button.click()?;
        }

        ctx.verify_no_errors()
    }

    fn deep_links_profile(
        &mut self,
        group: &SessionGroup,
        ctx: &mut ScenarioContext,
    ) -> E2eResult<()> {
        let session = group.device(0)?;
        let home = BaseView::new(session).navigate_back_to_home_view()?;
        home.browser_tab.click()?;
        let browser = BrowserView::new(session);
        let check = IdentityCheck::new();

        for (link, name) in PROFILE_DEEP_LINKS {
            ctx.just_fyi(&format!("Opening profile link {link}"));
            let profile = browser.open_link(link)?.into_profile()?;
            let shown = profile.contact_name_text.text()?;
            let name_is_shown = check.matches(&shown, name, link);
            if !profile
                .send_contact_request_button
                .is_displayed(DEFAULT_WAIT_TIMEOUT_SECS)?
                || !name_is_shown
            {
                ctx.errors
                    .append(format!("Profile was not opened by the profile deep link {link}"));
            }
            browser.click_system_back_button(1)?;
        }

        ctx.verify_no_errors()
    }

    fn deep_links_communities(
        &mut self,
        group: &SessionGroup,
        ctx: &mut ScenarioContext,
    ) -> E2eResult<()> {
        let session = group.device(0)?;
        let open_community_url = self
            .open_community_url
            .clone()
            .ok_or_else(|| session.fail("Link to the open community was not copied"))?;

        let home = HomeView::new(session);
        let _ = home.navigate_back_to_home_view()?;
        home.communities_tab.click()?;
        let closed_community_url =
            copy_new_community_link(&home, CommunityType::Closed, CLOSED_COMMUNITY_NAME)?;
        let _ = home.navigate_back_to_home_view()?;
        let snt_community_url =
            copy_new_community_link(&home, CommunityType::TokenGated, SNT_COMMUNITY_NAME)?;

        home.reopen_app(false, DEFAULT_PASSWORD)?;
        let _ = SignInView::new(session).create_user(SECOND_USERNAME, DEFAULT_PASSWORD, false)?;
        home.browser_tab.click()?;

        let custom = |url: &str| convert_scheme(url, LinkScheme::Universal, LinkScheme::Custom);
        let community_links = [
            (SNT_COMMUNITY_NAME, custom(&snt_community_url)),
            (OPEN_COMMUNITY_NAME, custom(&open_community_url)),
            (CLOSED_COMMUNITY_NAME, custom(&closed_community_url)),
        ];
        let browser = BrowserView::new(session);
        let last = community_links.len() - 1;

        for (i, (name, link)) in community_links.iter().enumerate() {
            ctx.just_fyi(&format!("Opening community '{name}' by the link {link}"));
            let community = browser.open_link(link)?.into_community()?;
            let message = format!("Community '{name}' was not requested to join by the deep link {link}");
            if *name != SNT_COMMUNITY_NAME
                && !community.join_button.is_displayed(DEFAULT_WAIT_TIMEOUT_SECS)?
            {
                ctx.errors.append(message);
            } else {
                let title = community.community_title.text()?;
                let _ = ctx.errors.check_eq(&title.as_str(), name, &message);
            }
            if i != last {
                let _ = home.navigate_back_to_home_view()?;
                home.browser_tab.click()?;
            }
        }

        ctx.verify_no_errors()
    }

    fn links_from_other_apps(
        &mut self,
        group: &SessionGroup,
        ctx: &mut ScenarioContext,
    ) -> E2eResult<()> {
        let session = group.device(0)?;
        let home = HomeView::new(session);
        let profile = ProfileView::new(session);
        let community = CommunityView::new(session);
        let app_package = session.driver().current_package()?;

        home.just_fyi("Opening a profile URL from outside the app when user is still logged in");
        home.click_system_home_button()?;
        home.open_link_from_outside_app(EXTERNAL_PROFILE_URL, &app_package)?;
        let message =
            format!("Profile was not opened by the url {EXTERNAL_PROFILE_URL} when user is logged in");
        if profile
            .add_to_contacts_button
            .is_displayed(DEFAULT_WAIT_TIMEOUT_SECS)?
        {
            let shown = profile.default_username_text.text()?;
            let _ = ctx.errors.record(
                &Assertion::ends_with(&shown, tail(EXTERNAL_PROFILE_URL, TAIL_LEN)),
                &message,
            );
        } else {
            ctx.errors.append(message);
        }

        home.just_fyi("Opening a community URL from outside the app when user is logged out");
        session.driver().terminate_app(&app_package)?;
        home.open_link_from_outside_app(EXTERNAL_COMMUNITY_URL, &app_package)?;
        let _ = SignInView::new(session).sign_in(DEFAULT_PASSWORD)?;
        if !community.join_button.is_displayed(DEFAULT_WAIT_TIMEOUT_SECS)? {
            ctx.errors.append(format!(
                "Closed community was not requested to join by the url {EXTERNAL_COMMUNITY_URL}"
            ));
        }

        ctx.verify_no_errors()
    }
}

/// Create a community from the communities tab and copy its share link.
/// Creation usually lands on the community itself; when it does not, the
/// community is opened from the list first.
fn copy_new_community_link(
    home: &HomeView<'_>,
    community_type: CommunityType,
    name: &str,
) -> E2eResult<String> {
    let _ = home.create_community(community_type)?;
    let community = CommunityView::new(home.session());
    if !community
        .community_options_button
        .is_displayed(DEFAULT_WAIT_TIMEOUT_SECS)?
    {
        let _ = home
            .get_chat(name, ChatKind::Community, DEFAULT_CHAT_WAIT_SECS)?
            .click()?;
    }
    community.copy_community_link()
}

impl SharedDeviceSuite for DeepLinksOneDevice {
    fn name(&self) -> &str {
        "deep_links_one_device"
    }

    fn group(&self) -> &str {
        "new_one_1"
    }

    fn device_count(&self) -> usize {
        1
    }

    fn prepare_devices(&mut self, group: &SessionGroup) -> E2eResult<()> {
        let session = group.device(0)?;
        let home = SignInView::new(session).create_user(USERNAME, DEFAULT_PASSWORD, true)?;
        home.communities_tab
            .click_until_presence_of(&home.plus_community_button, DEFAULT_CLICK_ATTEMPTS)?;
        let _ = home.create_community(CommunityType::Open)?;
        let community = home
            .get_chat(OPEN_COMMUNITY_NAME, ChatKind::Community, DEFAULT_CHAT_WAIT_SECS)?
            .click()?
            .into_community()?;
        self.open_community_url = Some(community.copy_community_link()?);
        let _ = community.get_channel(CHANNEL_NAME).click()?.into_chat()?;
        Ok(())
    }

    fn cases(&self) -> Vec<ScenarioCase<Self>> {
        vec![
            ScenarioCase::new(
                ScenarioMeta::new("test_links_open_universal_links_from_chat", 704_613)
                    .with_mark(Mark::Nightly),
                Self::universal_links_from_chat,
            ),
            ScenarioCase::new(
                ScenarioMeta::new("test_links_deep_links_profile", 702_775).with_mark(Mark::Nightly),
                Self::deep_links_profile,
            ),
            ScenarioCase::new(
                ScenarioMeta::new("test_deep_links_communities", 739_307).with_mark(Mark::Nightly),
                Self::deep_links_communities,
            ),
            ScenarioCase::new(
                ScenarioMeta::new("test_links_open_universal_links_from_other_apps", 704_614)
                    .with_mark(Mark::Nightly)
                    .skipped("feature not ready"),
                Self::links_from_other_apps,
            ),
        ]
    }
}
