//! Elements and actions shared by every screen.

use super::{BrowserView, ChatView, CommunityView, HomeView, ProfileView, SignInView};
use crate::driver::KEYCODE_HOME;
use crate::element::{BaseElement, Button, EditBox, Text, DEFAULT_CLICK_ATTEMPTS};
use crate::locator::{Locator, Step, TextMatch, XPath};
use crate::result::E2eResult;
use crate::session::Session;

/// Back presses tried before giving up on reaching the home tabs
pub const HOME_NAVIGATION_ATTEMPTS: u32 = 4;

/// Shared chrome: bottom tabs, toasts, sheet buttons and system actions
#[derive(Debug, Clone)]
pub struct BaseView<'s> {
    session: &'s Session,

    /// Chats tab
    pub chats_tab: Button<'s>,
    /// Communities tab
    pub communities_tab: Button<'s>,
    /// Wallet tab
    pub wallet_tab: Button<'s>,
    /// Browser tab
    pub browser_tab: Button<'s>,
    /// Own profile
    pub profile_button: Button<'s>,

    /// Toast message
    pub toast_content_element: BaseElement<'s>,
    /// Generic next button
    pub next_button: Button<'s>,
    /// Generic done button
    pub done_button: Button<'s>,
    /// Generic confirm button
    pub confirm_button: Button<'s>,
    /// Close a sheet or screen
    pub close_button: Button<'s>,
    /// Jump-to shell
    pub jump_to_button: Button<'s>,
    /// Open the share sheet with QR codes
    pub show_qr_code_button: Button<'s>,
    /// Text in the native Android share sheet
    pub sharing_text_native: Text<'s>,
    /// Floating chat screen
    pub chat_floating_screen: BaseElement<'s>,
    /// Floating community screen
    pub community_floating_screen: BaseElement<'s>,
}

impl<'s> BaseView<'s> {
    /// Build the shared elements
    #[must_use]
    pub fn new(session: &'s Session) -> Self {
        Self {
            session,
            chats_tab: Button::by_id(session, "chats-stack-tab"),
            communities_tab: Button::by_id(session, "communities-stack-tab"),
            wallet_tab: Button::by_id(session, "wallet-stack-tab"),
            browser_tab: Button::by_id(session, "browser-stack-tab"),
            profile_button: Button::by_id(session, "open-profile"),
            toast_content_element: BaseElement::by_id(session, "toast-content"),
            next_button: Button::by_id(session, "next-button"),
            done_button: Button::by_id(session, "done-button"),
            confirm_button: Button::by_id(session, "confirm-button"),
            close_button: Button::by_id(session, "close-button"),
            jump_to_button: Button::by_id(session, "jump-to"),
            show_qr_code_button: Button::by_id(session, "show-qr-button"),
            sharing_text_native: Text::new(
                session,
                XPath::any().with("resource-id", TextMatch::Exact, "android:id/content_preview_text"),
            ),
            chat_floating_screen: BaseElement::by_id(session, "chat-floating-screen"),
            community_floating_screen: BaseElement::by_id(session, "community-floating-screen"),
        }
    }

    /// Session this view drives
    #[must_use]
    pub const fn session(&self) -> &'s Session {
        self.session
    }

    /// Log a scenario step on this device
    pub fn just_fyi(&self, message: &str) {
        tracing::info!(device = self.session.number(), "==> {message}");
    }

    /// Element with exactly this text
    #[must_use]
    pub fn element_by_text(&self, text: &str) -> BaseElement<'s> {
        BaseElement::new(self.session, Locator::text(text))
    }

    /// Element whose text contains `text`
    #[must_use]
    pub fn element_by_text_part(&self, text: &str) -> BaseElement<'s> {
        BaseElement::new(self.session, Locator::text_part(text))
    }

    /// Element showing the translation of `key`
    #[must_use]
    pub fn element_by_translation_id(&self, key: &str) -> Button<'s> {
        Button::by_translation(self.session, key)
    }

    /// Text input, first on screen
    #[must_use]
    pub fn first_edit_box(&self) -> EditBox<'s> {
        EditBox::new(self.session, XPath::class("android.widget.EditText"))
    }

    /// Android back button, `times` times
    pub fn click_system_back_button(&self, times: u32) -> E2eResult<()> {
        self.session.info(&format!("Click system back button {times} time(s)"));
        for _ in 0..times {
            self.session.driver().back()?;
        }
        Ok(())
    }

    /// Android home button
    pub fn click_system_home_button(&self) -> E2eResult<()> {
        self.session.info("Press system Home button");
        self.session.driver().press_keycode(KEYCODE_HOME)
    }

    /// Press back until the bottom tabs are visible again
    pub fn navigate_back_to_home_view(&self) -> E2eResult<HomeView<'s>> {
        self.session.info("Navigate back to home view");
        let probe = self.session.timeouts().probe_secs;
        let mut presses = 0;
        while !self.chats_tab.is_displayed(probe)? {
            if presses >= HOME_NAVIGATION_ATTEMPTS {
                return Err(self.session.fail("Could not navigate back to home view"));
            }
            self.session.driver().back()?;
            presses += 1;
        }
        Ok(HomeView::new(self.session))
    }

    /// Tap confirm until `target` shows up
    pub fn confirm_until_presence_of(&self, target: &BaseElement<'_>) -> E2eResult<()> {
        self.confirm_button
            .click_until_presence_of(target, DEFAULT_CLICK_ATTEMPTS)
    }

    /// Kill and relaunch the app, optionally logging back in
    pub fn reopen_app(&self, sign_in: bool, password: &str) -> E2eResult<()> {
        let package = self.session.app_package();
        self.session.info(&format!("Reopening {package}"));
        self.session.driver().terminate_app(package)?;
        self.session.driver().activate_app(package)?;
        if sign_in {
            self.get_sign_in_view().sign_in(password)?;
        }
        Ok(())
    }

    /// Hand a link to the OS as a view intent targeting `app_package`, the
    /// way a link tapped in another app arrives
    pub fn open_link_from_outside_app(&self, link: &str, app_package: &str) -> E2eResult<()> {
        self.session
            .info(&format!("Opening {link} from outside the app for {app_package}"));
        self.session.driver().open_deep_link(link, app_package)
    }

    /// Button whose text starts with `text`
    #[must_use]
    pub fn button_by_text_prefix(&self, text: &str) -> Button<'s> {
        Button::new(
            self.session,
            XPath::root(Step::any().with_text(TextMatch::StartsWith, text)),
        )
    }

    /// Home view on the same session
    #[must_use]
    pub fn get_home_view(&self) -> HomeView<'s> {
        HomeView::new(self.session)
    }

    /// Chat view on the same session
    #[must_use]
    pub fn get_chat_view(&self) -> ChatView<'s> {
        ChatView::new(self.session)
    }

    /// Community view on the same session
    #[must_use]
    pub fn get_community_view(&self) -> CommunityView<'s> {
        CommunityView::new(self.session)
    }

    /// Profile view on the same session
    #[must_use]
    pub fn get_profile_view(&self) -> ProfileView<'s> {
        ProfileView::new(self.session)
    }

    /// Sign-in view on the same session
    #[must_use]
    pub fn get_sign_in_view(&self) -> SignInView<'s> {
        SignInView::new(self.session)
    }

    /// Browser view on the same session
    #[must_use]
    pub fn get_browser_view(&self) -> BrowserView<'s> {
        BrowserView::new(self.session)
    }
}
