//! Onboarding and login.

use super::{BaseView, HomeView, PageObject, ScreenKind};
use crate::element::{BaseElement, Button, EditBox, DEFAULT_CLICK_ATTEMPTS};
use crate::result::E2eResult;
use crate::session::Session;
use std::ops::Deref;

/// Password used for every test profile
pub const DEFAULT_PASSWORD: &str = "qwerty1234";

/// How long the home tabs may take to appear after onboarding or login
const HOME_LOAD_SECS: u64 = 30;

/// Onboarding, profile creation and login
#[derive(Debug, Clone)]
pub struct SignInView<'s> {
    base: BaseView<'s>,

    /// "I'm new to Status"
    pub new_to_status_button: Button<'s>,
    /// Show existing profiles on the login screen
    pub show_profiles_button: Button<'s>,
    /// Add another profile
    pub plus_profiles_button: Button<'s>,
    /// Create a new profile
    pub create_new_profile_button: Button<'s>,
    /// Generate new keys
    pub generate_keys_button: Button<'s>,
    /// Display name input, also used for group chat names
    pub profile_title_input: EditBox<'s>,
    /// Password input
    pub password_input: EditBox<'s>,
    /// Repeat password input
    pub confirm_password_input: EditBox<'s>,
    /// Confirm the new password
    pub confirm_password_button: Button<'s>,
    /// Skip biometrics and notifications prompts
    pub maybe_later_button: Button<'s>,
    /// Final onboarding step
    pub start_button: Button<'s>,
    /// Log in with the password
    pub sign_in_button: Button<'s>,
}

impl<'s> SignInView<'s> {
    /// Build the view
    #[must_use]
    pub fn new(session: &'s Session) -> Self {
        let button = |id: &str| Button::by_id(session, id);
        let edit_box = |id: &str| EditBox::by_id(session, id);
        Self {
            base: BaseView::new(session),
            new_to_status_button: button("new-to-status-button"),
            show_profiles_button: button("show-profiles"),
            plus_profiles_button: button("show-new-profile-options"),
            create_new_profile_button: button("create-new-profile"),
            generate_keys_button: button("generate-keys"),
            profile_title_input: edit_box("profile-title-input"),
            password_input: edit_box("password-input"),
            confirm_password_input: edit_box("repeat-password-input"),
            confirm_password_button: button("confirm-password-button"),
            maybe_later_button: button("maybe-later-button"),
            start_button: button("welcome-button"),
            sign_in_button: button("login-button"),
        }
    }

    /// Create a profile and land on the home screen.
    ///
    /// `first_user` is false when other profiles already exist on the
    /// device, in which case the flow starts from the profiles list.
    pub fn create_user(&self, username: &str, password: &str, first_user: bool) -> E2eResult<HomeView<'s>> {
        let session = self.session();
        session.info(&format!("Creating new profile '{username}'"));
        let probe = session.timeouts().element_secs;
        if first_user {
            self.new_to_status_button
                .click_until_presence_of(&self.generate_keys_button, DEFAULT_CLICK_ATTEMPTS)?;
        } else {
            if self.show_profiles_button.is_displayed(probe)? {
                self.show_profiles_button.click()?;
            }
            self.plus_profiles_button.click()?;
            self.create_new_profile_button
                .click_until_presence_of(&self.generate_keys_button, DEFAULT_CLICK_ATTEMPTS)?;
        }
        self.generate_keys_button
            .click_until_presence_of(&self.profile_title_input, DEFAULT_CLICK_ATTEMPTS)?;
        self.profile_title_input.clear()?;
        self.profile_title_input.send_keys(username)?;
        self.next_button.click()?;

        self.password_input.send_keys(password)?;
        self.confirm_password_input.send_keys(password)?;
        self.confirm_password_button.click()?;

        // biometrics, then notifications
        for _ in 0..2 {
            if self.maybe_later_button.is_displayed(probe)? {
                self.maybe_later_button.click()?;
            }
        }
        if self.start_button.is_displayed(probe)? {
            self.start_button.click()?;
        }
        let _ = self.chats_tab.wait_for_visibility(HOME_LOAD_SECS)?;
        session.info(&format!("Profile '{username}' is created"));
        Ok(HomeView::new(session))
    }

    /// Log into the last used profile
    pub fn sign_in(&self, password: &str) -> E2eResult<HomeView<'s>> {
        let session = self.session();
        session.info("Signing in");
        let _ = self
            .password_input
            .wait_for_visibility(session.timeouts().element_secs)?;
        self.password_input.send_keys(password)?;
        self.sign_in_button.click()?;
        let _ = self.chats_tab.wait_for_visibility(HOME_LOAD_SECS)?;
        Ok(HomeView::new(session))
    }
}

impl<'s> Deref for SignInView<'s> {
    type Target = BaseView<'s>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<'s> PageObject<'s> for SignInView<'s> {
    fn session(&self) -> &'s Session {
        self.base.session()
    }

    fn kind(&self) -> ScreenKind {
        ScreenKind::SignIn
    }

    fn anchor(&self) -> BaseElement<'s> {
        (*self.password_input).clone()
    }
}
