//! Chat and community screens.

use super::{link_destination, BaseView, ChatElement, ChatKind, PageObject, Screen, ScreenKind};
use crate::element::{BaseElement, Button, EditBox, Text, DEFAULT_CLICK_ATTEMPTS};
use crate::locator::{Step, TextMatch, XPath};
use crate::result::E2eResult;
use crate::session::Session;
use crate::wait::DEFAULT_WAIT_TIMEOUT_SECS;
use std::ops::Deref;

/// Tries to type into the message input when it is re-rendered under us
const SEND_KEYS_ATTEMPTS: u32 = 3;

/// A message in the chat history, found by the start of its text
#[derive(Debug, Clone)]
pub struct ChatMessageElement<'s> {
    container: BaseElement<'s>,
    /// Rendered message text
    pub message_body: Text<'s>,
    message_text: String,
}

impl<'s> ChatMessageElement<'s> {
    /// Message whose text starts with `text`
    #[must_use]
    pub fn new(session: &'s Session, text: &str) -> Self {
        let container = XPath::text(TextMatch::StartsWith, text)
            .ancestor(Step::any().with_id("chat-item"));
        Self {
            container: BaseElement::new(session, container.clone()),
            message_body: Text::new(
                session,
                container.descendant(Step::any().with_text(TextMatch::StartsWith, text)),
            ),
            message_text: text.to_string(),
        }
    }

    /// Text the message was looked up by
    #[must_use]
    pub fn message_text(&self) -> &str {
        &self.message_text
    }

    /// Screen the link in this message leads to
    #[must_use]
    pub fn link_destination(&self) -> ScreenKind {
        link_destination(&self.message_text)
    }

    /// Tap the link rendered inside the message body and return the screen
    /// it leads to
    pub fn click_on_link_inside_message_body(&self) -> E2eResult<Screen<'s>> {
        let session = self.container.session();
        session.info(&format!("Tapping link in message '{}'", self.message_text));
        let element = self.message_body.wait_for_visibility(30)?;
        session.driver().click(&element)?;
        Ok(Screen::open(self.link_destination(), session))
    }
}

impl<'s> Deref for ChatMessageElement<'s> {
    type Target = BaseElement<'s>;

    fn deref(&self) -> &Self::Target {
        &self.container
    }
}

/// 1-1, group or channel chat
#[derive(Debug, Clone)]
pub struct ChatView<'s> {
    base: BaseView<'s>,

    /// Message composer
    pub chat_message_input: EditBox<'s>,
    /// Send the composed message
    pub send_message_button: Button<'s>,
    /// Chat options menu
    pub chat_options: Button<'s>,
    /// Public chat name input
    pub chat_name_editbox: EditBox<'s>,
}

impl<'s> ChatView<'s> {
    /// Build the view
    #[must_use]
    pub fn new(session: &'s Session) -> Self {
        let button = |id: &str| Button::by_id(session, id);
        let edit_box = |id: &str| EditBox::by_id(session, id);
        Self {
            base: BaseView::new(session),
            chat_message_input: edit_box("chat-message-input"),
            send_message_button: button("send-message-button"),
            chat_options: button("chat-menu-button"),
            chat_name_editbox: edit_box("chat-name-input"),
        }
    }

    /// Type and send a message
    pub fn send_message(&self, message: &str) -> E2eResult<()> {
        let session = self.session();
        session.info(&format!("Sending message '{message}'"));
        let _ = self.chat_message_input.wait_for_element(5)?;
        let mut attempt = 1;
        loop {
            match self.chat_message_input.send_keys(message) {
                Ok(()) => break,
                Err(e) if e.is_not_found() && attempt < SEND_KEYS_ATTEMPTS => attempt += 1,
                Err(e) => return Err(e),
            }
        }
        self.send_message_button.click()
    }

    /// Message in the history whose text starts with `text`
    #[must_use]
    pub fn chat_element_by_text(&self, text: &str) -> ChatMessageElement<'s> {
        self.session()
            .info(&format!("Looking for a message by text: {text}"));
        ChatMessageElement::new(self.session(), text)
    }
}

impl<'s> Deref for ChatView<'s> {
    type Target = BaseView<'s>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<'s> PageObject<'s> for ChatView<'s> {
    fn session(&self) -> &'s Session {
        self.base.session()
    }

    fn kind(&self) -> ScreenKind {
        ScreenKind::Chat
    }

    fn anchor(&self) -> BaseElement<'s> {
        (*self.chat_message_input).clone()
    }
}

/// Community overview with its channel list
#[derive(Debug, Clone)]
pub struct CommunityView<'s> {
    base: BaseView<'s>,

    /// Description under the community title
    pub community_description_text: Text<'s>,
    /// Community title
    pub community_title: Text<'s>,
    /// Community options menu
    pub community_options_button: Button<'s>,
    /// "Request to join" on a community the user is not in
    pub join_button: Button<'s>,
    /// Join on the request sheet
    pub join_community_button: Button<'s>,
    /// Password prompt when joining
    pub password_input: EditBox<'s>,
    /// Confirm joining
    pub join_confirm_button: Button<'s>,
    /// Share entry of the options menu
    pub share_community_button: Button<'s>,
    /// Share link entry of the share sheet
    pub share_community_link_button: Button<'s>,
}

impl<'s> CommunityView<'s> {
    /// Build the view
    #[must_use]
    pub fn new(session: &'s Session) -> Self {
        let button = |id: &str| Button::by_id(session, id);
        Self {
            base: BaseView::new(session),
            community_description_text: Text::by_id(session, "community-description-text"),
            community_title: Text::by_id(session, "community-title"),
            community_options_button: button("community-options-for-community"),
            join_button: button("show-request-to-join-screen-button"),
            join_community_button: button("join-community-button"),
            password_input: EditBox::by_id(session, "password-input"),
            join_confirm_button: Button::new(
                session,
                XPath::text(TextMatch::Exact, "Join Community"),
            ),
            share_community_button: button("share-community"),
            share_community_link_button: button("share-community-link"),
        }
    }

    /// Channel entry inside this community
    #[must_use]
    pub fn get_channel(&self, channel_name: &str) -> ChatElement<'s> {
        self.session()
            .info(&format!("Getting  {channel_name} channel element in community"));
        ChatElement::new(self.session(), channel_name, ChatKind::CommunityChannel)
    }

    /// Community link from the native share sheet
    pub fn copy_community_link(&self) -> E2eResult<String> {
        self.session().info("Copying community link");
        self.community_options_button.click()?;
        self.share_community_button.click()?;
        self.share_community_link_button.click()?;
        let link = self.sharing_text_native.text()?;
        self.click_system_back_button(1)?;
        Ok(link)
    }

    /// Request to join, confirming with the account password
    pub fn join_community(&self, password: &str) -> E2eResult<()> {
        self.session().info("Joining community");
        self.join_button
            .click_until_presence_of(&self.join_community_button, DEFAULT_CLICK_ATTEMPTS)?;
        self.join_community_button
            .wait_and_click(DEFAULT_WAIT_TIMEOUT_SECS)?;
        self.password_input.send_keys(password)?;
        self.join_confirm_button.click()
    }
}

impl<'s> Deref for CommunityView<'s> {
    type Target = BaseView<'s>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<'s> PageObject<'s> for CommunityView<'s> {
    fn session(&self) -> &'s Session {
        self.base.session()
    }

    fn kind(&self) -> ScreenKind {
        ScreenKind::Community
    }

    fn anchor(&self) -> BaseElement<'s> {
        (*self.community_description_text).clone()
    }
}
