//! Profile sheet of another user, plus the photo picker.

use super::{BaseView, PageObject, ScreenKind};
use crate::element::{BaseElement, Button, EditBox, Text};
use crate::locator::{Locator, TextMatch, XPath};
use crate::result::E2eResult;
use crate::session::Session;
use std::ops::Deref;

/// Profile screen
#[derive(Debug, Clone)]
pub struct ProfileView<'s> {
    base: BaseView<'s>,

    /// Display name, or the abbreviated key when the user has none
    pub contact_name_text: Text<'s>,
    /// Generated three-word name
    pub default_username_text: Text<'s>,

    /// Send a contact request
    pub send_contact_request_button: Button<'s>,
    /// Add to contacts, shown instead of the request button for some users
    pub add_to_contacts_button: Button<'s>,
    /// Message attached to a contact request
    pub contact_request_message_input: EditBox<'s>,
    /// Confirm sending the contact request
    pub confirm_send_contact_request_button: Button<'s>,
    /// Block the user
    pub block_contact_button: Button<'s>,
    /// Remove the user from contacts
    pub remove_from_contacts: Button<'s>,
    /// Edit nickname entry
    pub nickname_button: Button<'s>,
    /// Nickname input
    pub nickname_input_field: EditBox<'s>,
    /// Save the nickname
    pub set_nickname_button: Button<'s>,

    /// Crop the picked photo
    pub crop_photo_button: Button<'s>,
    /// Gallery permission prompt
    pub allow_button: Button<'s>,
}

impl<'s> ProfileView<'s> {
    /// Build the view
    #[must_use]
    pub fn new(session: &'s Session) -> Self {
        let button = |id: &str| Button::by_id(session, id);
        let edit_box = |id: &str| EditBox::by_id(session, id);
        Self {
            base: BaseView::new(session),
            contact_name_text: Text::by_id(session, "contact-name"),
            default_username_text: Text::by_id(session, "default-username"),

            send_contact_request_button: button("contact-request-btn"),
            add_to_contacts_button: button("add-to-contacts-button"),
            contact_request_message_input: edit_box("contact-request-message"),
            confirm_send_contact_request_button: button("send-contact-request"),
            block_contact_button: button("block-user"),
            remove_from_contacts: button("remove-from-contacts"),
            nickname_button: button("edit-nickname"),
            nickname_input_field: edit_box("nickname-input"),
            set_nickname_button: button("set-nickname"),

            crop_photo_button: Button::new(session, Locator::text("Crop")),
            allow_button: Button::new(session, Locator::text("Allow")),
        }
    }

    /// Send a contact request with `message`
    pub fn send_contact_request(&self, message: &str) -> E2eResult<()> {
        self.session().info("Sending contact request from profile");
        self.send_contact_request_button.click()?;
        self.contact_request_message_input.send_keys(message)?;
        self.confirm_send_contact_request_button.click()
    }

    /// Set a nickname for the user
    pub fn set_nickname(&self, nickname: &str) -> E2eResult<()> {
        self.session().info(&format!("Setting nickname: {nickname}"));
        self.nickname_button.click()?;
        self.nickname_input_field.send_keys(nickname)?;
        self.set_nickname_button.click()
    }

    /// Pick `file_name` from the gallery
    pub fn select_photo_from_gallery(&self, file_name: &str) -> E2eResult<()> {
        let session = self.session();
        session.info(&format!("Selecting '{file_name}' from gallery"));
        if self.allow_button.is_displayed(session.timeouts().probe_secs)? {
            self.allow_button.click()?;
        }
        Button::new(
            session,
            XPath::any().with("content-desc", TextMatch::Contains, file_name),
        )
        .wait_and_click(session.timeouts().element_secs)
    }
}

impl<'s> Deref for ProfileView<'s> {
    type Target = BaseView<'s>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<'s> PageObject<'s> for ProfileView<'s> {
    fn session(&self) -> &'s Session {
        self.base.session()
    }

    fn kind(&self) -> ScreenKind {
        ScreenKind::Profile
    }

    fn anchor(&self) -> BaseElement<'s> {
        (*self.contact_name_text).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Timeouts;
    use crate::mock::{MockAction, MockDevice, MockNode};

    #[test]
    fn test_select_photo_grants_permission() {
        let device = MockDevice::with_nodes([
            MockNode::with_text("Allow"),
            MockNode::with_id("Photo taken on sauce_logo.png"),
        ]);
        let session = Session::new(1, device.clone()).with_timeouts(Timeouts::instant());
        ProfileView::new(&session)
            .select_photo_from_gallery("sauce_logo.png")
            .unwrap();
        assert_eq!(device.clicks(), vec!["Allow", "Photo taken on sauce_logo.png"]);
    }

    #[test]
    fn test_send_contact_request() {
        let device = MockDevice::with_nodes([
            MockNode::with_id("contact-request-btn"),
            MockNode::with_id("contact-request-message").editable(),
            MockNode::with_id("send-contact-request"),
        ]);
        let session = Session::new(1, device.clone()).with_timeouts(Timeouts::instant());
        ProfileView::new(&session).send_contact_request("hi").unwrap();
        assert_eq!(
            device.actions(),
            vec![
                MockAction::Click("contact-request-btn".into()),
                MockAction::SendKeys("contact-request-message".into(), "hi".into()),
                MockAction::Click("send-contact-request".into()),
            ]
        );
    }

    #[test]
    fn test_set_nickname() {
        let device = MockDevice::with_nodes([
            MockNode::with_id("edit-nickname"),
            MockNode::with_id("nickname-input").editable(),
            MockNode::with_id("set-nickname"),
        ]);
        let session = Session::new(1, device.clone()).with_timeouts(Timeouts::instant());
        ProfileView::new(&session).set_nickname("bestie").unwrap();
        assert_eq!(device.clicks(), vec!["edit-nickname", "set-nickname"]);
    }

    #[test]
    fn test_contact_name_text() {
        let device = MockDevice::with_nodes([MockNode::with_id("contact-name").text("TestUserE2E")]);
        let session = Session::new(1, device).with_timeouts(Timeouts::instant());
        let view = ProfileView::new(&session);
        assert_eq!(view.contact_name_text.text().unwrap(), "TestUserE2E");
        assert!(view.is_loaded(1).unwrap());
    }
}
