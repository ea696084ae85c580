//! Community creation form.

use super::{BaseView, ChatButton, CommunityView, PageObject, ScreenKind};
use crate::element::{BaseElement, Button, EditBox};
use crate::result::E2eResult;
use crate::session::Session;
use std::ops::Deref;

/// Form opened from "create community"
#[derive(Debug, Clone)]
pub struct CreateCommunityView<'s> {
    base: BaseView<'s>,

    /// Community name
    pub community_name_edit_box: EditBox<'s>,
    /// Community description
    pub community_description_edit_box: EditBox<'s>,
    /// Create the community
    pub confirm_create_in_community_button: ChatButton<'s>,
    /// Options menu, holds "import community"
    pub options_button: Button<'s>,
}

impl<'s> CreateCommunityView<'s> {
    /// Build the view
    #[must_use]
    pub fn new(session: &'s Session) -> Self {
        Self {
            base: BaseView::new(session),
            community_name_edit_box: EditBox::by_id(session, "community-name-input"),
            community_description_edit_box: EditBox::by_id(session, "community-description-input"),
            confirm_create_in_community_button: ChatButton::by_id(
                session,
                "create-community-confirm",
                ScreenKind::Community,
            ),
            options_button: Button::by_id(session, "chat-menu-button"),
        }
    }

    /// Type the name and description
    pub fn fill_in(&self, name: &str, description: &str) -> E2eResult<()> {
        self.community_name_edit_box.send_keys(name)?;
        self.community_description_edit_box.send_keys(description)
    }

    /// Submit the form, waiting up to `seconds` for the button
    pub fn confirm(&self, seconds: u64) -> E2eResult<CommunityView<'s>> {
        self.confirm_create_in_community_button
            .wait_and_click(seconds)?;
        self.confirm_create_in_community_button
            .navigate()
            .into_community()
    }
}

impl<'s> Deref for CreateCommunityView<'s> {
    type Target = BaseView<'s>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<'s> PageObject<'s> for CreateCommunityView<'s> {
    fn session(&self) -> &'s Session {
        self.base.session()
    }

    fn kind(&self) -> ScreenKind {
        ScreenKind::CreateCommunity
    }

    fn anchor(&self) -> BaseElement<'s> {
        (*self.community_name_edit_box).clone()
    }
}
