//! Home screen: chat list, communities list, activity centre and share tab.

use super::{
    BaseView, ChatButton, ChatView, CommunityView, PageObject, Screen, ScreenKind,
};
use crate::driver::ElementRef;
use crate::element::{BaseElement, Button, CheckBox, EditBox, Text, DEFAULT_CLICK_ATTEMPTS};
use crate::locator::{Step, TextMatch, XPath};
use crate::result::{E2eError, E2eResult};
use crate::session::Session;
use crate::wait::DEFAULT_WAIT_TIMEOUT_SECS;
use std::ops::Deref;
use std::str::FromStr;

/// Chat names are matched on this many leading characters
pub const CHAT_NAME_PREFIX_LEN: usize = 25;

/// How long `get_chat` waits for a chat before looking in the activity centre
pub const DEFAULT_CHAT_WAIT_SECS: u64 = 10;

/// Second chance given to a chat that was not found at first
const CHAT_RETRY_WAIT_SECS: u64 = 20;

/// Push notifications can take a while to arrive
const PUSH_NOTIFICATION_WAIT_SECS: u64 = 60;

/// Upper bound on "Syncing" checks before giving up
const SYNC_MAX_CHECKS: u32 = 60;

fn name_prefix(name: &str) -> String {
    name.chars().take(CHAT_NAME_PREFIX_LEN).collect()
}

/// Which list a chat entry lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChatKind {
    /// 1-1 or group chat on the chats tab
    #[default]
    OneToOne,
    /// Community on the communities tab
    Community,
    /// Channel inside a community
    CommunityChannel,
}

// =============================================================================
// COMPOSITE ELEMENTS
// =============================================================================

/// Entry in a chat, community or channel list
#[derive(Debug, Clone)]
pub struct ChatElement<'s> {
    button: Button<'s>,
    path: XPath,
    username: String,
    kind: ChatKind,
}

impl<'s> ChatElement<'s> {
    /// Entry whose name starts with `username_part`
    #[must_use]
    pub fn new(session: &'s Session, username_part: &str, kind: ChatKind) -> Self {
        let path = match kind {
            ChatKind::CommunityChannel => XPath::accessibility_id("channel-list-item")
                .descendant(
                    Step::any().with_text(TextMatch::StartsWith, &format!("# {username_part}")),
                )
                .parent(),
            ChatKind::Community => XPath::accessibility_id("chat-name-text")
                .with_text(TextMatch::StartsWith, username_part)
                .parent(),
            ChatKind::OneToOne => XPath::accessibility_id("author-primary-name")
                .with_text(TextMatch::StartsWith, username_part)
                .parent(),
        };
        Self {
            button: Button::new(session, path.clone()),
            path,
            username: username_part.to_string(),
            kind,
        }
    }

    /// Name prefix the entry was looked up by
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// List the entry lives in
    #[must_use]
    pub const fn kind(&self) -> ChatKind {
        self.kind
    }

    /// Screen a tap on the entry opens
    #[must_use]
    pub const fn destination(&self) -> ScreenKind {
        match self.kind {
            ChatKind::Community => ScreenKind::Community,
            ChatKind::OneToOne | ChatKind::CommunityChannel => ScreenKind::Chat,
        }
    }

    /// Find the entry, giving it one extra wait before failing
    pub fn find_element(&self) -> E2eResult<ElementRef> {
        match self.button.find_element() {
            Err(e) if e.is_not_found() => {
                let _ = self.button.is_displayed(CHAT_RETRY_WAIT_SECS)?;
                self.button.find_element().map_err(|e| {
                    if e.is_not_found() {
                        self.session()
                            .fail(&format!("Unable to find chat with name {}", self.username))
                    } else {
                        e
                    }
                })
            }
            other => other,
        }
    }

    /// Open the chat, tapping until its content shows up
    pub fn click(&self) -> E2eResult<Screen<'s>> {
        let session = self.session();
        let _ = self.find_element()?;
        let desired: BaseElement<'s> = match self.kind {
            ChatKind::Community => {
                (*CommunityView::new(session).community_description_text).clone()
            }
            ChatKind::OneToOne | ChatKind::CommunityChannel => {
                (*ChatView::new(session).chat_message_input).clone()
            }
        };
        self.button
            .click_until_presence_of(&desired, DEFAULT_CLICK_ATTEMPTS)?;
        Ok(Screen::open(self.destination(), session))
    }

    fn child(&self, path: XPath) -> BaseElement<'s> {
        BaseElement::new(self.session(), path)
    }

    /// Unread counter
    #[must_use]
    pub fn new_messages_counter(&self) -> Text<'s> {
        self.child(
            self.path
                .clone()
                .descendant(Step::any().with_id("new-message-counter"))
                .child(Step::class("android.widget.TextView")),
        )
        .into()
    }

    /// Last message preview
    #[must_use]
    pub fn chat_preview(&self) -> Text<'s> {
        self.child(self.path.clone().descendant(Step::any().with_id("chat-message-text")))
            .into()
    }

    /// Placeholder shown for chats without messages
    #[must_use]
    pub fn no_message_preview(&self) -> Text<'s> {
        self.child(self.path.clone().descendant(Step::any().with_id("no-messages-text")))
            .into()
    }

    /// Grey unread dot of public chats
    #[must_use]
    pub fn new_messages_grey_dot(&self) -> BaseElement<'s> {
        self.child(
            self.path
                .clone()
                .child(Step::any().with_id("unviewed-messages-public")),
        )
    }

    /// Chat avatar
    #[must_use]
    pub fn chat_image(&self) -> BaseElement<'s> {
        BaseElement::by_id(self.session(), "chat-icon")
    }

    /// Unblock action on a blocked contact entry
    #[must_use]
    pub fn profile_unblock_button(&self) -> Button<'s> {
        self.child(self.path.clone().child(Step::any().with_id("Unblock")))
            .into()
    }
}

impl<'s> Deref for ChatElement<'s> {
    type Target = Button<'s>;

    fn deref(&self) -> &Self::Target {
        &self.button
    }
}

/// What to do with a pending contact request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactRequestAction {
    /// Accept an incoming request
    Accept,
    /// Decline an incoming request
    Decline,
    /// Cancel an outgoing request
    Cancel,
}

impl ContactRequestAction {
    const fn accessibility_id(self) -> &'static str {
        match self {
            Self::Accept => "accept-contact-request",
            Self::Decline => "decline-contact-request",
            Self::Cancel => "cancel-contact-request",
        }
    }
}

impl FromStr for ContactRequestAction {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(Self::Accept),
            "decline" => Ok(Self::Decline),
            "cancel" => Ok(Self::Cancel),
            _ => Err(E2eError::step("Illegal option for CR!")),
        }
    }
}

/// Activity centre notification containing some text
#[derive(Debug, Clone)]
pub struct ActivityCenterElement<'s> {
    button: Button<'s>,
    path: XPath,
    chat_name: String,
}

impl<'s> ActivityCenterElement<'s> {
    /// Notification whose text contains `text_part`
    #[must_use]
    pub fn new(session: &'s Session, text_part: &str) -> Self {
        let path = XPath::text(TextMatch::Contains, text_part)
            .ancestor(Step::any().with_id("activity"));
        Self {
            button: Button::new(session, path.clone()),
            path,
            chat_name: text_part.to_string(),
        }
    }

    /// Text the notification was looked up by
    #[must_use]
    pub fn chat_name(&self) -> &str {
        &self.chat_name
    }

    fn descendant(&self, id: &str) -> BaseElement<'s> {
        BaseElement::new(
            self.session(),
            self.path.clone().descendant(Step::any().with_id(id)),
        )
    }

    /// Notification title
    #[must_use]
    pub fn title(&self) -> Text<'s> {
        self.descendant("activity-title").into()
    }

    /// Unread marker
    #[must_use]
    pub fn unread_indicator(&self) -> Button<'s> {
        self.descendant("activity-unread-indicator").into()
    }

    /// Message body
    #[must_use]
    pub fn message_body(&self) -> Button<'s> {
        self.descendant("activity-message-body").into()
    }

    /// Text of the context tag
    pub fn context_tag_text(&self) -> E2eResult<String> {
        BaseElement::new(
            self.session(),
            self.path
                .clone()
                .descendant(Step::any().with_id("context-tag"))
                .child(Step::class("android.widget.TextView")),
        )
        .text()
    }

    /// "Pending" status tag
    #[must_use]
    pub fn pending_status_tag(&self) -> Text<'s> {
        self.descendant("status-tag-pending").into()
    }

    /// Tap one of the contact request actions of this notification
    pub fn handle_contact_request(&self, action: ContactRequestAction) -> E2eResult<()> {
        let session = self.session();
        Button::new(
            session,
            self.path
                .clone()
                .child(Step::any().with_id(action.accessibility_id())),
        )
        .wait_and_click(session.timeouts().element_secs)
    }

    /// Accept the request
    pub fn accept_contact_request(&self) -> E2eResult<()> {
        self.handle_contact_request(ContactRequestAction::Accept)
    }

    /// Decline the request
    pub fn decline_contact_request(&self) -> E2eResult<()> {
        self.handle_contact_request(ContactRequestAction::Decline)
    }

    /// Cancel the outgoing request
    pub fn cancel_contact_request(&self) -> E2eResult<()> {
        self.handle_contact_request(ContactRequestAction::Cancel)
    }
}

impl<'s> Deref for ActivityCenterElement<'s> {
    type Target = Button<'s>;

    fn deref(&self) -> &Self::Target {
        &self.button
    }
}

/// Android push notification with the given text
#[derive(Debug, Clone)]
pub struct PushNotificationElement<'s> {
    button: Button<'s>,
    path: XPath,
    pn_text: String,
}

impl<'s> PushNotificationElement<'s> {
    /// Notification showing exactly `pn_text`
    #[must_use]
    pub fn new(session: &'s Session, pn_text: &str) -> Self {
        let path = XPath::text(TextMatch::Exact, pn_text);
        Self {
            button: Button::new(session, path.clone()),
            path,
            pn_text: pn_text.to_string(),
        }
    }

    /// Text the notification was looked up by
    #[must_use]
    pub fn pn_text(&self) -> &str {
        &self.pn_text
    }

    fn resource(&self, levels: usize, wildcard: bool, id: &str) -> BaseElement<'s> {
        let mut path = self.path.clone().up(levels);
        if wildcard {
            path = path.child(Step::any());
        }
        let path = path.child(Step::any().with("resource-id", TextMatch::Exact, id));
        BaseElement::new(self.session(), path)
    }

    /// Notification icon
    #[must_use]
    pub fn icon(&self) -> BaseElement<'s> {
        self.resource(4, true, "android:id/message_icon")
    }

    /// Sender name
    pub fn username(&self) -> E2eResult<String> {
        self.resource(2, false, "android:id/message_name").text()
    }

    /// Group chat icon
    #[must_use]
    pub fn group_chat_icon(&self) -> BaseElement<'s> {
        self.resource(4, false, "android:id/right_icon_container")
    }
}

impl<'s> Deref for PushNotificationElement<'s> {
    type Target = Button<'s>;

    fn deref(&self) -> &Self::Target {
        &self.button
    }
}

/// Row of the contacts list
#[derive(Debug, Clone)]
pub struct ContactDetailsRow<'s> {
    element: BaseElement<'s>,
    /// Row options
    pub options_button: Button<'s>,
    /// Contact name
    pub username_text: Text<'s>,
}

impl<'s> ContactDetailsRow<'s> {
    /// Row containing `username`, the row at `index` (1-based), or any row
    #[must_use]
    pub fn new(session: &'s Session, username: Option<&str>, index: Option<usize>) -> Self {
        let main = XPath::accessibility_id("user-list");
        let path = match (username, index) {
            (Some(name), _) => {
                main.with_child(&Step::any().with_text(TextMatch::Contains, name))
            }
            (None, Some(index)) => main.at(index),
            (None, None) => main,
        };
        Self {
            element: BaseElement::new(session, path.clone()),
            options_button: Button::new(
                session,
                path.clone()
                    .descendant(Step::class("android.widget.ImageView"))
                    .nth(2),
            ),
            username_text: Text::new(
                session,
                path.descendant(Step::class("android.widget.TextView")).nth(2),
            ),
        }
    }
}

impl<'s> Deref for ContactDetailsRow<'s> {
    type Target = BaseElement<'s>;

    fn deref(&self) -> &Self::Target {
        &self.element
    }
}

/// Mute/unmute entry of a long-press menu, with a caption
#[derive(Debug, Clone)]
pub struct MuteButton<'s> {
    button: Button<'s>,
    id: String,
}

impl<'s> MuteButton<'s> {
    /// Menu entry by accessibility id
    #[must_use]
    pub fn new(session: &'s Session, accessibility_id: &str) -> Self {
        Self {
            button: Button::by_id(session, accessibility_id),
            id: accessibility_id.to_string(),
        }
    }

    fn captions(&self) -> XPath {
        XPath::accessibility_id(&self.id).descendant(Step::class("android.widget.TextView"))
    }

    /// Entry label
    pub fn text(&self) -> E2eResult<String> {
        BaseElement::new(self.session(), self.captions()).text()
    }

    /// "Muted until ..." caption
    pub fn unmute_caption_text(&self) -> E2eResult<String> {
        BaseElement::new(self.session(), self.captions().nth(2)).text()
    }
}

impl<'s> Deref for MuteButton<'s> {
    type Target = Button<'s>;

    fn deref(&self) -> &Self::Target {
        &self.button
    }
}

/// How long to mute a chat for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MutePeriod {
    /// 15 minutes
    For15Mins,
    /// 1 hour
    For1Hour,
    /// 8 hours
    For8Hours,
    /// 1 week
    For1Week,
    /// Until unmuted by hand
    #[default]
    UntilUnmuted,
}

impl MutePeriod {
    /// Translation key of the menu entry
    #[must_use]
    pub const fn translation_key(self) -> &'static str {
        match self {
            Self::For15Mins => "mute-for-15-mins",
            Self::For1Hour => "mute-for-1-hour",
            Self::For8Hours => "mute-for-8-hours",
            Self::For1Week => "mute-for-1-week",
            Self::UntilUnmuted => "mute-till-unmute",
        }
    }
}

/// Info text on the share tab
#[derive(Debug, Clone)]
pub struct ShareQrCodeInfoText<'s>(Text<'s>);

impl<'s> ShareQrCodeInfoText<'s> {
    /// Build the element
    #[must_use]
    pub fn new(session: &'s Session) -> Self {
        Self(Text::by_id(session, "share-qr-code-info-text"))
    }

    /// Shared link or address shown under the QR code
    pub fn text(&self) -> E2eResult<String> {
        BaseElement::new(
            self.0.session(),
            XPath::accessibility_id("share-qr-code-info-text")
                .child(Step::class("android.widget.TextView")),
        )
        .text()
    }
}

impl<'s> Deref for ShareQrCodeInfoText<'s> {
    type Target = Text<'s>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Activity centre tab with an unread dot
#[derive(Debug, Clone)]
pub struct ActivityTabButton<'s>(Button<'s>);

impl<'s> ActivityTabButton<'s> {
    /// Unread dot inside the tab
    pub fn counter(&self) -> E2eResult<BaseElement<'s>> {
        let path = self
            .0
            .xpath()?
            .descendant(Step::any().with_id("notification-dot"));
        Ok(BaseElement::new(self.0.session(), path))
    }
}

impl<'s> Deref for ActivityTabButton<'s> {
    type Target = Button<'s>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Community flavour offered by the "+" sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommunityType {
    /// Anyone can join
    Open,
    /// Joining needs approval
    Closed,
    /// Joining needs tokens
    TokenGated,
}

impl FromStr for CommunityType {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "token-gated" => Ok(Self::TokenGated),
            other => Err(E2eError::step(format!(
                "Incorrect community type is set: {other}"
            ))),
        }
    }
}

/// Form values for creating a community by hand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityOptions {
    /// Community name
    pub name: String,
    /// Community description
    pub description: String,
    /// Upload a thumbnail
    pub set_image: bool,
    /// Gallery file used as thumbnail
    pub file_name: String,
    /// Require approval to join
    pub require_approval: bool,
}

impl CommunityOptions {
    /// Defaults for a community called `name`
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: "some_description".to_string(),
            set_image: false,
            file_name: "sauce_logo.png".to_string(),
            require_approval: true,
        }
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Upload `file_name` as thumbnail
    #[must_use]
    pub fn with_image(mut self, file_name: impl Into<String>) -> Self {
        self.set_image = true;
        self.file_name = file_name.into();
        self
    }

    /// Whether joining requires approval
    #[must_use]
    pub const fn with_require_approval(mut self, require: bool) -> Self {
        self.require_approval = require;
        self
    }
}

// =============================================================================
// HOME VIEW
// =============================================================================

/// Home screen
#[derive(Debug, Clone)]
pub struct HomeView<'s> {
    base: BaseView<'s>,

    /// "+" on the chats tab
    pub plus_button: Button<'s>,
    /// "+" on the communities tab
    pub plus_community_button: Button<'s>,
    /// Chat name in a list entry
    pub chat_name_text: Text<'s>,
    /// Start a 1-1 chat
    pub start_new_chat_button: ChatButton<'s>,
    /// Start a group chat
    pub new_group_chat_button: ChatButton<'s>,
    /// Join a public chat
    pub join_public_chat_button: ChatButton<'s>,
    /// Universal QR scanner
    pub universal_qr_scanner_button: Button<'s>,
    /// Invite friends
    pub invite_friends_button: Button<'s>,
    /// Own account photo on the new chat sheet
    pub my_profile_on_start_new_chat_button: Button<'s>,
    /// Create community entry
    pub communities_button: ChatButton<'s>,
    /// Create an open community
    pub create_open_community_button: ChatButton<'s>,
    /// Create a closed community
    pub create_closed_community_button: ChatButton<'s>,
    /// Create a token-gated community
    pub create_token_gated_community_button: ChatButton<'s>,
    /// Name of a user found by key
    pub user_name_text: Text<'s>,

    /// Notifications bell
    pub notifications_button: Button<'s>,
    /// Unread badge of the activity centre
    pub notifications_unread_badge: BaseElement<'s>,
    /// Open the activity centre
    pub open_activity_center_button: Button<'s>,
    /// Close the activity centre
    pub close_activity_centre: Button<'s>,
    /// Select notifications
    pub notifications_select_button: Button<'s>,
    /// Reject and delete selected notifications
    pub notifications_reject_and_delete_button: Button<'s>,
    /// Accept and add selected notifications
    pub notifications_accept_and_add_button: Button<'s>,
    /// First unchecked checkbox
    pub notifications_select_all: Button<'s>,

    /// Recent chats tab
    pub recent_tab: Button<'s>,
    /// Groups tab
    pub groups_tab: Button<'s>,
    /// Contacts tab
    pub contacts_tab: Button<'s>,
    /// New contact dot
    pub contact_new_badge: Button<'s>,
    /// Pending contact requests entry
    pub pending_contact_request_button: Button<'s>,
    /// Pending contact requests count
    pub pending_contact_request_text: Text<'s>,

    /// Pending communities tab
    pub pending_communities_tab: Button<'s>,
    /// Joined communities tab
    pub joined_communities_tab: Button<'s>,
    /// Opened communities tab
    pub opened_communities_tab: Button<'s>,

    /// Invite friends entry of the chats menu
    pub chats_menu_invite_friends_button: Button<'s>,
    /// Close chat entry of the long-press menu
    pub close_chat_button: Button<'s>,
    /// Confirm closing the chat
    pub confirm_closing_chat_button: Button<'s>,
    /// Clear history entry of the long-press menu
    pub clear_history_button: Button<'s>,
    /// Mute chat entry
    pub mute_chat_button: MuteButton<'s>,
    /// Mute community entry
    pub mute_community_button: MuteButton<'s>,
    /// Unmute community entry
    pub unmute_community_button: MuteButton<'s>,
    /// Mute channel entry
    pub mute_channel_button: MuteButton<'s>,
    /// Mark all as read entry
    pub mark_all_messages_as_read_button: Button<'s>,

    /// "+" for new chats
    pub new_chat_button: Button<'s>,
    /// Discover communities card
    pub discover_communities_button: Button<'s>,
    /// Start a new chat on the bottom sheet
    pub start_a_new_chat_bottom_sheet_button: Button<'s>,
    /// Add a contact on the bottom sheet
    pub add_a_contact_chat_bottom_sheet_button: Button<'s>,
    /// Contact key input on "add a contact"
    pub public_key_edit_box: EditBox<'s>,
    /// Open the profile of a user found by key
    pub view_profile_new_contact_button: ChatButton<'s>,
    /// Create the group chat once members and name are set
    pub create_group_chat_button: ChatButton<'s>,
    /// Leave chat entry of the long-press menu
    pub leave_chat_button: Button<'s>,
    /// Confirm leaving
    pub leave_button: Button<'s>,
    /// Confirm clearing history
    pub clear_button: Button<'s>,

    /// Activity centre "All" tab
    pub all_activity_tab_button: ActivityTabButton<'s>,
    /// Mentions tab
    pub mention_activity_tab_button: ActivityTabButton<'s>,
    /// Replies tab
    pub reply_activity_tab_button: ActivityTabButton<'s>,
    /// Unread filter
    pub activity_unread_filter_button: Button<'s>,
    /// More options
    pub more_options_activity_button: Button<'s>,
    /// Mark all notifications as read
    pub mark_all_read_activity_button: Button<'s>,

    /// Info text on the share tab
    pub share_qr_code_info_text: ShareQrCodeInfoText<'s>,
    /// Link to profile on the share tab
    pub link_to_profile_button: Button<'s>,
    /// Close the share tab
    pub close_share_tab_button: Button<'s>,
    /// QR code image
    pub qr_code_image_element: BaseElement<'s>,
    /// Profile tab of the share sheet
    pub share_profile_tab_button: Button<'s>,
    /// Wallet tab of the share sheet
    pub share_wallet_tab_button: Button<'s>,
    /// Wallet account avatar
    pub account_avatar: BaseElement<'s>,
    /// Account name next to the profile link
    pub account_name_text: Text<'s>,
    /// Copy the shared link
    pub share_link_to_profile_button: Button<'s>,

    /// Card on the discover communities screen
    pub community_card_item: BaseElement<'s>,
}

impl<'s> HomeView<'s> {
    /// Build the view
    #[must_use]
    pub fn new(session: &'s Session) -> Self {
        let button = |id: &str| Button::by_id(session, id);
        let chat_button = |id: &str, to: ScreenKind| ChatButton::by_id(session, id, to);
        Self {
            base: BaseView::new(session),
            plus_button: button("new-chat-button"),
            plus_community_button: button("new-communities-button"),
            chat_name_text: Text::by_id(session, "chat-name-text"),
            start_new_chat_button: chat_button("start-1-1-chat-button", ScreenKind::Chat),
            new_group_chat_button: chat_button("start-group-chat-button", ScreenKind::Chat),
            join_public_chat_button: chat_button("join-public-chat-button", ScreenKind::Chat),
            universal_qr_scanner_button: button("universal-qr-scanner"),
            invite_friends_button: button("invite-friends-button"),
            my_profile_on_start_new_chat_button: Button::new(
                session,
                XPath::accessibility_id("current-account-photo"),
            ),
            communities_button: chat_button("create-community", ScreenKind::CreateCommunity),
            create_open_community_button: chat_button("create-open-community", ScreenKind::Community),
            create_closed_community_button: chat_button(
                "create-closed-community",
                ScreenKind::Community,
            ),
            create_token_gated_community_button: chat_button(
                "create-token-gated-community",
                ScreenKind::Community,
            ),
            user_name_text: Text::new(
                session,
                XPath::text(TextMatch::Exact, "User found")
                    .following_sibling(Step::any())
                    .child(Step::class("android.widget.TextView").at(1)),
            ),

            notifications_button: button("notifications-button"),
            notifications_unread_badge: BaseElement::by_id(session, "activity-center-unread-count"),
            open_activity_center_button: button("open-activity-center-button"),
            close_activity_centre: button("close-activity-center"),
            notifications_select_button: Button::by_translation(session, "select"),
            notifications_reject_and_delete_button: button("reject-and-delete-activity-center"),
            notifications_accept_and_add_button: button("accept-and-add-activity-center"),
            notifications_select_all: Button::new(
                session,
                XPath::class("android.widget.CheckBox")
                    .with_id("checkbox-off")
                    .nth(1),
            ),

            recent_tab: button("tab-recent"),
            groups_tab: button("tab-groups"),
            contacts_tab: button("tab-contacts"),
            contact_new_badge: button("notification-dot"),
            pending_contact_request_button: button("open-activity-center-contact-requests"),
            pending_contact_request_text: Text::new(
                session,
                XPath::accessibility_id("pending-contact-requests-count")
                    .child(Step::class("android.widget.TextView")),
            ),

            pending_communities_tab: button("pending-tab"),
            joined_communities_tab: button("joined-tab"),
            opened_communities_tab: button("opened-tab"),

            chats_menu_invite_friends_button: button("chats-menu-invite-friends-button"),
            close_chat_button: button("close-chat"),
            confirm_closing_chat_button: button("Confirm"),
            clear_history_button: button("clear-history"),
            mute_chat_button: MuteButton::new(session, "mute-chat"),
            mute_community_button: MuteButton::new(session, "mute-community"),
            unmute_community_button: MuteButton::new(session, "unmute-community"),
            mute_channel_button: MuteButton::new(session, "chat-toggle-muted"),
            mark_all_messages_as_read_button: button("mark-as-read"),

            new_chat_button: button("new-chat-button"),
            discover_communities_button: button("communities-home-discover-card"),
            start_a_new_chat_bottom_sheet_button: button("start-a-new-chat"),
            add_a_contact_chat_bottom_sheet_button: button("add-a-contact"),
            public_key_edit_box: EditBox::by_id(session, "enter-contact-code-input"),
            view_profile_new_contact_button: chat_button("view-profile", ScreenKind::Profile),
            create_group_chat_button: chat_button("create-group-chat-button", ScreenKind::Chat),
            leave_chat_button: button("leave-chat-button"),
            leave_button: button("leave-chat-confirm"),
            clear_button: button("clear-history-confirm"),

            all_activity_tab_button: ActivityTabButton(Button::by_translation(session, "all")),
            mention_activity_tab_button: ActivityTabButton(button("tab-mention")),
            reply_activity_tab_button: ActivityTabButton(button("tab-reply")),
            activity_unread_filter_button: button("selector-filter"),
            more_options_activity_button: button("activity-center-open-more"),
            mark_all_read_activity_button: Button::by_translation(
                session,
                "mark-all-notifications-as-read",
            ),

            share_qr_code_info_text: ShareQrCodeInfoText::new(session),
            link_to_profile_button: button("link-to-profile"),
            close_share_tab_button: button("close-shell-share-tab"),
            qr_code_image_element: BaseElement::by_id(session, "share-qr-code"),
            share_profile_tab_button: button("Profile"),
            share_wallet_tab_button: button("Wallet"),
            account_avatar: BaseElement::by_id(session, "account-avatar"),
            account_name_text: Text::new(
                session,
                XPath::accessibility_id("link-to-profile")
                    .preceding_sibling(Step::class("android.widget.TextView")),
            ),
            share_link_to_profile_button: button("link-to-profile"),

            community_card_item: BaseElement::by_id(session, "community-card-item"),
        }
    }

    fn element_secs(&self) -> u64 {
        self.session().timeouts().element_secs
    }

    /// Wait until no "Syncing" banner is left
    pub fn wait_for_syncing_complete(&self) -> E2eResult<()> {
        let session = self.session();
        session.info("Waiting for syncing to complete");
        let syncing = self.element_by_text_part("Syncing");
        for _ in 0..SYNC_MAX_CHECKS {
            match syncing.wait_for_element(DEFAULT_WAIT_TIMEOUT_SECS) {
                Ok(element) => {
                    if let Ok(text) = session.driver().text(&element) {
                        session.info(&text);
                    }
                }
                Err(e) if e.is_not_found() => return Ok(()),
                Err(e) => return Err(e),
            }
        }
        Err(session.fail("Syncing did not complete"))
    }

    /// Activity centre notification containing `text_part`
    #[must_use]
    pub fn get_activity_center_element_by_text(&self, text_part: &str) -> ActivityCenterElement<'s> {
        ActivityCenterElement::new(self.session(), text_part)
    }

    /// Activity centre notification for a message
    #[must_use]
    pub fn get_element_from_activity_center_view(&self, message_body: &str) -> ActivityCenterElement<'s> {
        self.session()
            .info(&format!("Looking for activity center element: '{message_body}'"));
        self.get_activity_center_element_by_text(message_body)
    }

    /// Chat list entry for `username`.
    ///
    /// A 1-1 chat that does not show up within `wait_secs` is opened from
    /// the activity centre when an unread badge is present.
    pub fn get_chat(&self, username: &str, kind: ChatKind, wait_secs: u64) -> E2eResult<ChatElement<'s>> {
        let session = self.session();
        if kind == ChatKind::Community {
            session.info(&format!("Looking for community: '{username}'"));
        } else {
            session.info(&format!("Looking for chat: '{username}'"));
        }
        let prefix = name_prefix(username);
        let chat = ChatElement::new(session, &prefix, kind);
        if kind == ChatKind::OneToOne
            && !chat.is_displayed(wait_secs)?
            && self.notifications_unread_badge.is_displayed(30)?
        {
            let in_activity_centre = self.get_activity_center_element_by_text(&prefix);
            self.open_activity_center_button
                .click_until_presence_of(&in_activity_centre, DEFAULT_CLICK_ATTEMPTS)?;
            let _ = in_activity_centre.wait_for_element(20)?;
            in_activity_centre.click()?;
        }
        Ok(chat)
    }

    /// Chat list entry without any fallback
    #[must_use]
    pub fn get_chat_from_home_view(&self, username: &str) -> ChatElement<'s> {
        self.session().info(&format!("Looking for chat: '{username}'"));
        ChatElement::new(self.session(), &name_prefix(username), ChatKind::OneToOne)
    }

    /// Open a community, then one of its channels
    pub fn get_to_community_channel_from_home(&self, community_name: &str, channel_name: &str) -> E2eResult<ChatView<'s>> {
        let community_view = self.get_community_view();
        let _ = self
            .get_chat(community_name, ChatKind::Community, DEFAULT_CHAT_WAIT_SECS)?
            .click()?;
        community_view.get_channel(channel_name).click()?.into_chat()
    }

    /// Accept, decline or cancel a contact request from the activity centre
    pub fn handle_contact_request(&self, username: &str, action: ContactRequestAction) -> E2eResult<()> {
        let session = self.session();
        if self.toast_content_element.is_displayed(10)? {
            self.toast_content_element
                .wait_for_invisibility(DEFAULT_WAIT_TIMEOUT_SECS)?;
        }
        match self.notifications_unread_badge.wait_for_visibility(30) {
            Err(e) if !e.is_timeout() => return Err(e),
            _ => {}
        }
        self.open_activity_center_button
            .click_until_presence_of(&self.close_activity_centre, DEFAULT_CLICK_ATTEMPTS)?;
        let element = self.get_activity_center_element_by_text(&name_prefix(username));
        let verb = match action {
            ContactRequestAction::Accept => "Accepting incoming",
            ContactRequestAction::Decline => "Rejecting incoming",
            ContactRequestAction::Cancel => "Canceling outgoing",
        };
        session.info(&format!("{verb} CR for {username}"));
        let handled = element.handle_contact_request(action).map_err(|e| {
            if e.is_not_found() || e.is_timeout() {
                session.fail(&format!("No contact request received from {username}"))
            } else {
                e
            }
        });
        let closed = self
            .close_activity_centre
            .wait_and_click(self.element_secs())
            .and_then(|()| self.chats_tab.wait_for_visibility(DEFAULT_WAIT_TIMEOUT_SECS))
            .map(|_| ());
        handled.and(closed)
    }

    /// Username text shown below the contact key input
    #[must_use]
    pub fn get_username_below_start_new_chat_button(&self, username_part: &str) -> Text<'s> {
        Text::new(
            self.session(),
            XPath::accessibility_id("enter-contact-code-input")
                .up(2)
                .descendant(Step::any().with_text(TextMatch::StartsWith, username_part)),
        )
    }

    /// Send a contact request via chats > add a contact
    pub fn add_contact(&self, public_key: &str, nickname: Option<&str>, remove_from_contacts: bool) -> E2eResult<()> {
        self.session()
            .info("Adding user to Contacts via chats > add new contact");
        self.new_chat_button.click_until_presence_of(
            &self.add_a_contact_chat_bottom_sheet_button,
            DEFAULT_CLICK_ATTEMPTS,
        )?;
        self.add_a_contact_chat_bottom_sheet_button.click()?;

        self.public_key_edit_box.click()?;
        self.public_key_edit_box.send_keys(public_key)?;
        let _ = self
            .element_by_translation_id("user-found")
            .wait_for_visibility(DEFAULT_WAIT_TIMEOUT_SECS)?;
        if !self
            .view_profile_new_contact_button
            .is_displayed(self.element_secs())?
        {
            self.click_system_back_button(1)?;
        }
        let profile = self.view_profile_new_contact_button.navigate().into_profile()?;
        self.view_profile_new_contact_button
            .click_until_presence_of(&profile.block_contact_button, DEFAULT_CLICK_ATTEMPTS)?;
        if remove_from_contacts
            && profile
                .remove_from_contacts
                .is_displayed(self.element_secs())?
        {
            profile.remove_from_contacts.click()?;
        }
        profile.send_contact_request("hi")?;
        if let Some(nickname) = nickname.filter(|n| !n.is_empty()) {
            profile.set_nickname(nickname)?;
        }
        profile
            .close_button
            .click_until_absence_of(&profile.close_button, DEFAULT_CLICK_ATTEMPTS)
    }

    /// Member picker checkbox next to `username`, in the given state
    #[must_use]
    pub fn get_username_checkbox(&self, username: &str, state_on: bool) -> CheckBox<'s> {
        let state = if state_on { "checkbox-on" } else { "checkbox-off" };
        CheckBox::new(
            self.session(),
            XPath::text(TextMatch::Exact, username)
                .parent()
                .descendant(Step::any().with_id(state)),
        )
    }

    /// Create a group chat with existing contacts
    pub fn create_group_chat(&self, user_names_to_add: &[&str], group_chat_name: &str) -> E2eResult<ChatView<'s>> {
        let session = self.session();
        session.info(&format!("## Creating group chat '{group_chat_name}'"));
        self.new_chat_button.click()?;
        self.start_a_new_chat_bottom_sheet_button.click()?;
        for user_name in user_names_to_add {
            let check_box = self.get_username_checkbox(user_name, false);
            if !check_box.is_displayed(self.element_secs())? {
                return Err(session.fail(&format!(
                    "User with the name '{user_name}' is not in contacts list so can't create a group chat"
                )));
            }
            Button::new(session, check_box.locator().clone()).click_until_presence_of(
                &self.get_username_checkbox(user_name, true),
                DEFAULT_CLICK_ATTEMPTS,
            )?;
        }
        self.next_button.click()?;
        self.get_sign_in_view()
            .profile_title_input
            .send_keys(group_chat_name)?;
        let chat = self.create_group_chat_button.click()?.into_chat()?;
        session.info(&format!("## Group chat {group_chat_name} is created successfully!"));
        Ok(chat)
    }

    /// Create a community by filling in the full form
    pub fn create_community_e2e(&self, options: &CommunityOptions) -> E2eResult<CommunityView<'s>> {
        let session = self.session();
        session.info(&format!(
            "## Creating community '{}', set image is set to '{}'",
            options.name, options.set_image
        ));
        self.plus_community_button.click()?;
        let form = self.communities_button.click()?.into_create_community()?;
        form.fill_in(&options.name, &options.description)?;
        if options.set_image {
            let set_picture_view = self.get_profile_view();
            set_picture_view
                .element_by_translation_id("community-thumbnail-upload")
                .click()?;
            set_picture_view
                .element_by_translation_id("community-image-pick")
                .click()?;
            set_picture_view.select_photo_from_gallery(&options.file_name)?;
            set_picture_view.crop_photo_button.click()?;
        }
        if options.require_approval {
            self.element_by_translation_id("membership-title").click()?;
            self.element_by_translation_id("membership-approval").click()?;
            self.done_button.click()?;
        }
        let community = form.confirm(DEFAULT_WAIT_TIMEOUT_SECS)?;
        session.info("## Community is created successfully!");
        Ok(community)
    }

    /// Create a prefilled test community from the "+" sheet
    pub fn create_community(&self, community_type: CommunityType) -> E2eResult<Screen<'s>> {
        let label = match community_type {
            CommunityType::Open => "open",
            CommunityType::Closed => "closed",
            CommunityType::TokenGated => "token-gated",
        };
        self.session().info(&format!("## Creating {label} community"));
        self.plus_community_button.click()?;
        match community_type {
            CommunityType::Open => self.create_open_community_button.click(),
            CommunityType::Closed => self.create_closed_community_button.click(),
            CommunityType::TokenGated => self.create_token_gated_community_button.click(),
        }
    }

    /// Import a community by its private key
    pub fn import_community(&self, key: &str) -> E2eResult<()> {
        let session = self.session();
        session.info("## Importing community");
        let import_button = Button::by_translation(session, "import");
        self.plus_button.click()?;
        let form = self.communities_button.click()?.into_create_community()?;
        form.options_button.click()?;
        form.element_by_translation_id("import-community")
            .wait_and_click(DEFAULT_WAIT_TIMEOUT_SECS)?;
        self.first_edit_box().send_keys(key)?;
        import_button.click_until_absence_of(&import_button, DEFAULT_CLICK_ATTEMPTS)
    }

    /// Join a public chat by name
    pub fn join_public_chat(&self, chat_name: &str) -> E2eResult<ChatView<'s>> {
        let session = self.session();
        session.info(&format!("## Creating public chat {chat_name}"));
        self.plus_button
            .click_until_presence_of(&self.join_public_chat_button, 5)?;
        let _ = self.join_public_chat_button.wait_for_visibility(5)?;
        let chat_view = self.join_public_chat_button.click()?.into_chat()?;
        let _ = chat_view.chat_name_editbox.wait_for_visibility(20)?;
        chat_view.chat_name_editbox.click()?;
        chat_view.chat_name_editbox.send_keys(chat_name)?;
        self.confirm_until_presence_of(&chat_view.chat_message_input)?;
        session.info(&format!("## Public chat '{chat_name}' is created successfully!"));
        Ok(chat_view)
    }

    /// Delete a chat from its long-press menu
    pub fn delete_chat_long_press(&self, username: &str) -> E2eResult<()> {
        self.session()
            .info(&format!("Deleting chat '{username}' by long press"));
        self.get_chat(username, ChatKind::OneToOne, DEFAULT_CHAT_WAIT_SECS)?
            .long_press()?;
        self.close_chat_button.click()?;
        self.confirm_closing_chat_button.click()
    }

    /// Leave a group chat from its long-press menu
    pub fn leave_chat_long_press(&self, username: &str) -> E2eResult<()> {
        self.session()
            .info(&format!("Leaving chat '{username}' by long press"));
        self.get_chat(username, ChatKind::OneToOne, DEFAULT_CHAT_WAIT_SECS)?
            .long_press()?;
        self.leave_chat_button.click()?;
        self.leave_button.click()
    }

    /// Clear chat history from the long-press menu
    pub fn clear_chat_long_press(&self, username: &str) -> E2eResult<()> {
        self.session()
            .info(&format!("Clearing history in chat '{username}' by long press"));
        self.get_chat(username, ChatKind::OneToOne, DEFAULT_CHAT_WAIT_SECS)?
            .long_press()?;
        self.clear_history_button.click()?;
        self.clear_button.click()
    }

    /// Mute a chat, community or channel from its long-press menu
    pub fn mute_chat_long_press(&self, chat_name: &str, mute_period: MutePeriod, kind: ChatKind) -> E2eResult<()> {
        self.session().info(&format!("Muting chat with {chat_name}"));
        self.get_chat(chat_name, kind, DEFAULT_CHAT_WAIT_SECS)?
            .long_press()?;
        match kind {
            ChatKind::Community => self.mute_community_button.click()?,
            ChatKind::CommunityChannel => self.mute_channel_button.click()?,
            ChatKind::OneToOne => self.mute_chat_button.click()?,
        }
        self.element_by_translation_id(mute_period.translation_key())
            .click()
    }

    /// Push notification with `pn_text`, if it arrives within a minute
    pub fn get_pn(&self, pn_text: &str) -> E2eResult<Option<PushNotificationElement<'s>>> {
        self.session().info(&format!("Getting PN by '{pn_text}'"));
        let element = PushNotificationElement::new(self.session(), pn_text);
        Ok(element
            .is_displayed(PUSH_NOTIFICATION_WAIT_SECS)?
            .then_some(element))
    }

    /// Contacts list row
    #[must_use]
    pub fn contact_details_row(&self, username: Option<&str>, index: Option<usize>) -> ContactDetailsRow<'s> {
        ContactDetailsRow::new(self.session(), username, index)
    }

    /// Number of rows in the contacts list
    pub fn get_contact_rows_count(&self) -> E2eResult<usize> {
        ContactDetailsRow::new(self.session(), None, None).count()
    }

    /// Own profile link from the share tab
    pub fn get_link_to_profile(&self) -> E2eResult<String> {
        self.show_qr_code_button.click()?;
        self.share_profile_tab_button.click()?;
        self.link_to_profile_button.click()?;
        let link = self.sharing_text_native.text()?;
        self.click_system_back_button(1)?;
        Ok(link)
    }

    /// Own compressed public key, taken from the profile link
    pub fn get_public_key(&self) -> E2eResult<String> {
        self.session().info("Getting public key via Share tab");
        let link = self.get_link_to_profile()?;
        self.click_system_back_button(1)?;
        Ok(link
            .rsplit_once('#')
            .map_or(link.as_str(), |(_, key)| key)
            .to_string())
    }

    /// Copy the address shown on the wallet share tab
    pub fn copy_wallet_address(&self) -> E2eResult<String> {
        self.share_link_to_profile_button.click()?;
        let address = self.sharing_text_native.text()?;
        self.click_system_back_button(1)?;
        Ok(address)
    }

    /// Own wallet address from the share tab
    pub fn get_wallet_address(&self) -> E2eResult<String> {
        self.show_qr_code_button.click()?;
        self.share_wallet_tab_button.click()?;
        let _ = self
            .account_avatar
            .wait_for_visibility(DEFAULT_WAIT_TIMEOUT_SECS)?;
        let address = self.copy_wallet_address()?;
        self.click_system_back_button(1)?;
        Ok(address)
    }

    /// Discover card of the community called `community_name`
    #[must_use]
    pub fn get_discover_community_card_by_name(&self, community_name: &str) -> BaseElement<'s> {
        BaseElement::new(
            self.session(),
            XPath::accessibility_id("community-card-item").with_descendant(
                &Step::any()
                    .with_id("chat-name-text")
                    .with_text(TextMatch::Exact, community_name),
            ),
        )
    }
}

impl<'s> Deref for HomeView<'s> {
    type Target = BaseView<'s>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<'s> PageObject<'s> for HomeView<'s> {
    fn session(&self) -> &'s Session {
        self.base.session()
    }

    fn kind(&self) -> ScreenKind {
        ScreenKind::Home
    }

    fn anchor(&self) -> BaseElement<'s> {
        (*self.base.chats_tab).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Timeouts;
    use crate::driver::By;
    use crate::mock::{MockAction, MockDevice, MockNode, CHECKBOX_CLASS};

    fn session(device: &MockDevice) -> Session {
        Session::new(1, device.clone()).with_timeouts(Timeouts::instant())
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_chat_element_paths() {
            let device = MockDevice::new();
            let session = session(&device);
            let channel = ChatElement::new(&session, "general", ChatKind::CommunityChannel);
            assert_eq!(
                channel.locator().to_string(),
                "xpath: //*[@content-desc='channel-list-item']//*[starts-with(@text,'# general')]/.."
            );
            let community = ChatElement::new(&session, "open community", ChatKind::Community);
            assert_eq!(
                community.locator().to_string(),
                "xpath: //*[@content-desc='chat-name-text'][starts-with(@text,'open community')]/.."
            );
            let chat = ChatElement::new(&session, "alice", ChatKind::OneToOne);
            assert_eq!(
                chat.locator().to_string(),
                "xpath: //*[@content-desc='author-primary-name'][starts-with(@text,'alice')]/.."
            );
        }

        #[test]
        fn test_chat_name_is_truncated() {
            let device = MockDevice::new();
            let session = session(&device);
            let home = HomeView::new(&session);
            let chat = home.get_chat_from_home_view("a-very-long-user-name-that-keeps-going");
            assert_eq!(chat.username(), "a-very-long-user-name-tha");
        }

        #[test]
        fn test_activity_center_path() {
            let device = MockDevice::new();
            let session = session(&device);
            let element = ActivityCenterElement::new(&session, "bob");
            assert_eq!(
                element.locator().to_string(),
                "xpath: //*[contains(@text,'bob')]/ancestor::*[@content-desc='activity']"
            );
            assert_eq!(
                element.title().locator().to_string(),
                "xpath: //*[contains(@text,'bob')]/ancestor::*[@content-desc='activity']//*[@content-desc='activity-title']"
            );
        }

        #[test]
        fn test_contact_details_row_paths() {
            let device = MockDevice::new();
            let session = session(&device);
            let row = ContactDetailsRow::new(&session, Some("carol"), None);
            assert_eq!(
                row.locator().to_string(),
                "xpath: //*[@content-desc='user-list'][*[contains(@text,'carol')]]"
            );
            let second = ContactDetailsRow::new(&session, None, Some(2));
            assert_eq!(
                second.options_button.locator().to_string(),
                "xpath: (//*[@content-desc='user-list'][2]//android.widget.ImageView)[2]"
            );
        }

        #[test]
        fn test_push_notification_paths() {
            let device = MockDevice::new();
            let session = session(&device);
            let pn = PushNotificationElement::new(&session, "hello");
            assert_eq!(
                pn.icon().locator().to_string(),
                "xpath: //*[@text='hello']/../../../../*/*[@resource-id='android:id/message_icon']"
            );
        }

        #[test]
        fn test_discover_card_path() {
            let device = MockDevice::new();
            let session = session(&device);
            let card = HomeView::new(&session).get_discover_community_card_by_name("Status");
            assert_eq!(
                card.locator().to_string(),
                "xpath: //*[@content-desc='community-card-item'][descendant::*[@content-desc='chat-name-text'][@text='Status']]"
            );
        }

        #[test]
        fn test_parse_options() {
            assert_eq!("token-gated".parse::<CommunityType>().unwrap(), CommunityType::TokenGated);
            assert!("secret".parse::<CommunityType>().is_err());
            assert_eq!(
                "maybe".parse::<ContactRequestAction>().unwrap_err().to_string(),
                "Step failed: Illegal option for CR!"
            );
        }
    }

    mod action_tests {
        use super::*;

        #[test]
        fn test_create_community_taps_type_button() {
            let device = MockDevice::with_nodes([
                MockNode::with_id("new-communities-button"),
                MockNode::with_id("create-closed-community"),
            ]);
            let session = session(&device);
            let screen = HomeView::new(&session)
                .create_community(CommunityType::Closed)
                .unwrap();
            assert_eq!(screen.kind(), ScreenKind::Community);
            assert_eq!(
                device.clicks(),
                vec!["new-communities-button", "create-closed-community"]
            );
        }

        #[test]
        fn test_get_public_key() {
            let device = MockDevice::with_nodes([
                MockNode::with_id("show-qr-button"),
                MockNode::with_id("Profile"),
                MockNode::with_id("link-to-profile"),
                MockNode::new()
                    .resource_id("android:id/content_preview_text")
                    .text("https://status.app/u/CwKACg==#zQ3shVVxZMwLVEQvuu1KF6h4D2mzVyCC4F4mHLZm5dz5XU1aa"),
            ]);
            let session = session(&device);
            let key = HomeView::new(&session).get_public_key().unwrap();
            assert_eq!(key, "zQ3shVVxZMwLVEQvuu1KF6h4D2mzVyCC4F4mHLZm5dz5XU1aa");
            let backs = device
                .actions()
                .into_iter()
                .filter(|a| *a == MockAction::Back)
                .count();
            assert_eq!(backs, 2);
        }

        #[test]
        fn test_get_chat_falls_back_to_activity_centre() {
            let device = MockDevice::with_nodes([
                MockNode::with_id("activity-center-unread-count"),
                MockNode::with_id("open-activity-center-button"),
            ]);
            device.on_click(By::AccessibilityId("open-activity-center-button".into()), |ui| {
                let _ = ui.add(
                    MockNode::with_text("dave sent you a message")
                        .alias_xpath("//*[contains(@text,'dave')]/ancestor::*[@content-desc='activity']"),
                );
            });
            let session = session(&device);
            let chat = HomeView::new(&session)
                .get_chat("dave", ChatKind::OneToOne, 1)
                .unwrap();
            assert_eq!(chat.username(), "dave");
            assert_eq!(
                device.clicks(),
                vec!["open-activity-center-button", "dave sent you a message"]
            );
        }

        #[test]
        fn test_get_community_has_no_fallback() {
            let device = MockDevice::with_nodes([MockNode::with_id("activity-center-unread-count")]);
            let session = session(&device);
            let _ = HomeView::new(&session)
                .get_chat("missing", ChatKind::Community, 1)
                .unwrap();
            assert!(device.clicks().is_empty());
        }

        #[test]
        fn test_chat_element_not_found_message() {
            let device = MockDevice::new();
            let session = session(&device);
            let err = ChatElement::new(&session, "ghost", ChatKind::OneToOne)
                .find_element()
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                "Step failed: Device 1: Unable to find chat with name ghost"
            );
        }

        #[test]
        fn test_mute_chat_long_press() {
            let chat_path = "//*[@content-desc='author-primary-name'][starts-with(@text,'erin')]/..";
            let device = MockDevice::with_nodes([
                MockNode::new().alias_xpath(chat_path),
                MockNode::with_id("mute-chat"),
                MockNode::with_text("For 1 hour"),
            ]);
            let session = session(&device);
            HomeView::new(&session)
                .mute_chat_long_press("erin", MutePeriod::For1Hour, ChatKind::OneToOne)
                .unwrap();
            assert_eq!(
                device.actions(),
                vec![
                    MockAction::LongPress("android.view.View".into()),
                    MockAction::Click("mute-chat".into()),
                    MockAction::Click("For 1 hour".into()),
                ]
            );
        }

        #[test]
        fn test_handle_contact_request_missing_still_closes() {
            let device = MockDevice::with_nodes([
                MockNode::with_id("open-activity-center-button"),
                MockNode::with_id("close-activity-center"),
                MockNode::with_id("chats-stack-tab"),
            ]);
            let session = session(&device);
            let err = HomeView::new(&session)
                .handle_contact_request("frank", ContactRequestAction::Accept)
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                "Step failed: Device 1: No contact request received from frank"
            );
            assert_eq!(device.clicks(), vec!["close-activity-center"]);
        }

        #[test]
        fn test_create_group_chat_unknown_user() {
            let device = MockDevice::with_nodes([
                MockNode::with_id("new-chat-button"),
                MockNode::with_id("start-a-new-chat"),
            ]);
            let session = session(&device);
            let err = HomeView::new(&session)
                .create_group_chat(&["stranger"], "new_group_chat")
                .unwrap_err();
            assert!(err.to_string().contains("'stranger' is not in contacts list"));
        }

        #[test]
        fn test_create_group_chat_checks_users() {
            let device = MockDevice::with_nodes([
                MockNode::with_id("new-chat-button"),
                MockNode::with_id("start-a-new-chat"),
                MockNode::with_id("next-button"),
                MockNode::with_id("profile-title-input").editable(),
                MockNode::with_id("create-group-chat-button"),
                MockNode::new()
                    .class(CHECKBOX_CLASS)
                    .alias_xpath("//*[@text='gina']/..//*[@content-desc='checkbox-off']"),
            ]);
            device.on_click(
                By::XPath("//*[@text='gina']/..//*[@content-desc='checkbox-off']".into()),
                |ui| {
                    let _ = ui.add(
                        MockNode::new()
                            .alias_xpath("//*[@text='gina']/..//*[@content-desc='checkbox-on']"),
                    );
                },
            );
            let session = session(&device);
            let chat = HomeView::new(&session)
                .create_group_chat(&["gina"], "friends")
                .unwrap();
            assert_eq!(chat.kind(), ScreenKind::Chat);
            assert!(device
                .actions()
                .contains(&MockAction::SendKeys("profile-title-input".into(), "friends".into())));
        }

        #[test]
        fn test_username_checkbox_path() {
            let device = MockDevice::new();
            let session = session(&device);
            let home = HomeView::new(&session);
            assert_eq!(
                home.get_username_checkbox("gina", true).locator().to_string(),
                "xpath: //*[@text='gina']/..//*[@content-desc='checkbox-on']"
            );
        }

        #[test]
        fn test_add_contact_goes_through_profile() {
            let device = MockDevice::with_nodes([
                MockNode::with_id("new-chat-button"),
                MockNode::with_id("add-a-contact"),
                MockNode::with_id("enter-contact-code-input").editable(),
                MockNode::with_text("User found"),
                MockNode::with_id("view-profile"),
                MockNode::with_id("contact-request-btn"),
                MockNode::with_id("contact-request-message").editable(),
                MockNode::with_id("send-contact-request"),
                MockNode::with_id("edit-nickname"),
                MockNode::with_id("nickname-input").editable(),
                MockNode::with_id("set-nickname"),
                MockNode::with_id("close-button"),
            ]);
            device.on_click(By::AccessibilityId("view-profile".into()), |ui| {
                let _ = ui.add(MockNode::with_id("block-user"));
            });
            device.on_click(By::AccessibilityId("close-button".into()), |ui| {
                ui.remove(&By::AccessibilityId("close-button".into()));
            });
            let session = session(&device);
            HomeView::new(&session)
                .add_contact("0x04abc", Some("Bob"), false)
                .unwrap();
            assert_eq!(
                device.clicks(),
                vec![
                    "add-a-contact",
                    "enter-contact-code-input",
                    "view-profile",
                    "contact-request-btn",
                    "send-contact-request",
                    "edit-nickname",
                    "set-nickname",
                    "close-button",
                ]
            );
            assert!(device
                .actions()
                .contains(&MockAction::SendKeys("nickname-input".into(), "Bob".into())));
        }
    }
}
