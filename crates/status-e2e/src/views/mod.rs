//! Page objects, one per app screen.
//!
//! Views borrow a [`Session`] and are cheap to build; create a fresh one
//! whenever a step needs it instead of keeping views around. Actions that
//! move to another screen return a [`Screen`], the tagged union over every
//! view, resolved through the fixed [`ScreenKind`] table.

mod base;
mod browser;
mod chat;
mod create_community;
mod home;
mod profile;
mod sign_in;

pub use base::BaseView;
pub use browser::BrowserView;
pub use chat::{ChatMessageElement, ChatView, CommunityView};
pub use create_community::CreateCommunityView;
pub use home::{
    ActivityCenterElement, ActivityTabButton, ChatElement, ChatKind, CommunityOptions,
    CommunityType, ContactDetailsRow, ContactRequestAction, HomeView, MuteButton, MutePeriod,
    PushNotificationElement, ShareQrCodeInfoText, DEFAULT_CHAT_WAIT_SECS,
};
pub use profile::ProfileView;
pub use sign_in::{SignInView, DEFAULT_PASSWORD};

use crate::element::{BaseElement, Button};
use crate::links::{LinkKind, StatusLink};
use crate::locator::Locator;
use crate::result::{E2eError, E2eResult};
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// A page object for one screen
pub trait PageObject<'s> {
    /// Session the view drives
    fn session(&self) -> &'s Session;

    /// Which screen this is
    fn kind(&self) -> ScreenKind;

    /// Element whose presence proves the screen is shown
    fn anchor(&self) -> BaseElement<'s>;

    /// Whether the screen shows up within `seconds`
    fn is_loaded(&self, seconds: u64) -> E2eResult<bool> {
        self.anchor().is_displayed(seconds)
    }

    /// Page name for logging
    fn page_name(&self) -> &'static str {
        self.kind().name()
    }
}

/// Every screen a navigation can land on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenKind {
    /// Chats/communities home
    Home,
    /// One-to-one, group or channel chat
    Chat,
    /// Community overview
    Community,
    /// Community creation form
    CreateCommunity,
    /// User profile
    Profile,
    /// Onboarding and login
    SignIn,
    /// In-app browser
    Browser,
}

impl ScreenKind {
    /// Every screen kind
    pub const ALL: [Self; 7] = [
        Self::Home,
        Self::Chat,
        Self::Community,
        Self::CreateCommunity,
        Self::Profile,
        Self::SignIn,
        Self::Browser,
    ];

    /// View name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Home => "HomeView",
            Self::Chat => "ChatView",
            Self::Community => "CommunityView",
            Self::CreateCommunity => "CreateCommunityView",
            Self::Profile => "ProfileView",
            Self::SignIn => "SignInView",
            Self::Browser => "BrowserView",
        }
    }
}

impl fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a navigation: the page object for the destination screen
#[derive(Debug)]
pub enum Screen<'s> {
    /// Home
    Home(HomeView<'s>),
    /// Chat
    Chat(ChatView<'s>),
    /// Community
    Community(CommunityView<'s>),
    /// Community creation form
    CreateCommunity(CreateCommunityView<'s>),
    /// Profile
    Profile(ProfileView<'s>),
    /// Sign in
    SignIn(SignInView<'s>),
    /// Browser
    Browser(BrowserView<'s>),
}

macro_rules! into_view {
    ($(#[$meta:meta])* $method:ident, $variant:ident, $view:ident) => {
        $(#[$meta])*
        pub fn $method(self) -> E2eResult<$view<'s>> {
            match self {
                Self::$variant(view) => Ok(view),
                other => Err(E2eError::UnexpectedScreen {
                    expected: ScreenKind::$variant.to_string(),
                    actual: other.kind().to_string(),
                }),
            }
        }
    };
}

impl<'s> Screen<'s> {
    /// Build the page object for `kind`
    #[must_use]
    pub fn open(kind: ScreenKind, session: &'s Session) -> Self {
        match kind {
            ScreenKind::Home => Self::Home(HomeView::new(session)),
            ScreenKind::Chat => Self::Chat(ChatView::new(session)),
            ScreenKind::Community => Self::Community(CommunityView::new(session)),
            ScreenKind::CreateCommunity => Self::CreateCommunity(CreateCommunityView::new(session)),
            ScreenKind::Profile => Self::Profile(ProfileView::new(session)),
            ScreenKind::SignIn => Self::SignIn(SignInView::new(session)),
            ScreenKind::Browser => Self::Browser(BrowserView::new(session)),
        }
    }

    /// Which screen this is
    #[must_use]
    pub const fn kind(&self) -> ScreenKind {
        match self {
            Self::Home(_) => ScreenKind::Home,
            Self::Chat(_) => ScreenKind::Chat,
            Self::Community(_) => ScreenKind::Community,
            Self::CreateCommunity(_) => ScreenKind::CreateCommunity,
            Self::Profile(_) => ScreenKind::Profile,
            Self::SignIn(_) => ScreenKind::SignIn,
            Self::Browser(_) => ScreenKind::Browser,
        }
    }

    /// Anchor element of the wrapped view
    #[must_use]
    pub fn anchor(&self) -> BaseElement<'s> {
        match self {
            Self::Home(v) => v.anchor(),
            Self::Chat(v) => v.anchor(),
            Self::Community(v) => v.anchor(),
            Self::CreateCommunity(v) => v.anchor(),
            Self::Profile(v) => v.anchor(),
            Self::SignIn(v) => v.anchor(),
            Self::Browser(v) => v.anchor(),
        }
    }

    into_view!(
        /// Unwrap a home view
        into_home, Home, HomeView
    );
    into_view!(
        /// Unwrap a chat view
        into_chat, Chat, ChatView
    );
    into_view!(
        /// Unwrap a community view
        into_community, Community, CommunityView
    );
    into_view!(
        /// Unwrap a community creation form
        into_create_community, CreateCommunity, CreateCommunityView
    );
    into_view!(
        /// Unwrap a profile view
        into_profile, Profile, ProfileView
    );
    into_view!(
        /// Unwrap a sign-in view
        into_sign_in, SignIn, SignInView
    );
    into_view!(
        /// Unwrap a browser view
        into_browser, Browser, BrowserView
    );
}

/// Screen the app shows after opening `link`. Profile links open a
/// profile, community links the community and channel links the channel
/// chat; anything else stays in the browser.
#[must_use]
pub fn link_destination(link: &str) -> ScreenKind {
    match link.parse::<StatusLink>() {
        Ok(parsed) => match parsed.kind {
            LinkKind::Profile => ScreenKind::Profile,
            LinkKind::Community => ScreenKind::Community,
            LinkKind::Channel => ScreenKind::Chat,
        },
        Err(_) => ScreenKind::Browser,
    }
}

/// A button that leads to a known screen
#[derive(Debug, Clone)]
pub struct ChatButton<'s> {
    button: Button<'s>,
    destination: ScreenKind,
}

impl<'s> ChatButton<'s> {
    /// Button at `locator` leading to `destination`
    pub fn new(session: &'s Session, locator: impl Into<Locator>, destination: ScreenKind) -> Self {
        Self {
            button: Button::new(session, locator),
            destination,
        }
    }

    /// Button by accessibility id leading to `destination`
    pub fn by_id(session: &'s Session, id: &str, destination: ScreenKind) -> Self {
        Self::new(session, Locator::accessibility_id(id), destination)
    }

    /// Where the button leads
    #[must_use]
    pub const fn destination(&self) -> ScreenKind {
        self.destination
    }

    /// Page object for the destination, without tapping
    #[must_use]
    pub fn navigate(&self) -> Screen<'s> {
        Screen::open(self.destination, self.button.session())
    }

    /// Tap and return the destination
    pub fn click(&self) -> E2eResult<Screen<'s>> {
        self.button.click()?;
        Ok(self.navigate())
    }
}

impl<'s> Deref for ChatButton<'s> {
    type Target = Button<'s>;

    fn deref(&self) -> &Self::Target {
        &self.button
    }
}
