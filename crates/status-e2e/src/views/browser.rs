//! In-app browser, used as a launcher for deep links.

use super::{link_destination, BaseView, PageObject, Screen, ScreenKind};
use crate::driver::KEYCODE_ENTER;
use crate::element::{BaseElement, EditBox};
use crate::result::E2eResult;
use crate::session::Session;
use crate::wait::DEFAULT_WAIT_TIMEOUT_SECS;
use std::ops::Deref;

/// Browser tab
#[derive(Debug, Clone)]
pub struct BrowserView<'s> {
    base: BaseView<'s>,

    /// Address bar
    pub enter_url_editbox: EditBox<'s>,
}

impl<'s> BrowserView<'s> {
    /// Build the view
    #[must_use]
    pub fn new(session: &'s Session) -> Self {
        Self {
            base: BaseView::new(session),
            enter_url_editbox: EditBox::by_id(session, "dapp-url-input"),
        }
    }

    /// Type `url` into the address bar and submit it
    pub fn open_url(&self, url: &str) -> E2eResult<()> {
        let session = self.session();
        session.info(&format!("Opening url: {url}"));
        let _ = self
            .enter_url_editbox
            .wait_for_visibility(DEFAULT_WAIT_TIMEOUT_SECS)?;
        self.enter_url_editbox.click()?;
        self.enter_url_editbox.send_keys(url)?;
        session.driver().press_keycode(KEYCODE_ENTER)
    }

    /// Open a status link and return the screen it leads to
    pub fn open_link(&self, link: &str) -> E2eResult<Screen<'s>> {
        self.open_url(link)?;
        Ok(Screen::open(link_destination(link), self.session()))
    }
}

impl<'s> Deref for BrowserView<'s> {
    type Target = BaseView<'s>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<'s> PageObject<'s> for BrowserView<'s> {
    fn session(&self) -> &'s Session {
        self.base.session()
    }

    fn kind(&self) -> ScreenKind {
        ScreenKind::Browser
    }

    fn anchor(&self) -> BaseElement<'s> {
        (*self.enter_url_editbox).clone()
    }
}
