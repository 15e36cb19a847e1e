//! Browser session capability used by the page parsers.
//!
//! The parsers only need a handful of operations from a rendered page, so they
//! are written against these traits rather than a concrete driver. The
//! production implementation is [`crate::webdriver`]; tests use
//! [`crate::fake`].

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// CSS selectors for the channel page markup.
pub mod selectors {
    /// Profile info block; its full text is scanned for contact details.
    pub const PROFILE_INFO: &str = ".desktop-channel-info-layout";
    pub const TITLE: &str = ".channel-title__block-nt";
    pub const DESCRIPTION: &str = ".desktop-channel-info-layout__description";
    /// Subscriber and subscription counters, in that order.
    pub const COUNTER: &str = ".desktop-channel-info-layout__counter";
    pub const FEED_ROW: &str = ".feed__row";
    /// Text block of a feed card: title, description, date on separate lines.
    pub const POST_CONTENT: &str = ".card-image-compact-view__content";
    pub const POST_LINK: &str = ".card-image-compact-view__clickable";
}

/// One open browser session, positioned on at most one page at a time.
///
/// Lookups that find nothing fail with [`ScraperError::ElementNotFound`]
/// after the implicit wait elapses; `find_all` returns an empty list instead.
pub trait Session: Send + Sync {
    type Element: Clone + Send + Sync;

    fn goto(&self, url: &str) -> impl Future<Output = Result<(), ScraperError>> + Send;

    fn set_implicit_wait(
        &self,
        wait: Duration,
    ) -> impl Future<Output = Result<(), ScraperError>> + Send;

    fn find(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Self::Element, ScraperError>> + Send;

    fn find_all(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Vec<Self::Element>, ScraperError>> + Send;

    fn find_within(
        &self,
        parent: &Self::Element,
        selector: &str,
    ) -> impl Future<Output = Result<Self::Element, ScraperError>> + Send;

    /// Rendered text of the element, with line breaks as `\n`.
    fn text(
        &self,
        element: &Self::Element,
    ) -> impl Future<Output = Result<String, ScraperError>> + Send;

    fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> impl Future<Output = Result<Option<String>, ScraperError>> + Send;

    fn scroll_into_view(
        &self,
        element: &Self::Element,
    ) -> impl Future<Output = Result<(), ScraperError>> + Send;

    /// Ends the session and releases the browser.
    fn close(self) -> impl Future<Output = Result<(), ScraperError>> + Send
    where
        Self: Sized;
}

/// Opens fresh, unshared browser sessions.
pub trait SessionFactory: Send + Sync {
    type Session: Session;

    fn open(&self) -> impl Future<Output = Result<Self::Session, ScraperError>> + Send;
}
