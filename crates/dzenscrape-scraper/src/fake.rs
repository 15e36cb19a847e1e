//! In-memory browser for tests.
//!
//! Pages are plain data: a channel header plus a list of feed cards. The feed
//! can be revealed in stages to mimic lazy loading, one stage per row lookup.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::error::ScraperError;
use crate::session::{selectors, Session, SessionFactory};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One feed card.
#[derive(Debug, Clone)]
pub struct FakePost {
    /// Text of the content block; `None` if the block is missing.
    pub content: Option<String>,
    /// Whether the clickable link element exists.
    pub link: bool,
    pub href: Option<String>,
}

impl FakePost {
    #[must_use]
    pub fn new(title: &str, description: &str, date: &str, href: &str) -> Self {
        Self::from_content(&format!("{title}\n{description}\n{date}"), href)
    }

    #[must_use]
    pub fn from_content(content: &str, href: &str) -> Self {
        Self {
            content: Some(content.to_owned()),
            link: true,
            href: Some(href.to_owned()),
        }
    }

    #[must_use]
    pub fn without_content(href: &str) -> Self {
        Self {
            content: None,
            link: true,
            href: Some(href.to_owned()),
        }
    }

    #[must_use]
    pub fn without_link(content: &str) -> Self {
        Self {
            content: Some(content.to_owned()),
            link: false,
            href: None,
        }
    }
}

/// A rendered channel page. `None` fields are missing from the markup.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub title: Option<String>,
    pub info_text: Option<String>,
    pub description: Option<String>,
    pub counters: Vec<String>,
    pub posts: Vec<FakePost>,
    /// Rows visible on the n-th feed lookup. Empty means all rows at once;
    /// lookups past the end repeat the last stage.
    pub reveal: Vec<usize>,
}

impl FakePage {
    /// A page with the given header. The info block text is title,
    /// description and counters on separate lines.
    #[must_use]
    pub fn profile<const N: usize>(title: &str, description: &str, counters: [&str; N]) -> Self {
        let mut info = vec![title, description];
        info.extend(counters);
        Self {
            title: Some(title.to_owned()),
            info_text: Some(info.join("\n")),
            description: Some(description.to_owned()),
            counters: counters.iter().map(|c| (*c).to_owned()).collect(),
            posts: Vec::new(),
            reveal: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_info_text(mut self, text: &str) -> Self {
        self.info_text = Some(text.to_owned());
        self
    }

    #[must_use]
    pub fn with_posts(mut self, posts: Vec<FakePost>) -> Self {
        self.posts = posts;
        self
    }

    #[must_use]
    pub fn with_reveal(mut self, stages: Vec<usize>) -> Self {
        self.reveal = stages;
        self
    }

    fn visible_rows(&self, lookup: usize) -> usize {
        self.reveal
            .get(lookup)
            .or(self.reveal.last())
            .copied()
            .unwrap_or(self.posts.len())
            .min(self.posts.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeElement {
    Info,
    Title,
    Description,
    Counter(usize),
    Row(usize),
    Content(usize),
    Link(usize),
}

/// Counters shared by a [`FakeBrowser`] and every session it opened.
#[derive(Debug, Default)]
struct BrowserStats {
    opened: usize,
    closed: usize,
    visited: Vec<String>,
}

/// A [`SessionFactory`] serving fixed pages by URL.
#[derive(Debug, Clone, Default)]
pub struct FakeBrowser {
    pages: HashMap<String, FakePage>,
    stats: Arc<Mutex<BrowserStats>>,
}

impl FakeBrowser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_page(mut self, url: &str, page: FakePage) -> Self {
        self.pages.insert(url.to_owned(), page);
        self
    }

    #[must_use]
    pub fn opened(&self) -> usize {
        lock(&self.stats).opened
    }

    #[must_use]
    pub fn closed(&self) -> usize {
        lock(&self.stats).closed
    }

    /// URLs navigated to, across all sessions, in call order.
    #[must_use]
    pub fn visited(&self) -> Vec<String> {
        lock(&self.stats).visited.clone()
    }
}

impl SessionFactory for FakeBrowser {
    type Session = FakeSession;

    async fn open(&self) -> Result<FakeSession, ScraperError> {
        lock(&self.stats).opened += 1;
        Ok(FakeSession {
            pages: self.pages.clone(),
            state: Mutex::new(SessionState::default()),
            stats: Arc::clone(&self.stats),
        })
    }
}

#[derive(Debug, Default)]
struct SessionState {
    page: Option<FakePage>,
    implicit_wait: Option<Duration>,
    row_lookups: usize,
    scrolls: usize,
}

#[derive(Debug)]
pub struct FakeSession {
    pages: HashMap<String, FakePage>,
    state: Mutex<SessionState>,
    stats: Arc<Mutex<BrowserStats>>,
}

impl FakeSession {
    /// A standalone session already positioned on `page`.
    #[must_use]
    pub fn with_page(page: FakePage) -> Self {
        Self {
            pages: HashMap::new(),
            state: Mutex::new(SessionState {
                page: Some(page),
                ..SessionState::default()
            }),
            stats: Arc::default(),
        }
    }

    #[must_use]
    pub fn implicit_wait(&self) -> Option<Duration> {
        lock(&self.state).implicit_wait
    }

    /// Number of feed row lookups so far.
    #[must_use]
    pub fn row_lookups(&self) -> usize {
        lock(&self.state).row_lookups
    }

    #[must_use]
    pub fn scrolls(&self) -> usize {
        lock(&self.state).scrolls
    }
}

fn not_found(selector: &str) -> ScraperError {
    ScraperError::ElementNotFound {
        selector: selector.to_owned(),
    }
}

fn stale(element: FakeElement) -> ScraperError {
    ScraperError::Protocol {
        context: "fake element",
        reason: format!("{element:?} is not on the current page"),
    }
}

impl Session for FakeSession {
    type Element = FakeElement;

    async fn goto(&self, url: &str) -> Result<(), ScraperError> {
        lock(&self.stats).visited.push(url.to_owned());
        let mut state = lock(&self.state);
        state.page = self.pages.get(url).cloned();
        state.row_lookups = 0;
        Ok(())
    }

    async fn set_implicit_wait(&self, wait: Duration) -> Result<(), ScraperError> {
        lock(&self.state).implicit_wait = Some(wait);
        Ok(())
    }

    async fn find(&self, selector: &str) -> Result<FakeElement, ScraperError> {
        let state = lock(&self.state);
        let page = state.page.as_ref().ok_or_else(|| not_found(selector))?;
        let found = match selector {
            selectors::PROFILE_INFO => page.info_text.is_some().then_some(FakeElement::Info),
            selectors::TITLE => page.title.is_some().then_some(FakeElement::Title),
            selectors::DESCRIPTION => page
                .description
                .is_some()
                .then_some(FakeElement::Description),
            _ => None,
        };
        found.ok_or_else(|| not_found(selector))
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<FakeElement>, ScraperError> {
        let mut state = lock(&self.state);
        let lookup = state.row_lookups;
        let Some(page) = state.page.as_ref() else {
            return Ok(Vec::new());
        };
        match selector {
            selectors::COUNTER => Ok((0..page.counters.len()).map(FakeElement::Counter).collect()),
            selectors::FEED_ROW => {
                let rows = (0..page.visible_rows(lookup)).map(FakeElement::Row).collect();
                state.row_lookups += 1;
                Ok(rows)
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn find_within(
        &self,
        parent: &FakeElement,
        selector: &str,
    ) -> Result<FakeElement, ScraperError> {
        let state = lock(&self.state);
        let FakeElement::Row(i) = *parent else {
            return Err(not_found(selector));
        };
        let post = state
            .page
            .as_ref()
            .and_then(|p| p.posts.get(i))
            .ok_or_else(|| stale(*parent))?;
        let found = match selector {
            selectors::POST_CONTENT => post.content.is_some().then_some(FakeElement::Content(i)),
            selectors::POST_LINK => post.link.then_some(FakeElement::Link(i)),
            _ => None,
        };
        found.ok_or_else(|| not_found(selector))
    }

    async fn text(&self, element: &FakeElement) -> Result<String, ScraperError> {
        let state = lock(&self.state);
        let page = state.page.as_ref().ok_or_else(|| stale(*element))?;
        let text = match *element {
            FakeElement::Info => page.info_text.clone(),
            FakeElement::Title => page.title.clone(),
            FakeElement::Description => page.description.clone(),
            FakeElement::Counter(i) => page.counters.get(i).cloned(),
            FakeElement::Content(i) => page.posts.get(i).and_then(|p| p.content.clone()),
            FakeElement::Row(_) | FakeElement::Link(_) => Some(String::new()),
        };
        text.ok_or_else(|| stale(*element))
    }

    async fn attribute(
        &self,
        element: &FakeElement,
        name: &str,
    ) -> Result<Option<String>, ScraperError> {
        let state = lock(&self.state);
        let page = state.page.as_ref().ok_or_else(|| stale(*element))?;
        match (*element, name) {
            (FakeElement::Link(i), "href") => Ok(page.posts.get(i).and_then(|p| p.href.clone())),
            _ => Ok(None),
        }
    }

    async fn scroll_into_view(&self, _element: &FakeElement) -> Result<(), ScraperError> {
        lock(&self.state).scrolls += 1;
        Ok(())
    }

    async fn close(self) -> Result<(), ScraperError> {
        lock(&self.stats).closed += 1;
        Ok(())
    }
}
