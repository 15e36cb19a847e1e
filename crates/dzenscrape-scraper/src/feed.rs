//! Scroll-driven feed loading.
//!
//! The channel feed renders a first batch of rows and appends more whenever
//! the last row scrolls into view. Loading is done once a scroll produces no
//! new rows.

use std::time::Duration;

use crate::error::ScraperError;
use crate::session::{selectors, Session};

/// Default pause before each scroll, giving lazy rows time to render.
pub const DEFAULT_SCROLL_PAUSE: Duration = Duration::from_secs(1);

/// Default cap on scroll rounds before giving up on a feed.
pub const DEFAULT_MAX_ROUNDS: usize = 500;

#[derive(Debug, Clone, Copy)]
pub struct FeedOptions {
    pub scroll_pause: Duration,
    /// Maximum number of scroll-and-recount rounds.
    pub max_rounds: usize,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            scroll_pause: DEFAULT_SCROLL_PAUSE,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

/// Every feed row found once loading stopped.
#[derive(Debug, Clone)]
pub struct RevealedFeed<E> {
    pub items: Vec<E>,
    /// Scroll-and-recount rounds performed. Zero for an empty feed.
    pub polls: usize,
}

/// Scrolls the feed until the row count stops growing.
///
/// An empty feed returns immediately without scrolling. A feed that settles at
/// N rows after K growth rounds returns N rows and `polls == K + 1`.
///
/// # Errors
///
/// Returns [`ScraperError::FeedLoadTimeout`] if the feed is still growing after
/// `options.max_rounds` rounds, or any session error from the driver.
pub async fn reveal_feed<S: Session>(
    session: &S,
    options: FeedOptions,
) -> Result<RevealedFeed<S::Element>, ScraperError> {
    let mut items = session.find_all(selectors::FEED_ROW).await?;
    let mut polls = 0usize;

    loop {
        let Some(last) = items.last() else {
            // Nothing to scroll to.
            return Ok(RevealedFeed { items, polls });
        };

        if polls >= options.max_rounds {
            return Err(ScraperError::FeedLoadTimeout {
                max_rounds: options.max_rounds,
                loaded: items.len(),
            });
        }

        tokio::time::sleep(options.scroll_pause).await;
        session.scroll_into_view(last).await?;
        let fresh = session.find_all(selectors::FEED_ROW).await?;
        polls += 1;

        if fresh.len() == items.len() {
            tracing::info!(items = items.len(), polls, "feed fully loaded");
            return Ok(RevealedFeed { items, polls });
        }

        tracing::debug!(items = fresh.len(), polls, "feed grew; scrolling again");
        items = fresh;
    }
}
