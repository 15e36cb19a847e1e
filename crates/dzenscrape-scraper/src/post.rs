//! Feed card parsing.

use dzenscrape_core::PostRecord;
use futures::future::try_join_all;

use crate::error::ScraperError;
use crate::session::{selectors, Session};

/// Parses one feed row into a post.
///
/// Returns `Ok(None)` when the row lacks its content block, its link, or the
/// link's `href`. Such rows are logged and skipped by the caller.
///
/// # Errors
///
/// Returns [`ScraperError::MalformedPost`] when the content block is present
/// but has fewer than three lines, and passes through any other session error.
pub async fn parse_post<S: Session>(
    session: &S,
    row: &S::Element,
) -> Result<Option<PostRecord>, ScraperError> {
    let content = match session.find_within(row, selectors::POST_CONTENT).await {
        Ok(el) => el,
        Err(ScraperError::ElementNotFound { selector }) => {
            tracing::warn!(%selector, "broken post");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    let text = session.text(&content).await?;

    let link = match session.find_within(row, selectors::POST_LINK).await {
        Ok(el) => el,
        Err(ScraperError::ElementNotFound { selector }) => {
            tracing::warn!(%selector, "broken post");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    let Some(url) = session.attribute(&link, "href").await? else {
        tracing::warn!("broken post: link has no href");
        return Ok(None);
    };

    let lines: Vec<&str> = text.split('\n').collect();
    let [title, description, date, ..] = lines.as_slice() else {
        return Err(ScraperError::MalformedPost { lines: lines.len() });
    };

    Ok(Some(PostRecord {
        title: (*title).to_owned(),
        description: (*description).to_owned(),
        date: (*date).to_owned(),
        url,
    }))
}

/// Parses every row concurrently, preserving row order in the result.
///
/// # Errors
///
/// Fails fast with the first error from [`parse_post`].
pub async fn parse_posts<S: Session>(
    session: &S,
    rows: &[S::Element],
) -> Result<Vec<Option<PostRecord>>, ScraperError> {
    try_join_all(rows.iter().map(|row| parse_post(session, row))).await
}
