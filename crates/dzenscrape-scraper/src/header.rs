//! Channel header parsing.

use std::time::Duration;

use dzenscrape_core::ProfileRecord;

use crate::error::ScraperError;
use crate::extract::ContactPatterns;
use crate::session::{selectors, Session};

/// Reads the profile header of the channel page the session is on.
///
/// Waits up to `wait` for elements to render. Contact details are searched in
/// the full text of the profile info block; the description has its line
/// breaks flattened to spaces; counters keep only their first line (the number,
/// without its caption).
///
/// # Errors
///
/// - [`ScraperError::ElementNotFound`] if the info block, title, or description
///   is missing.
/// - [`ScraperError::MissingCounters`] if fewer than two counters render.
/// - Any session error from the underlying driver.
pub async fn parse_header<S: Session>(
    session: &S,
    patterns: &ContactPatterns,
    wait: Duration,
) -> Result<ProfileRecord, ScraperError> {
    session.set_implicit_wait(wait).await?;

    let info = session.find(selectors::PROFILE_INFO).await?;
    let title_el = session.find(selectors::TITLE).await?;
    let title = session.text(&title_el).await?;

    let info_text = session.text(&info).await?;
    let contacts = patterns.extract(&info_text);

    let description_el = session.find(selectors::DESCRIPTION).await?;
    let description = session.text(&description_el).await?.replace('\n', " ");

    let counters = session.find_all(selectors::COUNTER).await?;
    let [subscribers_el, subscriptions_el, ..] = counters.as_slice() else {
        return Err(ScraperError::MissingCounters {
            found: counters.len(),
        });
    };
    let subscribers = first_line(&session.text(subscribers_el).await?);
    let subscriptions = first_line(&session.text(subscriptions_el).await?);

    tracing::info!(
        %title,
        email = ?contacts.email,
        %description,
        %subscribers,
        %subscriptions,
        url = ?contacts.url,
        phone = ?contacts.phone,
        "parsed channel header"
    );

    Ok(ProfileRecord {
        title,
        email: contacts.email,
        description,
        subscribers,
        subscriptions,
        url: contacts.url,
        phone: contacts.phone,
    })
}

fn first_line(text: &str) -> String {
    text.split('\n').next().unwrap_or_default().to_owned()
}
