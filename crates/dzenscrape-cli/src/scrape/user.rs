//! The per-channel pipeline: header, profile reconcile, feed, posts.

use std::time::Duration;

use anyhow::Context;
use dzenscrape_core::{AppConfig, UserIdentifier};
use dzenscrape_db::PushReport;
use dzenscrape_scraper::{
    parse_header, parse_posts, reveal_feed, ContactPatterns, FeedOptions, Session, SessionFactory,
};
use sqlx::PgPool;

/// Knobs shared by every user pipeline in a run.
#[derive(Debug, Clone)]
pub(crate) struct ScrapeSettings {
    pub root_url: String,
    pub implicit_wait: Duration,
    pub feed: FeedOptions,
}

impl ScrapeSettings {
    pub(crate) fn from_app_config(config: &AppConfig) -> Self {
        Self {
            root_url: config.root_url.clone(),
            implicit_wait: Duration::from_secs(config.implicit_wait_secs),
            feed: FeedOptions {
                scroll_pause: Duration::from_millis(config.scroll_pause_ms),
                max_rounds: config.max_scroll_rounds,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct UserReport {
    pub profile_id: i64,
    /// The title already existed and its old posts were replaced.
    pub replaced: bool,
    pub posts: PushReport,
}

/// Scrapes one channel in a fresh browser session.
///
/// The session is closed whether or not the pipeline succeeds. A failure to
/// close is logged and does not replace the pipeline's own result.
pub(crate) async fn scrape_user<F: SessionFactory>(
    factory: &F,
    pool: &PgPool,
    patterns: &ContactPatterns,
    settings: &ScrapeSettings,
    user: &UserIdentifier,
) -> anyhow::Result<UserReport> {
    let session = factory
        .open()
        .await
        .with_context(|| format!("opening browser session for {user}"))?;

    let result = run_pipeline(&session, pool, patterns, settings, user).await;

    if let Err(e) = session.close().await {
        tracing::warn!(%user, error = %e, "failed to close browser session");
    }
    result
}

async fn run_pipeline<S: Session>(
    session: &S,
    pool: &PgPool,
    patterns: &ContactPatterns,
    settings: &ScrapeSettings,
    user: &UserIdentifier,
) -> anyhow::Result<UserReport> {
    let url = user.profile_url(&settings.root_url);
    tracing::info!(%user, %url, "scraping channel");

    session
        .goto(&url)
        .await
        .with_context(|| format!("navigating to {url}"))?;

    let profile = parse_header(session, patterns, settings.implicit_wait)
        .await
        .with_context(|| format!("parsing channel header for {user}"))?;

    let resolution = dzenscrape_db::reconcile_profile(pool, &profile)
        .await
        .with_context(|| format!("storing profile \"{}\"", profile.title))?;
    if resolution.replaced {
        tracing::info!(
            %user,
            profile_id = resolution.id,
            deleted_posts = resolution.deleted_posts,
            "profile already stored; replacing its posts"
        );
    }

    let feed = reveal_feed(session, settings.feed)
        .await
        .with_context(|| format!("loading feed for {user}"))?;
    tracing::info!(%user, items = feed.items.len(), polls = feed.polls, "feed revealed");

    let posts = parse_posts(session, &feed.items)
        .await
        .with_context(|| format!("parsing posts for {user}"))?;

    let report = dzenscrape_db::push_posts(pool, resolution.id, &posts).await;

    Ok(UserReport {
        profile_id: resolution.id,
        replaced: resolution.replaced,
        posts: report,
    })
}
