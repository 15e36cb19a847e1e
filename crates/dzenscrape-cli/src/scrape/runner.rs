//! Concurrent fan-out over every target channel.

use futures::stream::{self, StreamExt};
use sqlx::PgPool;

use dzenscrape_core::UserIdentifier;
use dzenscrape_scraper::{ContactPatterns, SessionFactory};

use super::user::{scrape_user, ScrapeSettings};

/// Aggregated outcome of [`scrape_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ScrapeTotals {
    pub succeeded: usize,
    pub failed: usize,
    pub pushed: usize,
    pub attempted: usize,
}

/// Runs [`scrape_user`] for every target, at most `max_concurrent` at a time.
///
/// Every result is collected; a failing user is logged and never cancels the
/// others.
///
/// # Errors
///
/// Returns an error only if every user failed.
pub(crate) async fn scrape_all<F: SessionFactory>(
    factory: &F,
    pool: &PgPool,
    patterns: &ContactPatterns,
    settings: &ScrapeSettings,
    users: &[UserIdentifier],
    max_concurrent: usize,
) -> anyhow::Result<ScrapeTotals> {
    let results: Vec<_> = stream::iter(users)
        .map(|user| async move {
            let outcome = scrape_user(factory, pool, patterns, settings, user).await;
            (user, outcome)
        })
        .buffer_unordered(max_concurrent.max(1))
        .collect()
        .await;

    let mut totals = ScrapeTotals::default();
    for (user, outcome) in &results {
        match outcome {
            Ok(report) => {
                tracing::info!(
                    %user,
                    profile_id = report.profile_id,
                    replaced = report.replaced,
                    pushed = report.posts.pushed,
                    attempted = report.posts.attempted,
                    "channel scraped"
                );
                totals.succeeded += 1;
                totals.pushed += report.posts.pushed;
                totals.attempted += report.posts.attempted;
            }
            Err(e) => {
                let message = format!("{e:#}");
                tracing::error!(%user, error = %message, "channel scrape failed");
                totals.failed += 1;
            }
        }
    }

    if totals.failed > 0 {
        tracing::warn!(
            failed_users = totals.failed,
            total_users = users.len(),
            "some channels failed"
        );
    }

    if !users.is_empty() && totals.failed == users.len() {
        anyhow::bail!("all {} channels failed", totals.failed);
    }

    Ok(totals)
}
