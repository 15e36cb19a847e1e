//! `dzenscrape scrape`: load targets, connect, fan out over channels.

mod runner;
mod user;

use dzenscrape_core::{AppConfig, UserIdentifier};
use dzenscrape_scraper::{ContactPatterns, WebDriverClient};

use crate::store;

/// Picks the targets to scrape. `filter` matches on the identifier's `id`.
///
/// # Errors
///
/// Returns an error if `filter` matches no target.
fn select_users(
    users: Vec<UserIdentifier>,
    filter: Option<&str>,
) -> anyhow::Result<Vec<UserIdentifier>> {
    let Some(id) = filter else {
        return Ok(users);
    };
    let selected: Vec<_> = users.into_iter().filter(|u| u.id == id).collect();
    if selected.is_empty() {
        anyhow::bail!("user '{id}' not found in targets file");
    }
    Ok(selected)
}

/// Scrapes every target in the configured targets file.
///
/// # Errors
///
/// Returns an error if the targets file or database cannot be loaded, the
/// WebDriver client cannot be built, or every channel failed.
pub(crate) async fn run_scrape(
    config: &AppConfig,
    user_filter: Option<&str>,
) -> anyhow::Result<()> {
    let targets = dzenscrape_core::load_targets(&config.targets_path)?;
    let users = select_users(targets.users, user_filter)?;
    if users.is_empty() {
        tracing::info!(
            path = %config.targets_path.display(),
            "no users configured; nothing to scrape"
        );
        return Ok(());
    }

    let pool = store::connect(config, targets.database.as_ref()).await?;
    let patterns = ContactPatterns::new()?;
    let browser = WebDriverClient::new(
        &config.webdriver_url,
        config.webdriver_timeout_secs,
        config.webdriver_headless,
    )?;
    let settings = user::ScrapeSettings::from_app_config(config);

    tracing::info!(
        users = users.len(),
        max_concurrent = config.max_concurrent_users,
        webdriver = %config.webdriver_url,
        "starting scrape"
    );

    let result = runner::scrape_all(
        &browser,
        &pool,
        &patterns,
        &settings,
        &users,
        config.max_concurrent_users,
    )
    .await;
    pool.close().await;
    let totals = result?;

    println!(
        "scraped {}/{} channels; stored {} of {} posts",
        totals.succeeded,
        users.len(),
        totals.pushed,
        totals.attempted
    );
    Ok(())
}

#[cfg(test)]
#[path = "scrape_test.rs"]
mod tests;
