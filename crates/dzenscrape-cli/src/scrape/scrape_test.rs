use std::time::Duration;

use dzenscrape_core::IdentifierKind;
use dzenscrape_scraper::fake::{FakeBrowser, FakePage, FakePost};
use dzenscrape_scraper::FeedOptions;

use super::runner::{scrape_all, ScrapeTotals};
use super::user::{scrape_user, ScrapeSettings};
use super::*;

const ROOT: &str = "https://dzen.ru";

fn settings() -> ScrapeSettings {
    ScrapeSettings {
        root_url: ROOT.to_string(),
        implicit_wait: Duration::ZERO,
        feed: FeedOptions {
            scroll_pause: Duration::ZERO,
            max_rounds: 20,
        },
    }
}

fn patterns() -> ContactPatterns {
    ContactPatterns::new().expect("contact patterns compile")
}

fn user(id: &str, kind: IdentifierKind) -> UserIdentifier {
    UserIdentifier {
        id: id.to_string(),
        kind,
    }
}

fn acme_page(posts: Vec<FakePost>) -> FakePage {
    FakePage::profile("Acme Feed", "Official", ["1,234", "56"]).with_posts(posts)
}

async fn post_titles(pool: &sqlx::PgPool, author: i64) -> Vec<String> {
    dzenscrape_db::list_posts_for_author(pool, author)
        .await
        .expect("list posts")
        .into_iter()
        .filter_map(|p| p.title)
        .collect()
}

// ---------------------------------------------------------------------------
// Target selection
// ---------------------------------------------------------------------------

#[test]
fn select_users_without_filter_keeps_all() {
    let users = vec![user("42", IdentifierKind::Id), user("acme", IdentifierKind::Channel)];
    let selected = select_users(users.clone(), None).unwrap();
    assert_eq!(selected, users);
}

#[test]
fn select_users_filters_by_id() {
    let users = vec![user("42", IdentifierKind::Id), user("acme", IdentifierKind::Channel)];
    let selected = select_users(users, Some("acme")).unwrap();
    assert_eq!(selected, vec![user("acme", IdentifierKind::Channel)]);
}

#[test]
fn select_users_unknown_filter_is_error() {
    let users = vec![user("42", IdentifierKind::Id)];
    let err = select_users(users, Some("nope")).unwrap_err();
    assert!(format!("{err}").contains("not found"), "got: {err}");
}

// ---------------------------------------------------------------------------
// Single-user pipeline
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn id_target_stores_profile_and_parsable_posts(pool: sqlx::PgPool) {
    let browser = FakeBrowser::new().with_page(
        "https://dzen.ru/id/42",
        acme_page(vec![
            FakePost::new("First", "one", "вчера", "https://dzen.ru/a/1"),
            FakePost::without_content("https://dzen.ru/a/2"),
            FakePost::new("Third", "three", "2 дня назад", "https://dzen.ru/a/3"),
        ]),
    );

    let report = scrape_user(
        &browser,
        &pool,
        &patterns(),
        &settings(),
        &user("42", IdentifierKind::Id),
    )
    .await
    .expect("scrape succeeds");

    assert_eq!(report.posts.pushed, 2);
    assert_eq!(report.posts.attempted, 3);
    assert!(!report.replaced);

    let profile = dzenscrape_db::get_profile_by_title(&pool, "Acme Feed")
        .await
        .expect("profile stored");
    assert_eq!(profile.id, report.profile_id);
    assert_eq!(profile.description.as_deref(), Some("Official"));
    assert_eq!(profile.subscribers.as_deref(), Some("1,234"));
    assert_eq!(profile.subscriptions.as_deref(), Some("56"));

    let profiles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM parsed_user")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(profiles, 1);
    assert_eq!(post_titles(&pool, profile.id).await, vec!["First", "Third"]);

    assert_eq!(browser.visited(), vec!["https://dzen.ru/id/42".to_string()]);
    assert_eq!(browser.opened(), 1);
    assert_eq!(browser.closed(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn rescrape_replaces_every_post(pool: sqlx::PgPool) {
    let first = FakeBrowser::new().with_page(
        "https://dzen.ru/id/42",
        acme_page(vec![
            FakePost::new("Old 1", "a", "вчера", "/a/1"),
            FakePost::new("Old 2", "b", "вчера", "/a/2"),
        ]),
    );
    let target = user("42", IdentifierKind::Id);
    let before = scrape_user(&first, &pool, &patterns(), &settings(), &target)
        .await
        .unwrap();

    let fresh: Vec<FakePost> = (1..=5)
        .map(|i| FakePost::new(&format!("New {i}"), "body", "сегодня", &format!("/b/{i}")))
        .collect();
    let second = FakeBrowser::new().with_page(
        "https://dzen.ru/id/42",
        acme_page(fresh).with_reveal(vec![2, 4, 5]),
    );
    let after = scrape_user(&second, &pool, &patterns(), &settings(), &target)
        .await
        .unwrap();

    assert!(after.replaced);
    assert_eq!(after.profile_id, before.profile_id);
    assert_eq!(after.posts.pushed, 5);

    let titles = post_titles(&pool, after.profile_id).await;
    assert_eq!(titles, vec!["New 1", "New 2", "New 3", "New 4", "New 5"]);
    assert!(titles.iter().all(|t| !t.starts_with("Old")));
}

#[sqlx::test(migrations = "../../migrations")]
async fn channel_target_uses_handle_path(pool: sqlx::PgPool) {
    let browser = FakeBrowser::new().with_page("https://dzen.ru/acme", acme_page(Vec::new()));

    let report = scrape_user(
        &browser,
        &pool,
        &patterns(),
        &settings(),
        &user("acme", IdentifierKind::Channel),
    )
    .await
    .expect("scrape succeeds");

    assert_eq!(report.posts.attempted, 0);
    assert_eq!(browser.visited(), vec!["https://dzen.ru/acme".to_string()]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn session_is_closed_when_header_is_missing(pool: sqlx::PgPool) {
    let mut page = acme_page(Vec::new());
    page.title = None;
    let browser = FakeBrowser::new().with_page("https://dzen.ru/id/42", page);

    let err = scrape_user(
        &browser,
        &pool,
        &patterns(),
        &settings(),
        &user("42", IdentifierKind::Id),
    )
    .await
    .unwrap_err();

    assert!(format!("{err:#}").contains("channel header"), "got: {err:#}");
    assert_eq!(browser.closed(), 1);

    let profiles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM parsed_user")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(profiles, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn session_is_closed_when_feed_never_settles(pool: sqlx::PgPool) {
    let posts: Vec<FakePost> = (0..10)
        .map(|i| FakePost::new(&format!("P{i}"), "b", "d", &format!("/a/{i}")))
        .collect();
    let browser = FakeBrowser::new().with_page(
        "https://dzen.ru/id/42",
        acme_page(posts).with_reveal((1..=10).collect()),
    );
    let mut tight = settings();
    tight.feed.max_rounds = 3;

    let err = scrape_user(
        &browser,
        &pool,
        &patterns(),
        &tight,
        &user("42", IdentifierKind::Id),
    )
    .await
    .unwrap_err();

    assert!(
        err.chain().any(|c| c.to_string().contains("still growing")),
        "got: {err:#}"
    );
    assert_eq!(browser.closed(), 1);
}

// ---------------------------------------------------------------------------
// Fan-out
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn one_failing_user_does_not_cancel_the_rest(pool: sqlx::PgPool) {
    let browser = FakeBrowser::new()
        .with_page(
            "https://dzen.ru/id/42",
            acme_page(vec![FakePost::new("A", "a", "d", "/a/1")]),
        )
        .with_page(
            "https://dzen.ru/other",
            FakePage::profile("Other", "Second channel", ["10", "2"])
                .with_posts(vec![FakePost::new("B", "b", "d", "/b/1")]),
        );
    let users = vec![
        user("42", IdentifierKind::Id),
        user("missing", IdentifierKind::Channel),
        user("other", IdentifierKind::Channel),
    ];

    let totals = scrape_all(&browser, &pool, &patterns(), &settings(), &users, 2)
        .await
        .expect("partial failure is not fatal");

    assert_eq!(
        totals,
        ScrapeTotals {
            succeeded: 2,
            failed: 1,
            pushed: 2,
            attempted: 2,
        }
    );
    assert_eq!(browser.opened(), 3);
    assert_eq!(browser.closed(), 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn all_users_failing_is_an_error(pool: sqlx::PgPool) {
    let browser = FakeBrowser::new();
    let users = vec![
        user("1", IdentifierKind::Id),
        user("2", IdentifierKind::Id),
    ];

    let err = scrape_all(&browser, &pool, &patterns(), &settings(), &users, 4)
        .await
        .unwrap_err();

    assert!(format!("{err}").contains("all 2 channels failed"), "got: {err}");
    assert_eq!(browser.closed(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn no_users_is_an_empty_success(pool: sqlx::PgPool) {
    let browser = FakeBrowser::new();

    let totals = scrape_all(&browser, &pool, &patterns(), &settings(), &[], 4)
        .await
        .unwrap();

    assert_eq!(totals, ScrapeTotals::default());
    assert_eq!(browser.opened(), 0);
}
