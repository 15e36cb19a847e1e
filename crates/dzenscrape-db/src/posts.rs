//! Database operations for the `parsed_post` table.

use chrono::{DateTime, Utc};
use dzenscrape_core::PostRecord;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `parsed_post` table. `last` holds the post's relative date text.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub last: Option<String>,
    pub url: Option<String>,
    pub author: i64,
    pub created_at: DateTime<Utc>,
}

/// How many of a feed's items made it into the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushReport {
    pub pushed: usize,
    /// Every feed item, including ones that failed to parse.
    pub attempted: usize,
}

/// Inserts one post owned by `author` in its own transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including a dangling `author`).
pub async fn insert_post(pool: &PgPool, author: i64, post: &PostRecord) -> Result<i64, DbError> {
    let mut tx = pool.begin().await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO parsed_post (title, description, last, url, author) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id",
    )
    .bind(&post.title)
    .bind(&post.description)
    .bind(&post.date)
    .bind(&post.url)
    .bind(author)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(id)
}

/// Writes every parsed post for `author`, one transaction per post.
///
/// `None` entries are feed items that could not be parsed; they count towards
/// `attempted` only. A failed insert is logged and skipped, so the set as a
/// whole is not atomic.
pub async fn push_posts(pool: &PgPool, author: i64, posts: &[Option<PostRecord>]) -> PushReport {
    let mut report = PushReport {
        pushed: 0,
        attempted: posts.len(),
    };

    for post in posts.iter().flatten() {
        match insert_post(pool, author, post).await {
            Ok(_) => report.pushed += 1,
            Err(e) => {
                tracing::warn!(author, title = %post.title, error = %e, "failed to insert post");
            }
        }
    }

    tracing::info!(
        author,
        pushed = report.pushed,
        attempted = report.attempted,
        "pushed posts"
    );
    report
}

/// Returns all posts owned by `author`, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_posts_for_author(pool: &PgPool, author: i64) -> Result<Vec<PostRow>, DbError> {
    let rows = sqlx::query_as::<_, PostRow>(
        "SELECT id, title, description, last, url, author, created_at \
         FROM parsed_post \
         WHERE author = $1 \
         ORDER BY id",
    )
    .bind(author)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the number of posts owned by `author`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_posts_for_author(pool: &PgPool, author: i64) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM parsed_post WHERE author = $1")
        .bind(author)
        .fetch_one(pool)
        .await?;

    Ok(count)
}
