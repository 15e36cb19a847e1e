//! Database operations for the `parsed_user` table.
//!
//! Profiles are keyed by display title. A scrape that lands on an existing
//! title reuses that row's id and clears its posts so the caller can write the
//! fresh feed in their place.

use chrono::{DateTime, Utc};
use dzenscrape_core::ProfileRecord;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `parsed_user` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub url: Option<String>,
    pub subscribers: Option<String>,
    pub subscriptions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The profile id a scrape resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileResolution {
    pub id: i64,
    /// `true` when the title already existed and its posts were cleared.
    pub replaced: bool,
    /// Number of stale posts deleted on the conflict path.
    pub deleted_posts: u64,
}

// ---------------------------------------------------------------------------
// Reconcile
// ---------------------------------------------------------------------------

/// Inserts `profile`, or reconciles it onto an existing row with the same title.
///
/// The insert runs in its own transaction. If it fails on the `title` unique
/// constraint, a second transaction looks the existing id up, refreshes the
/// stored profile columns, and deletes every post that row owns.
///
/// # Errors
///
/// Returns [`DbError::UnresolvedProfile`] if neither path yields an id (the
/// conflicting row vanished between the two transactions), or
/// [`DbError::Sqlx`] for any other database failure.
pub async fn reconcile_profile(
    pool: &PgPool,
    profile: &ProfileRecord,
) -> Result<ProfileResolution, DbError> {
    match insert_profile(pool, profile).await {
        Ok(id) => {
            tracing::debug!(title = %profile.title, id, "inserted new profile");
            return Ok(ProfileResolution {
                id,
                replaced: false,
                deleted_posts: 0,
            });
        }
        Err(sqlx::Error::Database(ref err)) if err.is_unique_violation() => {
            tracing::debug!(title = %profile.title, "profile title exists; reconciling");
        }
        Err(err) => return Err(err.into()),
    }

    let (id, deleted_posts) = claim_existing_profile(pool, profile)
        .await?
        .ok_or_else(|| DbError::UnresolvedProfile {
            title: profile.title.clone(),
        })?;

    tracing::info!(
        title = %profile.title,
        id,
        deleted_posts,
        "reusing existing profile; previous posts cleared"
    );

    Ok(ProfileResolution {
        id,
        replaced: true,
        deleted_posts,
    })
}

async fn insert_profile(pool: &PgPool, profile: &ProfileRecord) -> Result<i64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO parsed_user \
             (title, description, email, phone, url, subscribers, subscriptions) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id",
    )
    .bind(&profile.title)
    .bind(&profile.description)
    .bind(&profile.email)
    .bind(&profile.phone)
    .bind(&profile.url)
    .bind(&profile.subscribers)
    .bind(&profile.subscriptions)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(id)
}

/// Resolves the existing row for `profile.title`, refreshes it, and deletes
/// its posts, all in one transaction. Returns `None` if no row has the title.
async fn claim_existing_profile(
    pool: &PgPool,
    profile: &ProfileRecord,
) -> Result<Option<(i64, u64)>, DbError> {
    let mut tx = pool.begin().await?;

    let Some(id) = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM parsed_user WHERE title = $1 FOR UPDATE",
    )
    .bind(&profile.title)
    .fetch_optional(&mut *tx)
    .await?
    else {
        return Ok(None);
    };

    sqlx::query(
        "UPDATE parsed_user \
         SET description = $1, email = $2, phone = $3, url = $4, \
             subscribers = $5, subscriptions = $6, updated_at = NOW() \
         WHERE id = $7",
    )
    .bind(&profile.description)
    .bind(&profile.email)
    .bind(&profile.phone)
    .bind(&profile.url)
    .bind(&profile.subscribers)
    .bind(&profile.subscriptions)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let deleted = sqlx::query("DELETE FROM parsed_post WHERE author = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;
    Ok(Some((id, deleted)))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns the id of the profile with `title`, or `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_profile_id_by_title(pool: &PgPool, title: &str) -> Result<Option<i64>, DbError> {
    let id = sqlx::query_scalar::<_, i64>("SELECT id FROM parsed_user WHERE title = $1")
        .bind(title)
        .fetch_optional(pool)
        .await?;

    Ok(id)
}

/// Fetches the full profile row for `title`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has the title, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn get_profile_by_title(pool: &PgPool, title: &str) -> Result<ProfileRow, DbError> {
    let row = sqlx::query_as::<_, ProfileRow>(
        "SELECT id, title, description, email, phone, url, subscribers, subscriptions, \
                created_at, updated_at \
         FROM parsed_user \
         WHERE title = $1",
    )
    .bind(title)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}
