//! Pool construction from whichever database descriptor is configured.

use dzenscrape_core::{AppConfig, ConfigError, DatabaseConfig};
use dzenscrape_db::PoolConfig;
use sqlx::PgPool;

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum DatabaseSource<'a> {
    Url(&'a str),
    Descriptor(&'a DatabaseConfig),
}

/// `DATABASE_URL` wins over the targets file `database` section.
pub(crate) fn database_source<'a>(
    config: &'a AppConfig,
    file_db: Option<&'a DatabaseConfig>,
) -> Result<DatabaseSource<'a>, ConfigError> {
    if let Some(url) = config.database_url.as_deref() {
        return Ok(DatabaseSource::Url(url));
    }
    file_db
        .map(DatabaseSource::Descriptor)
        .ok_or(ConfigError::MissingDatabase)
}

pub(crate) async fn connect(
    config: &AppConfig,
    file_db: Option<&DatabaseConfig>,
) -> anyhow::Result<PgPool> {
    let pool_config = PoolConfig::from_app_config(config);
    let pool = match database_source(config, file_db)? {
        DatabaseSource::Url(url) => dzenscrape_db::connect_pool(url, pool_config).await?,
        DatabaseSource::Descriptor(db) => {
            tracing::debug!(host = %db.host, database = %db.database, "connecting from targets file");
            dzenscrape_db::connect_pool_with(db, pool_config).await?
        }
    };
    Ok(pool)
}
