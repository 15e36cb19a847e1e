use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::records::UserIdentifier;
use crate::ConfigError;

/// Postgres connection descriptor from the targets file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub database: String,
    pub host: String,
    pub port: u16,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &"[redacted]")
            .field("database", &self.database)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetsFile {
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub users: Vec<UserIdentifier>,
}

/// Load and validate the scrape targets from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_targets(path: &Path) -> Result<TargetsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TargetsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_targets(&content)
}

/// Parse and validate targets file contents.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_targets(content: &str) -> Result<TargetsFile, ConfigError> {
    let targets: TargetsFile =
        serde_yaml::from_str(content).map_err(ConfigError::TargetsFileParse)?;

    validate_targets(&targets)?;

    Ok(targets)
}

fn validate_targets(targets: &TargetsFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for user in &targets.users {
        if user.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user id must be non-empty".to_string(),
            ));
        }

        if !seen.insert((user.kind, user.id.as_str())) {
            return Err(ConfigError::Validation(format!(
                "duplicate user: '{user}'"
            )));
        }
    }

    if let Some(db) = &targets.database {
        if db.host.trim().is_empty() || db.database.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database host and name must be non-empty".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "targets_test.rs"]
mod tests;
