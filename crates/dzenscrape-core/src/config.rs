use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(invalid(var, format!("expected a boolean, got \"{raw}\""))),
        }
    };

    let database_url = lookup("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());
    let log_level = or_default("DZEN_LOG_LEVEL", "info");
    let targets_path = PathBuf::from(or_default("DZEN_TARGETS_PATH", "./config/targets.yaml"));

    let root_url = or_default("DZEN_ROOT_URL", "https://dzen.ru");
    if !root_url.starts_with("http://") && !root_url.starts_with("https://") {
        return Err(invalid(
            "DZEN_ROOT_URL",
            format!("expected an http(s) URL, got \"{root_url}\""),
        ));
    }

    let webdriver_url = or_default("DZEN_WEBDRIVER_URL", "http://localhost:9515");
    let webdriver_headless = parse_bool("DZEN_WEBDRIVER_HEADLESS", "true")?;
    let webdriver_timeout_secs = parse_u64("DZEN_WEBDRIVER_TIMEOUT_SECS", "60")?;
    let implicit_wait_secs = parse_u64("DZEN_IMPLICIT_WAIT_SECS", "5")?;
    let scroll_pause_ms = parse_u64("DZEN_SCROLL_PAUSE_MS", "1000")?;
    let max_scroll_rounds = parse_usize("DZEN_MAX_SCROLL_ROUNDS", "500")?.max(1);
    let max_concurrent_users = parse_usize("DZEN_MAX_CONCURRENT_USERS", "4")?.max(1);

    let db_max_connections = parse_u32("DZEN_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("DZEN_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("DZEN_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        log_level,
        targets_path,
        root_url,
        webdriver_url,
        webdriver_headless,
        webdriver_timeout_secs,
        implicit_wait_secs,
        scroll_pause_ms,
        max_scroll_rounds,
        max_concurrent_users,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
