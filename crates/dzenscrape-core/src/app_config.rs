use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    /// Overrides the targets file `database` section when set.
    pub database_url: Option<String>,
    pub log_level: String,
    pub targets_path: PathBuf,
    pub root_url: String,
    pub webdriver_url: String,
    pub webdriver_headless: bool,
    pub webdriver_timeout_secs: u64,
    pub implicit_wait_secs: u64,
    pub scroll_pause_ms: u64,
    pub max_scroll_rounds: usize,
    pub max_concurrent_users: usize,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("log_level", &self.log_level)
            .field("targets_path", &self.targets_path)
            .field("root_url", &self.root_url)
            .field("webdriver_url", &self.webdriver_url)
            .field("webdriver_headless", &self.webdriver_headless)
            .field("webdriver_timeout_secs", &self.webdriver_timeout_secs)
            .field("implicit_wait_secs", &self.implicit_wait_secs)
            .field("scroll_pause_ms", &self.scroll_pause_ms)
            .field("max_scroll_rounds", &self.max_scroll_rounds)
            .field("max_concurrent_users", &self.max_concurrent_users)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
