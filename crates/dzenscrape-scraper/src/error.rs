use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("WebDriver error (status {status}) {error}: {message}")]
    WebDriver {
        status: u16,
        error: String,
        message: String,
    },

    #[error("malformed WebDriver response for {context}: {reason}")]
    Protocol {
        context: &'static str,
        reason: String,
    },

    #[error("element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("expected 2 profile counters, found {found}")]
    MissingCounters { found: usize },

    #[error("post content has {lines} line(s); need title, description, and date")]
    MalformedPost { lines: usize },

    #[error("feed still growing after {max_rounds} scroll rounds ({loaded} items loaded)")]
    FeedLoadTimeout { max_rounds: usize, loaded: usize },

    #[error("invalid contact pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl ScraperError {
    /// `true` for the W3C `no such element` error code.
    #[must_use]
    pub fn is_no_such_element(&self) -> bool {
        matches!(self, ScraperError::WebDriver { error, .. } if error == "no such element")
    }
}
