//! Contact detail extraction from free-form profile text.
//!
//! All three patterns are case-insensitive and multi-line. The URL pattern is
//! anchored at both ends, so in multi-line mode it only matches a line that
//! consists of nothing but a URL; links embedded in a sentence are ignored.
//! The scheme is optional, so any line shaped like `word.tld` (a bare domain,
//! or a counter such as `1.2K`) is taken as the URL.

use regex::Regex;

use crate::error::ScraperError;

const EMAIL_PATTERN: &str = r"(?im)[^@\s]+@[^@\s]+\.[a-zA-Z0-9]+";

const URL_PATTERN: &str = r"(?im)^(?:https?://)?(?:www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b(?:[-a-zA-Z0-9()@:%_+.~#?&/=]*)$";

/// 3-3-4 and 3-4 digit groups, optional `-`, `.` or whitespace separators,
/// optional parenthesised area code.
const PHONE_PATTERN: &str = r"(?im)(\d{3}[-.\s]??\d{3}[-.\s]??\d{4}|\(\d{3}\)\s*\d{3}[-.\s]??\d{4}|\d{3}[-.\s]??\d{4})";

/// Contact details found in a block of text. Each is the first match, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub email: Option<String>,
    pub url: Option<String>,
    pub phone: Option<String>,
}

/// Compiled contact patterns. Build once at startup and share by reference.
#[derive(Debug, Clone)]
pub struct ContactPatterns {
    email: Regex,
    url: Regex,
    phone: Regex,
}

impl ContactPatterns {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidPattern`] if a pattern fails to compile.
    pub fn new() -> Result<Self, ScraperError> {
        Ok(Self {
            email: Regex::new(EMAIL_PATTERN)?,
            url: Regex::new(URL_PATTERN)?,
            phone: Regex::new(PHONE_PATTERN)?,
        })
    }

    #[must_use]
    pub fn email<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.email.find(text).map(|m| m.as_str())
    }

    #[must_use]
    pub fn url<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.url.find(text).map(|m| m.as_str())
    }

    #[must_use]
    pub fn phone<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.phone.find(text).map(|m| m.as_str())
    }

    /// Runs all three patterns over `text` independently.
    #[must_use]
    pub fn extract(&self, text: &str) -> ContactFields {
        ContactFields {
            email: self.email(text).map(str::to_owned),
            url: self.url(text).map(str::to_owned),
            phone: self.phone(text).map(str::to_owned),
        }
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
