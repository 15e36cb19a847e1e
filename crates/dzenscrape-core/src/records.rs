use serde::{Deserialize, Serialize};

/// Profile data scraped from a channel's header block.
///
/// `title` is the identity key in the store: a second scrape of a channel with
/// the same display title reconciles onto the existing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub title: String,
    pub email: Option<String>,
    /// Channel description with newlines flattened to spaces.
    pub description: String,
    /// Subscriber counter as displayed, e.g. `"1,234"` or `"12 тыс."`.
    pub subscribers: String,
    /// Subscription counter as displayed.
    pub subscriptions: String,
    /// External site URL, when the profile text is a bare URL.
    pub url: Option<String>,
    pub phone: Option<String>,
}

/// One post parsed from a channel feed row.
///
/// The owning profile id is not part of the record; it is attached when the
/// post is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub title: String,
    pub description: String,
    /// Free-text relative timestamp, e.g. `"3 дня назад"`. Not validated.
    pub date: String,
    pub url: String,
}

/// How a target identifier is placed in the profile URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IdentifierKind {
    /// Numeric channel id, served under `/id/<id>`.
    Id,
    /// Any other handle, served directly under `/<handle>`.
    Channel,
}

impl From<String> for IdentifierKind {
    fn from(value: String) -> Self {
        if value == "id" {
            IdentifierKind::Id
        } else {
            IdentifierKind::Channel
        }
    }
}

impl From<IdentifierKind> for String {
    fn from(value: IdentifierKind) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentifierKind::Id => write!(f, "id"),
            IdentifierKind::Channel => write!(f, "channel"),
        }
    }
}

/// A channel to scrape, as listed in the targets file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserIdentifier {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: IdentifierKind,
}

impl UserIdentifier {
    /// Build the profile page URL under `root_url`.
    ///
    /// `Id` targets get an `/id` segment; channel handles do not.
    #[must_use]
    pub fn profile_url(&self, root_url: &str) -> String {
        let root = root_url.trim_end_matches('/');
        match self.kind {
            IdentifierKind::Id => format!("{root}/id/{}", self.id),
            IdentifierKind::Channel => format!("{root}/{}", self.id),
        }
    }
}

impl std::fmt::Display for UserIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
