pub mod error;
pub mod extract;
#[cfg(any(test, feature = "test-support"))]
pub mod fake;
pub mod feed;
pub mod header;
pub mod post;
pub mod session;
pub mod webdriver;

pub use error::ScraperError;
pub use extract::{ContactFields, ContactPatterns};
pub use feed::{reveal_feed, FeedOptions, RevealedFeed};
pub use header::parse_header;
pub use post::{parse_post, parse_posts};
pub use session::{selectors, Session, SessionFactory};
pub use webdriver::{WebDriverClient, WebDriverSession, WebElement};
