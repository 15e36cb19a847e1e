//! Minimal W3C WebDriver client (chromedriver, geckodriver, Selenium Grid).
//!
//! Only the commands the channel parsers need are implemented. Every response
//! is a JSON object whose `value` field carries either the result or an
//! `{error, message}` pair on non-2xx status.

use std::time::Duration;

use reqwest::{Client, Method};
use serde_json::{json, Value};

use crate::error::ScraperError;
use crate::session::{Session, SessionFactory};

/// Key under which WebDriver serializes element references.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a5e6-4e49d2d7f7fa";

const SCROLL_INTO_VIEW_SCRIPT: &str = "arguments[0].scrollIntoView({block: 'end'});";

/// Opens Chrome sessions against a WebDriver endpoint.
#[derive(Debug)]
pub struct WebDriverClient {
    client: Client,
    base_url: String,
    headless: bool,
}

impl WebDriverClient {
    /// Creates a client for the WebDriver server at `base_url`.
    ///
    /// `timeout_secs` bounds every command, including page loads.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(base_url: &str, timeout_secs: u64, headless: bool) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            headless,
        })
    }

    fn capabilities(&self) -> Value {
        let mut args = vec!["--disable-gpu", "--window-size=1920,1080"];
        if self.headless {
            args.insert(0, "--headless");
        }
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args }
                }
            }
        })
    }
}

impl SessionFactory for WebDriverClient {
    type Session = WebDriverSession;

    async fn open(&self) -> Result<WebDriverSession, ScraperError> {
        let url = format!("{}/session", self.base_url);
        let value = send(&self.client, Method::POST, &url, Some(self.capabilities())).await?;

        let id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| ScraperError::Protocol {
                context: "new session",
                reason: "response has no sessionId".to_owned(),
            })?;

        tracing::debug!(session = id, "opened WebDriver session");
        Ok(WebDriverSession {
            client: self.client.clone(),
            session_url: format!("{url}/{id}"),
        })
    }
}

/// A page element reference, valid for the session that returned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebElement {
    id: String,
}

impl WebElement {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    fn to_json(&self) -> Value {
        json!({ ELEMENT_KEY: self.id() })
    }

    fn from_json(value: &Value) -> Result<Self, ScraperError> {
        value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(|id| Self { id: id.to_owned() })
            .ok_or_else(|| ScraperError::Protocol {
                context: "element reference",
                reason: format!("missing {ELEMENT_KEY}"),
            })
    }
}

/// One live browser session. Close it with [`Session::close`].
#[derive(Debug)]
pub struct WebDriverSession {
    client: Client,
    session_url: String,
}

impl WebDriverSession {
    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ScraperError> {
        let url = format!("{}{path}", self.session_url);
        send(&self.client, method, &url, body).await
    }

    fn locate_body(selector: &str) -> Value {
        json!({ "using": "css selector", "value": selector })
    }

    fn not_found_as(selector: &str, err: ScraperError) -> ScraperError {
        if err.is_no_such_element() {
            ScraperError::ElementNotFound {
                selector: selector.to_owned(),
            }
        } else {
            err
        }
    }
}

impl Session for WebDriverSession {
    type Element = WebElement;

    async fn goto(&self, url: &str) -> Result<(), ScraperError> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn set_implicit_wait(&self, wait: Duration) -> Result<(), ScraperError> {
        let implicit = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX);
        self.command(
            Method::POST,
            "/timeouts",
            Some(json!({ "implicit": implicit })),
        )
        .await?;
        Ok(())
    }

    async fn find(&self, selector: &str) -> Result<WebElement, ScraperError> {
        let value = self
            .command(Method::POST, "/element", Some(Self::locate_body(selector)))
            .await
            .map_err(|e| Self::not_found_as(selector, e))?;
        WebElement::from_json(&value)
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<WebElement>, ScraperError> {
        let value = self
            .command(Method::POST, "/elements", Some(Self::locate_body(selector)))
            .await?;
        let Value::Array(items) = value else {
            return Err(ScraperError::Protocol {
                context: "find elements",
                reason: "expected an array".to_owned(),
            });
        };
        items.iter().map(WebElement::from_json).collect()
    }

    async fn find_within(
        &self,
        parent: &WebElement,
        selector: &str,
    ) -> Result<WebElement, ScraperError> {
        let path = format!("/element/{}/element", parent.id());
        let value = self
            .command(Method::POST, &path, Some(Self::locate_body(selector)))
            .await
            .map_err(|e| Self::not_found_as(selector, e))?;
        WebElement::from_json(&value)
    }

    async fn text(&self, element: &WebElement) -> Result<String, ScraperError> {
        let path = format!("/element/{}/text", element.id());
        match self.command(Method::GET, &path, None).await? {
            Value::String(text) => Ok(text),
            other => Err(ScraperError::Protocol {
                context: "element text",
                reason: format!("expected a string, got {other}"),
            }),
        }
    }

    async fn attribute(
        &self,
        element: &WebElement,
        name: &str,
    ) -> Result<Option<String>, ScraperError> {
        let path = format!("/element/{}/attribute/{name}", element.id());
        match self.command(Method::GET, &path, None).await? {
            Value::Null => Ok(None),
            Value::String(value) => Ok(Some(value)),
            other => Ok(Some(other.to_string())),
        }
    }

    async fn scroll_into_view(&self, element: &WebElement) -> Result<(), ScraperError> {
        self.command(
            Method::POST,
            "/execute/sync",
            Some(json!({
                "script": SCROLL_INTO_VIEW_SCRIPT,
                "args": [element.to_json()]
            })),
        )
        .await?;
        Ok(())
    }

    async fn close(self) -> Result<(), ScraperError> {
        self.command(Method::DELETE, "", None).await?;
        tracing::debug!(session = %self.session_url, "closed WebDriver session");
        Ok(())
    }
}

/// Sends one WebDriver command and unwraps the `value` field of the reply.
async fn send(
    client: &Client,
    method: Method,
    url: &str,
    body: Option<Value>,
) -> Result<Value, ScraperError> {
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;

    let parsed: Value = if text.trim().is_empty() {
        Value::Null
    } else {
        match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(_) if !status.is_success() => {
                return Err(ScraperError::WebDriver {
                    status: status.as_u16(),
                    error: "unknown error".to_owned(),
                    message: text,
                });
            }
            Err(e) => {
                return Err(ScraperError::Deserialize {
                    context: format!("WebDriver response from {url}"),
                    source: e,
                });
            }
        }
    };

    let value = match parsed {
        Value::Object(mut map) => map.remove("value").unwrap_or(Value::Null),
        _ => Value::Null,
    };

    if !status.is_success() {
        let field = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned()
        };
        let error = field("error");
        return Err(ScraperError::WebDriver {
            status: status.as_u16(),
            error: if error.is_empty() {
                "unknown error".to_owned()
            } else {
                error
            },
            message: field("message"),
        });
    }

    Ok(value)
}
