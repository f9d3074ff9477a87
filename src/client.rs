//! HTTP transport for the chat endpoint.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{ClientConfig, CsrfConfig};
use crate::csrf::CookieJar;
use crate::error::{Error, Result};
use crate::protocol::{ChatReply, ChatRequest};

/// Redirect hops followed while bootstrapping, matching reqwest's default limit.
const MAX_BOOTSTRAP_REDIRECTS: usize = 10;

/// Sends one chat request and returns the parsed reply.
///
/// The widget controller only depends on this trait, so tests and embedders
/// can swap the network for anything that produces a [`ChatReply`].
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply>;
}

/// Chat client backed by `reqwest`.
///
/// # Example
///
/// ```rust,no_run
/// use coursechat_widget::client::{ChatTransport, HttpChatClient};
/// use coursechat_widget::protocol::ChatRequest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpChatClient::new("http://localhost:8000")?;
/// client.bootstrap().await?;
/// let reply = client.send(&ChatRequest::with_mode("What is recursion?", false)).await?;
/// println!("{:?}", reply.answer);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct HttpChatClient {
    base_url: Url,
    chat_path: String,
    page_path: String,
    csrf: CsrfConfig,
    http: reqwest::Client,
    /// Never follows redirects, so each hop's `Set-Cookie` is seen.
    page_http: reqwest::Client,
    jar: RwLock<CookieJar>,
}

impl HttpChatClient {
    /// Create a client with default paths and cookie names.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let client = ClientConfig {
            base_url: base_url.as_ref().to_string(),
            ..ClientConfig::default()
        };
        Self::from_config(&client, &CsrfConfig::default())
    }

    /// Create a client from loaded configuration.
    pub fn from_config(client: &ClientConfig, csrf: &CsrfConfig) -> Result<Self> {
        Self::with_client(client, csrf, client_builder(client).build()?)
    }

    /// Create a client with a custom reqwest client for chat requests.
    ///
    /// The bootstrap GET always uses an internal client that does not follow
    /// redirects on its own.
    pub fn with_client(client: &ClientConfig, csrf: &CsrfConfig, http: reqwest::Client) -> Result<Self> {
        let base_url = Url::parse(&client.base_url)?;
        // Fail on unjoinable paths now rather than on the first send.
        base_url.join(&client.chat_path)?;
        base_url.join(&client.page_path)?;

        let jar = csrf.cookie.as_deref().map(CookieJar::parse).unwrap_or_default();
        let page_http = client_builder(client)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            base_url,
            chat_path: client.chat_path.clone(),
            page_path: client.page_path.clone(),
            csrf: csrf.clone(),
            http,
            page_http,
            jar: RwLock::new(jar),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Current CSRF token, if the cookie is known.
    pub fn csrf_token(&self) -> Option<String> {
        self.jar
            .read()
            .ok()
            .and_then(|jar| jar.token(&self.csrf.cookie_name))
    }

    /// Load the chat page once so the server can issue its cookies.
    ///
    /// Redirects (a login page, a trailing-slash fix) are followed by hand so
    /// cookies set on every hop are captured and sent on the next one. Only
    /// same-origin hops are followed, at most ten of them.
    ///
    /// Returns whether a CSRF token is known afterwards.
    pub async fn bootstrap(&self) -> Result<bool> {
        let mut url = self.url(&self.page_path)?;
        let mut hops = 0;
        let status = loop {
            let mut request = self.page_http.get(url.clone());
            if let Some(cookie) = self.cookie_header() {
                request = request.header(COOKIE, cookie);
            }
            let response = request.send().await?;
            self.remember_cookies(&response);

            let status = response.status();
            let Some(next) = self.redirect_target(&url, &response) else {
                break status;
            };
            if hops == MAX_BOOTSTRAP_REDIRECTS {
                warn!(name: "chat.bootstrap.too_many_redirects", url = %url, "Stopped following redirects");
                break status;
            }
            hops += 1;
            debug!(name: "chat.bootstrap.redirected", from = %url, to = %next, status = status.as_u16(), "Following redirect");
            url = next;
        };

        let has_token = self.csrf_token().is_some();
        info!(
            name: "chat.bootstrap.completed",
            url = %url,
            status = status.as_u16(),
            redirects = hops,
            has_token,
            "Chat page loaded"
        );
        Ok(has_token)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn cookie_header(&self) -> Option<String> {
        let jar = self.jar.read().ok()?;
        (!jar.is_empty()).then(|| jar.header_value())
    }

    fn redirect_target(&self, from: &Url, response: &reqwest::Response) -> Option<Url> {
        if !response.status().is_redirection() {
            return None;
        }
        let location = response.headers().get(LOCATION)?.to_str().ok()?;
        let next = from.join(location).ok()?;
        if next.origin() == self.base_url.origin() {
            Some(next)
        } else {
            debug!(name: "chat.bootstrap.offsite_redirect", to = %next, "Not following redirect to another origin");
            None
        }
    }

    fn remember_cookies(&self, response: &reqwest::Response) {
        let Ok(mut jar) = self.jar.write() else {
            warn!(name: "chat.cookies.poisoned", "Cookie jar lock poisoned; dropping Set-Cookie");
            return;
        };
        for value in response.headers().get_all(SET_COOKIE) {
            if let Ok(value) = value.to_str() {
                jar.store_set_cookie(value);
            }
        }
    }
}

fn client_builder(client: &ClientConfig) -> reqwest::ClientBuilder {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = client.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
}

#[async_trait]
impl ChatTransport for HttpChatClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply> {
        let url = self.url(&self.chat_path)?;
        let mut builder = self
            .http
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(request);

        match self.csrf_token() {
            Some(token) => builder = builder.header(self.csrf.header_name.as_str(), token),
            None => debug!(name: "chat.csrf.missing", cookie = %self.csrf.cookie_name, "No CSRF cookie; sending without token"),
        }
        if let Some(cookie) = self.cookie_header() {
            builder = builder.header(COOKIE, cookie);
        }

        info!(
            name: "chat.request.sent",
            url = %url,
            query_len = request.query.len(),
            bangla_mode = ?request.bangla_mode,
            "Sending chat request"
        );

        let response = builder.send().await?;
        self.remember_cookies(&response);

        let status = response.status();
        let body = response.bytes().await?;
        let value: serde_json::Value = serde_json::from_slice(&body).map_err(|source| Error::Decode {
            status: status.as_u16(),
            source,
        })?;

        debug!(name: "chat.response.received", status = status.as_u16(), bytes = body.len(), "Chat response received");
        Ok(ChatReply::from_value(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(matches!(
            HttpChatClient::new("not a url"),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_seeds_jar_from_config() {
        let csrf = CsrfConfig {
            cookie: Some("sessionid=s1; csrftoken=abc%3D".to_string()),
            ..CsrfConfig::default()
        };
        let client = HttpChatClient::from_config(&ClientConfig::default(), &csrf).unwrap();
        assert_eq!(client.csrf_token().as_deref(), Some("abc="));
        assert_eq!(
            client.cookie_header().as_deref(),
            Some("sessionid=s1; csrftoken=abc%3D")
        );
    }

    #[test]
    fn test_no_cookie_no_token() {
        let client = HttpChatClient::new("http://localhost:8000").unwrap();
        assert_eq!(client.csrf_token(), None);
        assert_eq!(client.cookie_header(), None);
    }

    #[test]
    fn test_endpoint_join() {
        let client = HttpChatClient::new("http://localhost:8000/").unwrap();
        assert_eq!(
            client.url("/api/chat/").unwrap().as_str(),
            "http://localhost:8000/api/chat/"
        );
    }
}
