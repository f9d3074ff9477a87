//! Cookie jar and anti-forgery token lookup.
//!
//! The backend expects the value of its CSRF cookie echoed back in a request
//! header on every chat POST. Cookies arrive either from configuration (a
//! `Cookie:`-style string) or from `Set-Cookie` headers seen during bootstrap.

use percent_encoding::percent_decode_str;

/// Default name of the CSRF cookie.
pub const DEFAULT_COOKIE_NAME: &str = "csrftoken";

/// Default header carrying the token.
pub const DEFAULT_HEADER_NAME: &str = "X-CSRFToken";

/// Look up `name` in a `Cookie:`-style string and percent-decode its value.
///
/// Matching is by exact name: `xcsrftoken=...` does not match `csrftoken`.
/// The first matching pair wins.
pub fn token_from_cookie_header(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|pair| {
        let value = pair.trim().strip_prefix(name)?.strip_prefix('=')?;
        Some(percent_decode_str(value).decode_utf8_lossy().into_owned())
    })
}

/// Ordered cookie store for a single origin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: Vec<(String, String)>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a jar from a `Cookie:`-style string (`a=1; b=2`).
    pub fn parse(header: &str) -> Self {
        let mut jar = Self::new();
        for pair in header.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=') {
                jar.insert(name.trim(), value.trim());
            }
        }
        jar
    }

    /// Insert or replace a cookie, keeping first-insertion order.
    pub fn insert(&mut self, name: &str, value: &str) {
        if name.is_empty() {
            return;
        }
        match self.cookies.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.cookies.push((name.to_string(), value.to_string())),
        }
    }

    /// Record the name/value pair of a `Set-Cookie` header. Attributes are ignored.
    pub fn store_set_cookie(&mut self, set_cookie: &str) {
        let pair = set_cookie.split(';').next().unwrap_or_default();
        if let Some((name, value)) = pair.trim().split_once('=') {
            self.insert(name.trim(), value.trim());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Render as a `Cookie:` header value.
    pub fn header_value(&self) -> String {
        self.cookies
            .iter()
            .map(|(n, v)| format!("{n}={v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Decoded value of the cookie called `name`.
    pub fn token(&self, name: &str) -> Option<String> {
        token_from_cookie_header(&self.header_value(), name)
    }
}
