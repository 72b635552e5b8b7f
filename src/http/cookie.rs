// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Shared cookie jar
//!
//! A [`CookieJar`] placed in the request options is handed to the transport
//! as its cookie store, so every exchange made with that jar reads and
//! updates the same cookies. Cloning a jar shares its storage.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use url::Url;

/// A single HTTP cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Domain the cookie belongs to, without a leading dot
    pub domain: String,
    pub path: String,
    /// Expiration time (None = session cookie)
    pub expires: Option<DateTime<Utc>>,
    /// Only sent over https
    pub secure: bool,
}

impl Cookie {
    /// Create a session cookie valid for every path
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: "/".to_string(),
            expires: None,
            secure: false,
        }
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into().trim_start_matches('.').to_string();
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn is_expired(&self) -> bool {
        self.expires.map_or(false, |exp| exp <= Utc::now())
    }

    /// Check if the cookie should be sent to `url`
    pub fn matches(&self, url: &Url) -> bool {
        let host = url.host_str().unwrap_or("");
        let domain_ok = self.domain.is_empty()
            || host == self.domain
            || host.ends_with(&format!(".{}", self.domain));

        domain_ok
            && url.path().starts_with(&self.path)
            && (!self.secure || url.scheme() == "https")
            && !self.is_expired()
    }

    /// Parse a Set-Cookie header value received from `url`
    pub fn parse(header: &str, url: &Url) -> Option<Self> {
        let mut parts = header.split(';');
        let (name, value) = parts.next()?.trim().split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut cookie = Cookie::new(name, value.trim()).domain(url.host_str().unwrap_or(""));

        for part in parts {
            let part = part.trim();
            match part.split_once('=') {
                Some((attr, val)) => {
                    let val = val.trim();
                    match attr.trim().to_ascii_lowercase().as_str() {
                        "domain" if !val.is_empty() => cookie = cookie.domain(val),
                        "path" if val.starts_with('/') => cookie.path = val.to_string(),
                        "expires" => {
                            if let Ok(dt) = DateTime::parse_from_rfc2822(val) {
                                cookie.expires = Some(dt.with_timezone(&Utc));
                            }
                        }
                        "max-age" => {
                            if let Ok(secs) = val.parse::<i64>() {
                                cookie.expires = Some(max_age_expiry(secs));
                            }
                        }
                        _ => {}
                    }
                }
                None if part.eq_ignore_ascii_case("secure") => cookie.secure = true,
                None => {}
            }
        }

        Some(cookie)
    }

    /// Cookie header fragment (`name=value`)
    pub fn to_header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Expiry for a Max-Age attribute; non-positive means already expired and
/// values past chrono's range saturate
fn max_age_expiry(secs: i64) -> DateTime<Utc> {
    if secs <= 0 {
        return DateTime::<Utc>::MIN_UTC;
    }
    Duration::try_seconds(secs)
        .and_then(|delta| Utc::now().checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Thread-safe cookie storage
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    /// Cookies stored by domain
    cookies: Arc<DashMap<String, Vec<Cookie>>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cookie, replacing one with the same name and path.
    /// Expired cookies delete their stored counterpart.
    pub fn add(&self, cookie: Cookie) {
        let mut entry = self.cookies.entry(cookie.domain.clone()).or_default();
        entry.retain(|c| c.name != cookie.name || c.path != cookie.path);
        if !cookie.is_expired() {
            entry.push(cookie);
        }
    }

    /// Add a cookie from a Set-Cookie header
    pub fn add_from_header(&self, header: &str, url: &Url) {
        if let Some(cookie) = Cookie::parse(header, url) {
            self.add(cookie);
        }
    }

    /// All live cookies for a URL
    pub fn get_cookies(&self, url: &Url) -> Vec<Cookie> {
        self.cookies
            .iter()
            .flat_map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|c| c.matches(url))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Cookie header value for a URL
    pub fn get_cookie_header(&self, url: &Url) -> Option<String> {
        let cookies = self.get_cookies(url);
        if cookies.is_empty() {
            return None;
        }

        Some(
            cookies
                .iter()
                .map(Cookie::to_header_value)
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    pub fn clear(&self) {
        self.cookies.clear();
    }

    /// Total cookie count
    pub fn len(&self) -> usize {
        self.cookies.iter().map(|e| e.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identity of the shared storage; clones of one jar report the same id
    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.cookies) as usize
    }

    /// Export all cookies as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        let all: Vec<Cookie> = self
            .cookies
            .iter()
            .flat_map(|e| e.value().clone())
            .collect();
        serde_json::to_string(&all)
    }

    /// Import cookies from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let cookies: Vec<Cookie> = serde_json::from_str(json)?;
        let jar = CookieJar::new();
        for cookie in cookies {
            jar.add(cookie);
        }
        Ok(jar)
    }
}

impl CookieStore for CookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        for header in cookie_headers {
            if let Ok(value) = header.to_str() {
                self.add_from_header(value, url);
            }
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.get_cookie_header(url)
            .and_then(|value| HeaderValue::from_str(&value).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_parsing() {
        let url = Url::parse("https://example.com/path").unwrap();
        let header = "session=abc123; Domain=.example.com; Path=/; Secure; HttpOnly";
        let cookie = Cookie::parse(header, &url).unwrap();

        assert_eq!(cookie.name, "session");
        assert_eq!(cookie.value, "abc123");
        assert_eq!(cookie.domain, "example.com");
        assert_eq!(cookie.path, "/");
        assert!(cookie.secure);
    }

    #[test]
    fn test_jar_matching() {
        let jar = CookieJar::new();
        jar.add(Cookie::new("a", "1").domain("example.com"));
        jar.add(Cookie::new("b", "2").domain("example.com").path("/admin"));
        jar.add(Cookie::new("c", "3").domain("other.com"));

        let url = Url::parse("http://api.example.com/index").unwrap();
        assert_eq!(jar.get_cookie_header(&url).as_deref(), Some("a=1"));
        assert_eq!(jar.len(), 3);
    }

    #[test]
    fn test_max_age_zero_deletes() {
        let jar = CookieJar::new();
        let url = Url::parse("http://example.com/").unwrap();
        jar.add_from_header("token=x", &url);
        assert_eq!(jar.len(), 1);

        jar.add_from_header("token=; Max-Age=0", &url);
        assert!(jar.is_empty());
    }

    #[test]
    fn test_max_age_out_of_range() {
        let jar = CookieJar::new();
        let url = Url::parse("http://example.com/").unwrap();

        let header = HeaderValue::from_static("a=b; Max-Age=9223372036854775807");
        jar.set_cookies(&mut std::iter::once(&header), &url);
        assert_eq!(jar.len(), 1);

        let cookie = Cookie::parse("a=b; Max-Age=9000000000000", &url).unwrap();
        assert_eq!(cookie.expires, Some(DateTime::<Utc>::MAX_UTC));
        assert!(!cookie.is_expired());

        let cookie = Cookie::parse("a=b; Max-Age=-9223372036854775808", &url).unwrap();
        assert!(cookie.is_expired());
    }

    #[test]
    fn test_cookie_store_shares_storage() {
        let jar = CookieJar::new();
        let shared = jar.clone();
        let url = Url::parse("http://127.0.0.1/login").unwrap();

        let header = HeaderValue::from_static("session=abc; Path=/");
        shared.set_cookies(&mut std::iter::once(&header), &url);

        assert_eq!(jar.id(), shared.id());
        assert_eq!(
            jar.cookies(&Url::parse("http://127.0.0.1/me").unwrap()),
            Some(HeaderValue::from_static("session=abc"))
        );
    }

    #[test]
    fn test_json_export() {
        let jar = CookieJar::new();
        jar.add(Cookie::new("a", "1").domain("example.com"));
        let restored = CookieJar::from_json(&jar.to_json().unwrap()).unwrap();
        assert_eq!(restored.len(), 1);
    }
}
