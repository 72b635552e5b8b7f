// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request options and the overlay rules used to combine them
//!
//! A [`RequestOptions`] value is the whole configuration of one request:
//! what to send, where, and how the transport should behave. Options are
//! layered: a call-level record is overlaid on a template (a client's
//! defaults or a parent builder's options) with [`RequestOptions::overlay`].
//!
//! Fields that must tell "not set" apart from "set to false/empty" are
//! `Option`s. Overlay only ever fills those in when they are absent; it never
//! overwrites a value the call level set explicitly.

use std::collections::{HashMap, HashSet};
use std::mem;
use std::time::Duration;

use super::body::Body;
use super::cookie::CookieJar;
use super::values::Values;

/// Header name to values, sent in sequence order
pub type HeaderValues = HashMap<String, Vec<String>>;

/// Configuration record for one request
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// HTTP method, case-insensitive; empty means unset (GET when sent)
    pub method: String,
    /// Target URL, possibly carrying its own query string
    pub url: String,
    /// Request headers
    pub headers: HeaderValues,
    /// Redirect override. `Some(true)` stops at the first redirect and
    /// returns it as the response; `None` and `Some(false)` keep the
    /// transport's default redirect handling.
    pub follow_redirect: Option<bool>,
    /// `Some(true)` closes the connection after the exchange
    pub disable_keep_alive: Option<bool>,
    /// Proxy for this request only, replacing environment proxies
    pub proxy: Option<String>,
    /// Cookie store shared by every exchange that carries it
    pub cookie_jar: Option<CookieJar>,
    /// Query parameters appended to `url` when sent
    pub query: Values,
    /// Body strategy
    pub body: Option<Body>,
    /// Whole-exchange timeout; `None` or zero keeps the transport default
    pub timeout: Option<Duration>,
    /// Header names present in `headers` that must not be sent
    pub headers_to_remove: HashSet<String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay `self` (the more specific options) on `source` (the template).
    ///
    /// - `method` and `url` keep `self`'s value unless it is empty.
    /// - Optional fields are filled from `source` only where `self` has none.
    /// - Headers are merged by name, ignoring case, `self` winning on collisions.
    /// - Query, body, timeout and suppressed headers are taken from `source`
    ///   only when absent on `self`.
    pub fn overlay(mut self, source: &RequestOptions) -> RequestOptions {
        if self.method.is_empty() {
            self.method = source.method.clone();
        }
        if self.url.is_empty() {
            self.url = source.url.clone();
        }

        if self.follow_redirect.is_none() {
            self.follow_redirect = source.follow_redirect;
        }
        if self.disable_keep_alive.is_none() {
            self.disable_keep_alive = source.disable_keep_alive;
        }
        if self.proxy.is_none() {
            self.proxy = source.proxy.clone();
        }
        if self.cookie_jar.is_none() {
            self.cookie_jar = source.cookie_jar.clone();
        }

        // Header names compare case-insensitively, as on the wire
        let mut headers = source.headers.clone();
        for (name, values) in mem::take(&mut self.headers) {
            headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
            headers.insert(name, values);
        }
        self.headers = headers;

        if self.headers_to_remove.is_empty() {
            self.headers_to_remove = source.headers_to_remove.clone();
        }
        if self.query.is_empty() {
            self.query = source.query.clone();
        }
        if self.body.is_none() {
            self.body = source.body.clone();
        }
        if self.timeout.is_none() {
            self.timeout = source.timeout;
        }

        self
    }

    /// Timeout to apply, ignoring a zero duration
    pub fn effective_timeout(&self) -> Option<Duration> {
        self.timeout.filter(|t| !t.is_zero())
    }

    /// Whether `name` is in the suppression set (exact match)
    pub fn is_suppressed(&self, name: &str) -> bool {
        self.headers_to_remove.contains(name)
    }

    /// Full URL with the query parameters appended.
    ///
    /// The separator is `&` whenever the target already contains a `?`
    /// anywhere, `?` otherwise; the URL is not parsed here.
    pub fn build_url(&self) -> String {
        let query = self.query.encode();
        if query.is_empty() {
            return self.url.clone();
        }

        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.url, separator, query)
    }
}

/// Overlay `target` on `source`; an absent side leaves the other unchanged
pub fn merge_options(
    target: Option<RequestOptions>,
    source: Option<&RequestOptions>,
) -> Option<RequestOptions> {
    match (target, source) {
        (Some(target), Some(source)) => Some(target.overlay(source)),
        (Some(target), None) => Some(target),
        (None, source) => source.cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HeaderValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), vec![v.to_string()]))
            .collect()
    }

    #[test]
    fn test_identity_fields() {
        let source = RequestOptions {
            method: "POST".into(),
            url: "http://template/".into(),
            ..Default::default()
        };

        let merged = RequestOptions::new().overlay(&source);
        assert_eq!(merged.method, "POST");
        assert_eq!(merged.url, "http://template/");

        let target = RequestOptions {
            method: "get".into(),
            url: "http://call/".into(),
            ..Default::default()
        };
        let merged = target.overlay(&source);
        assert_eq!(merged.method, "get");
        assert_eq!(merged.url, "http://call/");
    }

    #[test]
    fn test_fill_if_absent() {
        let source = RequestOptions {
            follow_redirect: Some(true),
            disable_keep_alive: Some(true),
            proxy: Some("http://localhost:8888".into()),
            ..Default::default()
        };

        let target = RequestOptions {
            follow_redirect: Some(false),
            disable_keep_alive: Some(false),
            ..Default::default()
        };

        let merged = target.overlay(&source);
        assert_eq!(merged.follow_redirect, Some(false));
        assert_eq!(merged.disable_keep_alive, Some(false));
        assert_eq!(merged.proxy.as_deref(), Some("http://localhost:8888"));

        let merged = RequestOptions::new().overlay(&source);
        assert_eq!(merged.follow_redirect, Some(true));
    }

    #[test]
    fn test_header_overlay() {
        let source = RequestOptions {
            headers: headers(&[("x-shared", "template"), ("x-template", "t")]),
            ..Default::default()
        };
        let target = RequestOptions {
            headers: headers(&[("x-shared", "call"), ("x-call", "c")]),
            ..Default::default()
        };

        let merged = target.overlay(&source);
        assert_eq!(merged.headers["x-shared"], ["call"]);
        assert_eq!(merged.headers["x-template"], ["t"]);
        assert_eq!(merged.headers["x-call"], ["c"]);
        assert_eq!(merged.headers.len(), 3);
    }

    #[test]
    fn test_header_overlay_ignores_case() {
        let source = RequestOptions {
            headers: headers(&[("authorization", "Bearer client"), ("x-trace", "123")]),
            ..Default::default()
        };
        let target = RequestOptions {
            headers: headers(&[("Authorization", "Bearer proxy")]),
            ..Default::default()
        };

        let merged = target.overlay(&source);
        assert_eq!(merged.headers["Authorization"], ["Bearer proxy"]);
        assert!(!merged.headers.contains_key("authorization"));
        assert_eq!(merged.headers["x-trace"], ["123"]);
        assert_eq!(merged.headers.len(), 2);
    }

    #[test]
    fn test_cookie_jar_adopted_when_absent() {
        let jar = CookieJar::new();
        let source = RequestOptions {
            cookie_jar: Some(jar.clone()),
            ..Default::default()
        };

        let merged = RequestOptions::new().overlay(&source);
        assert_eq!(merged.cookie_jar.map(|j| j.id()), Some(jar.id()));

        let own = CookieJar::new();
        let target = RequestOptions {
            cookie_jar: Some(own.clone()),
            ..Default::default()
        };
        let merged = target.overlay(&source);
        assert_eq!(merged.cookie_jar.map(|j| j.id()), Some(own.id()));
    }

    #[test]
    fn test_plain_fields_taken_when_absent() {
        let source = RequestOptions {
            query: Values::from([("a", "1")]),
            timeout: Some(Duration::from_secs(5)),
            headers_to_remove: HashSet::from(["x-drop".to_string()]),
            body: Some(Body::Form(Values::from([("k", "v")]))),
            ..Default::default()
        };

        let merged = RequestOptions::new().overlay(&source);
        assert_eq!(merged.query.get("a"), Some("1"));
        assert_eq!(merged.timeout, Some(Duration::from_secs(5)));
        assert!(merged.is_suppressed("x-drop"));
        assert!(merged.body.is_some());

        let target = RequestOptions {
            query: Values::from([("b", "2")]),
            timeout: Some(Duration::ZERO),
            ..Default::default()
        };
        let merged = target.overlay(&source);
        assert_eq!(merged.query.get("a"), None);
        assert_eq!(merged.effective_timeout(), None);
    }

    #[test]
    fn test_merge_with_absent_side() {
        let source = RequestOptions {
            url: "http://host/".into(),
            ..Default::default()
        };
        let merged = merge_options(None, Some(&source)).unwrap();
        assert_eq!(merged.url, "http://host/");

        let target = RequestOptions {
            method: "PUT".into(),
            ..Default::default()
        };
        let merged = merge_options(Some(target), None).unwrap();
        assert_eq!(merged.method, "PUT");
        assert!(merged.url.is_empty());

        assert!(merge_options(None, None).is_none());
    }

    #[test]
    fn test_build_url() {
        let mut options = RequestOptions {
            url: "http://host/path".into(),
            query: Values::from([("a", "1")]),
            ..Default::default()
        };
        assert_eq!(options.build_url(), "http://host/path?a=1");

        options.url = "http://host/path?x=1".into();
        assert_eq!(options.build_url(), "http://host/path?x=1&a=1");

        options.query = Values::new();
        assert_eq!(options.build_url(), "http://host/path?x=1");
    }
}
