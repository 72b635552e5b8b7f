// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request assembly
//!
//! Turns effective [`RequestOptions`] into everything one exchange needs: the
//! method, the full URL, the outgoing headers, the body stream, and the
//! transport settings the exchange must run with. All parsing happens here,
//! so malformed URLs and proxies are reported before any network I/O.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONNECTION, CONTENT_TYPE};
use reqwest::{Method, Proxy};
use url::Url;

use super::body::BodyStream;
use super::cookie::CookieJar;
use super::options::RequestOptions;
use crate::error::{Error, Result};

/// Transport behaviour for a single exchange
#[derive(Clone, Default)]
pub struct TransportSettings {
    /// Raw proxy URL, kept for logging and client caching
    pub proxy_url: Option<String>,
    pub proxy: Option<Proxy>,
    pub cookie_jar: Option<CookieJar>,
    pub timeout: Option<Duration>,
    /// Return the first redirect response instead of following it
    pub stop_at_redirect: bool,
    pub disable_keep_alive: bool,
}

impl TransportSettings {
    /// Whether the shared pooled client cannot serve this exchange
    pub fn needs_dedicated_client(&self) -> bool {
        self.proxy.is_some()
            || self.cookie_jar.is_some()
            || self.stop_at_redirect
            || self.disable_keep_alive
    }

    /// Key identifying a client built for these settings
    pub(crate) fn client_key(&self) -> ClientKey {
        ClientKey {
            proxy: self.proxy_url.clone(),
            cookie_jar: self.cookie_jar.as_ref().map(CookieJar::id),
            stop_at_redirect: self.stop_at_redirect,
            disable_keep_alive: self.disable_keep_alive,
        }
    }
}

impl std::fmt::Debug for TransportSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportSettings")
            .field("proxy", &self.proxy_url)
            .field("cookie_jar", &self.cookie_jar.is_some())
            .field("timeout", &self.timeout)
            .field("stop_at_redirect", &self.stop_at_redirect)
            .field("disable_keep_alive", &self.disable_keep_alive)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ClientKey {
    proxy: Option<String>,
    cookie_jar: Option<usize>,
    stop_at_redirect: bool,
    disable_keep_alive: bool,
}

/// A request ready to hand to the transport
#[derive(Debug)]
pub struct AssembledRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<BodyStream>,
    pub settings: TransportSettings,
}

/// Resolve `options` into a sendable request.
///
/// Building a body strategy writes its content type into `options.headers`
/// as `Content-Type`, replacing any value set by hand.
pub fn assemble(options: &mut RequestOptions) -> Result<AssembledRequest> {
    let mut settings = TransportSettings::default();

    if let Some(proxy_url) = &options.proxy {
        Url::parse(proxy_url).map_err(|e| Error::proxy(proxy_url.as_str(), e))?;
        let proxy = Proxy::all(proxy_url.as_str()).map_err(|e| Error::proxy(proxy_url.as_str(), e))?;
        settings.proxy = Some(proxy);
        settings.proxy_url = Some(proxy_url.clone());
    }

    settings.cookie_jar = options.cookie_jar.clone();
    settings.timeout = options.effective_timeout();

    // Validated before a forwarded stream is taken out of its slot
    let url = Url::parse(&options.build_url())?;
    let method = parse_method(&options.method)?;

    let mut body = None;
    if let Some(strategy) = &options.body {
        let (content_type, stream) = strategy.build()?;
        options
            .headers
            .retain(|name, _| !name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()));
        if !content_type.is_empty() {
            options
                .headers
                .insert("Content-Type".to_string(), vec![content_type]);
        }
        body = Some(stream);
    }

    let mut headers = HeaderMap::new();
    let mut suppressed = 0;
    for (name, values) in &options.headers {
        if options.is_suppressed(name) {
            suppressed += 1;
            continue;
        }
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::config(format!("Invalid header name '{}': {}", name, e)))?;
        for value in values {
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                Error::config(format!("Invalid value for header '{}': {}", name, e))
            })?;
            headers.append(header_name.clone(), header_value);
        }
    }

    settings.stop_at_redirect = options.follow_redirect == Some(true);

    if options.disable_keep_alive == Some(true) {
        settings.disable_keep_alive = true;
        headers.insert(CONNECTION, HeaderValue::from_static("close"));
    }

    tracing::debug!(
        method = %method,
        url = %url,
        headers = headers.len(),
        suppressed,
        settings = ?settings,
        "Assembled request"
    );

    Ok(AssembledRequest {
        method,
        url,
        headers,
        body,
        settings,
    })
}

fn parse_method(method: &str) -> Result<Method> {
    if method.is_empty() {
        return Ok(Method::GET);
    }
    Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|e| Error::config(format!("Invalid method '{}': {}", method, e)))
}
