// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response types

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use super::body::BodyStream;
use crate::error::{Error, Result};

/// Response whose body is still being received.
///
/// The body stream holds the connection; dropping the response (or the
/// stream taken from it) releases it.
#[derive(Debug)]
pub struct StreamingResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Final URL (after redirects)
    pub url: Url,
    /// Whether a redirect was followed
    pub redirected: bool,
    /// Time until headers arrived, in milliseconds
    pub response_time_ms: u64,
    pub body: BodyStream,
}

impl StreamingResponse {
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Take the body stream, dropping the metadata
    pub fn into_body(self) -> BodyStream {
        self.body
    }

    /// Read the whole body
    pub async fn into_response(self) -> Result<Response> {
        let body = self.body.read_all().await?;
        Ok(Response::new(
            self.status,
            self.headers,
            body,
            self.url,
            self.redirected,
            self.response_time_ms,
        ))
    }
}

/// HTTP response with a fully read body
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Final URL (after redirects)
    pub url: Url,
    /// Whether a redirect was followed
    pub redirected: bool,
    /// Response time in milliseconds
    pub response_time_ms: u64,
}

impl Response {
    pub fn new(
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
        url: Url,
        redirected: bool,
        response_time_ms: u64,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            url,
            redirected,
            response_time_ms,
        }
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Check if status is redirect (3xx)
    pub fn is_redirect(&self) -> bool {
        self.status.is_redirection()
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Get body as text
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(|e| Error::Other(e.to_string()))
    }

    /// Get body as text, lossy conversion
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Error::from)
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get all values for a header
    pub fn header_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Redirect target, if this is a redirect response
    pub fn location(&self) -> Option<&str> {
        self.is_redirect().then(|| self.header("location")).flatten()
    }

    pub fn bytes(&self) -> &Bytes {
        &self.body
    }
}
