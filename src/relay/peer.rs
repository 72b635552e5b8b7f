// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Inbound request and outbound response collaborators for proxy relays
//!
//! A server integration turns its own request type into an
//! [`IncomingRequest`] and implements [`OutboundResponse`] for whatever it
//! writes responses into. [`ResponseRecorder`] is an in-memory response.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use tokio::io::AsyncWrite;

use crate::http::BodyStream;

/// Request received by a server, to be relayed upstream
#[derive(Debug)]
pub struct IncomingRequest {
    pub method: Method,
    /// Request target as received (path and query)
    pub uri: String,
    pub headers: HeaderMap,
    pub body: BodyStream,
}

impl IncomingRequest {
    pub fn new(method: Method, uri: impl Into<String>, headers: HeaderMap, body: BodyStream) -> Self {
        Self {
            method,
            uri: uri.into(),
            headers,
            body,
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }
}

/// Response being written back to a client.
///
/// Headers must be set before [`write_status`](Self::write_status); the
/// body is written through `AsyncWrite` afterwards.
pub trait OutboundResponse: AsyncWrite + Unpin + Send {
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Send the status line and headers
    fn write_status(&mut self, status: StatusCode) -> io::Result<()>;
}

/// In-memory [`OutboundResponse`]
#[derive(Debug, Default)]
pub struct ResponseRecorder {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status written, or 200 once body bytes were written without one
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl OutboundResponse for ResponseRecorder {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) -> io::Result<()> {
        // Only the first status counts, as on a real connection
        self.status.get_or_insert(status);
        Ok(())
    }
}

impl AsyncWrite for ResponseRecorder {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        this.status.get_or_insert(StatusCode::OK);
        Pin::new(&mut this.body).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_recorder_implicit_ok() {
        let mut recorder = ResponseRecorder::new();
        recorder.write_all(b"abc").await.unwrap();
        assert_eq!(recorder.status(), Some(StatusCode::OK));
        assert_eq!(recorder.body_string(), "abc");

        recorder.write_status(StatusCode::NOT_FOUND).unwrap();
        assert_eq!(recorder.status(), Some(StatusCode::OK));
    }

    #[test]
    fn test_incoming_content_type() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let req = IncomingRequest::new(Method::POST, "/upload", headers, BodyStream::empty());
        assert_eq!(req.content_type(), Some("text/plain"));
    }
}
