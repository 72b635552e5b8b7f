// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Streaming relays
//!
//! Pipes move bodies between a response and a writer, a response and the
//! next request, or a received request and an upstream call. Data moves in
//! bounded chunks; nothing is buffered whole.

mod copy;
mod peer;

pub use copy::{copy_chunked, relay_body, RELAY_CHUNK_SIZE};
pub use peer::{IncomingRequest, OutboundResponse, ResponseRecorder};

use reqwest::header::{HeaderMap, HeaderName};
use tokio::io::AsyncWrite;

use crate::error::Result;
use crate::http::{HeaderValues, RequestBuilder, RequestOptions, StreamingResponse};

/// Inbound request headers never forwarded upstream
pub const REQUEST_RELAY_SUPPRESSED: &[&str] =
    &["connection", "referer", "origin", "host", "transfer-encoding"];

/// Upstream response headers never copied to the client
pub const RESPONSE_RELAY_SUPPRESSED: &[&str] = &["connection", "transfer-encoding"];

fn is_listed(name: &HeaderName, list: &[&str]) -> bool {
    list.iter().any(|s| name.as_str().eq_ignore_ascii_case(s))
}

fn forwardable_headers(headers: &HeaderMap) -> HeaderValues {
    let mut out = HeaderValues::new();
    for name in headers.keys() {
        if is_listed(name, REQUEST_RELAY_SUPPRESSED) {
            continue;
        }
        let values = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();
        out.insert(name.as_str().to_string(), values);
    }
    out
}

fn copy_response_head<R>(response: &StreamingResponse, out: &mut R) -> Result<()>
where
    R: OutboundResponse + ?Sized,
{
    let target = out.headers_mut();
    for (name, value) in response.headers.iter() {
        if !is_listed(name, RESPONSE_RELAY_SUPPRESSED) {
            target.append(name.clone(), value.clone());
        }
    }
    out.write_status(response.status)?;
    Ok(())
}

impl RequestBuilder {
    /// Run the exchange and copy the (decoded) response body into `writer`.
    ///
    /// Returns the number of bytes written. The response is released when
    /// this returns, whether or not the copy succeeded.
    pub async fn pipe_stream<W>(&mut self, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let response = self.send().await?;
        relay_body(response.body, writer).await
    }

    /// Run the exchange and relay status, headers and body to `out`.
    ///
    /// The body is relayed as received, without decoding, so it stays
    /// consistent with the copied Content-Encoding and Content-Length.
    pub async fn pipe_to_response<R>(&mut self, out: &mut R) -> Result<u64>
    where
        R: OutboundResponse + ?Sized,
    {
        let response = self.send_raw().await?;
        copy_response_head(&response, out)?;
        relay_body(response.body, out).await
    }

    /// Run the exchange and hand its open body to `next` as a forwarded
    /// stream, tagged with the response's Content-Type.
    ///
    /// `next` must be executed to drain (and release) this response.
    pub async fn pipe_req(&mut self, mut next: RequestBuilder) -> Result<RequestBuilder> {
        let response = self.send().await?;
        let content_type = response.content_type().unwrap_or_default().to_string();
        tracing::debug!(content_type = %content_type, "Chaining response body into next request");
        next.body_stream(content_type, response.into_body());
        Ok(next)
    }

    /// Adopt a received request: its headers (minus hop-by-hop and
    /// identity headers) are overlaid under this builder's own, and its
    /// body becomes the forwarded body. Nothing is sent yet.
    pub fn pipe_from_req(&mut self, inbound: IncomingRequest) -> &mut Self {
        let forwarded = RequestOptions {
            headers: forwardable_headers(&inbound.headers),
            ..Default::default()
        };
        let content_type = inbound.content_type().unwrap_or_default().to_string();

        let options = std::mem::take(self.options_mut());
        *self.options_mut() = options.overlay(&forwarded);
        self.body_stream(content_type, inbound.body)
    }
}
