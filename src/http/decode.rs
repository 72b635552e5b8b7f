// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Transparent Content-Encoding handling for response bodies

use std::io::{self, Write};
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use flate2::write::GzDecoder;
use futures::stream::{Stream, StreamExt};
use reqwest::header::{HeaderMap, CONTENT_ENCODING};

use super::body::BodyStream;
use crate::error::{Error, Result};

/// Whether the headers declare a gzip-encoded body
pub fn is_gzip(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v.trim().eq_ignore_ascii_case("gzip"))
}

/// Wrap `raw` in a decoder when the headers ask for one.
///
/// The gzip header is validated before this returns, so a malformed body
/// fails here and no stream is handed out.
pub async fn decode_body(headers: &HeaderMap, raw: BodyStream) -> Result<BodyStream> {
    if !is_gzip(headers) {
        return Ok(raw);
    }
    let decoder = GzipStream::new(raw).await?;
    Ok(BodyStream::from_stream(decoder))
}

/// Incremental gzip decoder over a chunk stream.
///
/// Handles bodies made of several concatenated gzip members. Owns the
/// upstream stream and drops it as soon as it is exhausted or fails,
/// releasing the connection underneath.
struct GzipStream {
    upstream: Option<BodyStream>,
    decoder: GzDecoder<Vec<u8>>,
    /// Whether the current member has received any input
    member_started: bool,
    done: bool,
}

impl GzipStream {
    async fn new(upstream: BodyStream) -> Result<Self> {
        let mut this = Self {
            upstream: Some(upstream),
            decoder: GzDecoder::new(Vec::new()),
            member_started: false,
            done: false,
        };

        while this.decoder.header().is_none() {
            let Some(upstream) = this.upstream.as_mut() else {
                break;
            };
            match upstream.next().await {
                Some(Ok(chunk)) => this.feed(&chunk).map_err(Error::gzip)?,
                Some(Err(e)) => return Err(Error::Io(e)),
                // An empty body carries no gzip header to check
                None if !this.member_started => {
                    this.upstream = None;
                    this.done = true;
                }
                None => {
                    return Err(Error::gzip(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "truncated gzip header",
                    )))
                }
            }
        }

        Ok(this)
    }

    /// Push compressed bytes through the decoder, starting a new member
    /// whenever the current one has ended and input remains.
    fn feed(&mut self, mut data: &[u8]) -> io::Result<()> {
        while !data.is_empty() {
            let n = self.decoder.write(data)?;
            if n > 0 {
                self.member_started = true;
                data = &data[n..];
                continue;
            }
            if !self.member_started {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "gzip decoder accepted no input",
                ));
            }
            self.next_member()?;
        }
        Ok(())
    }

    fn next_member(&mut self) -> io::Result<()> {
        self.decoder.try_finish()?;
        let out = mem::take(self.decoder.get_mut());
        self.decoder = GzDecoder::new(out);
        self.member_started = false;
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        // A member boundary right at the end leaves a fresh, empty decoder
        if self.member_started {
            self.decoder.try_finish()?;
        }
        Ok(())
    }

    fn take_output(&mut self) -> Option<Bytes> {
        let out = self.decoder.get_mut();
        (!out.is_empty()).then(|| Bytes::from(mem::take(out)))
    }

    fn fail(&mut self, err: io::Error) -> Poll<Option<io::Result<Bytes>>> {
        self.upstream = None;
        self.done = true;
        Poll::Ready(Some(Err(err)))
    }
}

impl Stream for GzipStream {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(chunk) = this.take_output() {
                return Poll::Ready(Some(Ok(chunk)));
            }
            if this.done {
                return Poll::Ready(None);
            }

            let Some(upstream) = this.upstream.as_mut() else {
                this.done = true;
                continue;
            };

            match upstream.poll_next_unpin(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(Ok(chunk))) => {
                    if let Err(e) = this.feed(&chunk) {
                        return this.fail(e);
                    }
                }
                Poll::Ready(Some(Err(e))) => return this.fail(e),
                Poll::Ready(None) => {
                    this.upstream = None;
                    if let Err(e) = this.finish() {
                        return this.fail(e);
                    }
                    this.done = true;
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn gzip(data: &[u8]) -> Vec<u8> {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}
