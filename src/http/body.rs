// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request body strategies and the byte stream type shared by requests,
//! responses and relays.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::io::AsyncRead;
use tokio_util::io::{ReaderStream, StreamReader};

use super::values::Values;
use crate::error::{Error, Result};

/// Boxed stream of body chunks
pub type BoxStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send + 'static>>;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A readable byte stream.
///
/// Dropping the stream releases whatever it reads from (for response bodies,
/// the underlying connection), so every path has exactly one release point.
pub struct BodyStream {
    inner: Inner,
}

enum Inner {
    Full(Option<Bytes>),
    // Mutex only makes the stream Sync for reqwest; polling goes through get_mut
    Stream(Mutex<BoxStream>),
}

impl BodyStream {
    /// Stream yielding no bytes
    pub fn empty() -> Self {
        Self {
            inner: Inner::Full(None),
        }
    }

    /// Stream over an in-memory buffer
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            inner: Inner::Full((!bytes.is_empty()).then_some(bytes)),
        }
    }

    /// Wrap a stream of chunks
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self {
            inner: Inner::Stream(Mutex::new(Box::pin(stream))),
        }
    }

    /// Wrap an async reader
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self::from_stream(ReaderStream::new(reader))
    }

    /// Adapt into an [`AsyncRead`]
    pub fn into_reader(self) -> StreamReader<BodyStream, Bytes> {
        StreamReader::new(self)
    }

    /// Whether the whole body is already in memory
    pub fn is_buffered(&self) -> bool {
        matches!(self.inner, Inner::Full(_))
    }

    /// Read the remaining bytes into memory
    pub async fn read_all(mut self) -> io::Result<Bytes> {
        if let Inner::Full(bytes) = &mut self.inner {
            return Ok(bytes.take().unwrap_or_default());
        }
        let mut buf = Vec::new();
        while let Some(chunk) = self.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(Bytes::from(buf))
    }

    pub(crate) fn into_reqwest_body(self) -> reqwest::Body {
        match self.inner {
            Inner::Full(bytes) => reqwest::Body::from(bytes.unwrap_or_default()),
            inner @ Inner::Stream(_) => reqwest::Body::wrap_stream(BodyStream { inner }),
        }
    }
}

impl Stream for BodyStream {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match &mut self.get_mut().inner {
            Inner::Full(bytes) => Poll::Ready(bytes.take().map(Ok)),
            Inner::Stream(stream) => stream.get_mut().as_mut().poll_next(cx),
        }
    }
}

impl fmt::Debug for BodyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Inner::Full(bytes) => f
                .debug_tuple("BodyStream::Full")
                .field(&bytes.as_ref().map_or(0, Bytes::len))
                .finish(),
            Inner::Stream(_) => write!(f, "BodyStream::Stream(..)"),
        }
    }
}

impl From<Bytes> for BodyStream {
    fn from(bytes: Bytes) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Vec<u8>> for BodyStream {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<&'static str> for BodyStream {
    fn from(s: &'static str) -> Self {
        Self::from_bytes(s)
    }
}

/// Stream handed over to a [`Body::Forwarded`] strategy.
///
/// Clones of a configuration share the slot; the first exchange to build the
/// body takes the stream and later ones get [`Error::BodyConsumed`].
#[derive(Clone)]
pub struct ForwardedStream {
    content_type: String,
    slot: Arc<Mutex<Option<BodyStream>>>,
}

impl ForwardedStream {
    pub fn new(content_type: impl Into<String>, stream: BodyStream) -> Self {
        Self {
            content_type: content_type.into(),
            slot: Arc::new(Mutex::new(Some(stream))),
        }
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Whether the stream has already been taken
    pub fn is_consumed(&self) -> bool {
        self.slot.lock().is_none()
    }

    fn take(&self) -> Result<BodyStream> {
        self.slot.lock().take().ok_or(Error::BodyConsumed)
    }
}

impl fmt::Debug for ForwardedStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForwardedStream")
            .field("content_type", &self.content_type)
            .field("consumed", &self.is_consumed())
            .finish()
    }
}

/// Request body strategy
#[derive(Debug, Clone)]
pub enum Body {
    /// Form fields, sent as `application/x-www-form-urlencoded`
    Form(Values),
    /// Pre-serialized bytes, sent as `application/json`
    Raw(Bytes),
    /// Structured value, serialized to JSON when the body is built
    Json(serde_json::Value),
    /// Already open stream with its own content type
    Forwarded(ForwardedStream),
}

impl Body {
    /// Structured body from any serializable value
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Body::Json(serde_json::to_value(value)?))
    }

    /// Forwarded body from an open stream
    pub fn forwarded(content_type: impl Into<String>, stream: BodyStream) -> Self {
        Body::Forwarded(ForwardedStream::new(content_type, stream))
    }

    /// Produce the content type and the byte stream to send
    pub fn build(&self) -> Result<(String, BodyStream)> {
        match self {
            Body::Form(values) => Ok((
                FORM_CONTENT_TYPE.to_string(),
                BodyStream::from_bytes(values.encode()),
            )),
            Body::Raw(bytes) => Ok((JSON_CONTENT_TYPE.to_string(), bytes.clone().into())),
            Body::Json(value) => {
                let encoded = serde_json::to_vec(value)?;
                Ok((JSON_CONTENT_TYPE.to_string(), encoded.into()))
            }
            Body::Forwarded(forwarded) => {
                Ok((forwarded.content_type.clone(), forwarded.take()?))
            }
        }
    }
}

/// Build a body stream from a list of chunks
pub fn chunked<I>(chunks: I) -> BodyStream
where
    I: IntoIterator<Item = Bytes>,
    I::IntoIter: Send + 'static,
{
    BodyStream::from_stream(stream::iter(chunks.into_iter().map(Ok)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reader_round_trip() {
        let body = BodyStream::from_reader(&b"streamed bytes"[..]);
        assert!(!body.is_buffered());
        assert!(BodyStream::from("abc").is_buffered());

        let mut reader = body.into_reader();
        let mut out = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut reader, &mut out)
            .await
            .unwrap();
        assert_eq!(out, "streamed bytes");
    }

    #[tokio::test]
    async fn test_form_body() {
        let body = Body::Form(Values::from([("userName", "nxu"), ("pwd", "111")]));
        let (content_type, stream) = body.build().unwrap();
        assert_eq!(content_type, "application/x-www-form-urlencoded");

        let encoded = stream.read_all().await.unwrap();
        let decoded = Values::parse(&encoded);
        assert_eq!(decoded.get("userName"), Some("nxu"));
        assert_eq!(decoded.get("pwd"), Some("111"));
        assert_eq!(decoded.len(), 2);
    }

    #[tokio::test]
    async fn test_struct_body_keeps_field_order() {
        #[derive(Serialize)]
        #[allow(non_snake_case)]
        struct Person {
            Name: String,
            Age: u32,
        }

        let body = Body::json(&Person {
            Name: "xdw".into(),
            Age: 30,
        })
        .unwrap();
        let (content_type, stream) = body.build().unwrap();
        assert_eq!(content_type, "application/json");
        assert_eq!(&stream.read_all().await.unwrap()[..], br#"{"Name":"xdw","Age":30}"#);
    }

    #[test]
    fn test_unserializable_value() {
        let mut map = std::collections::HashMap::new();
        map.insert((1, 2), "tuple keys are not JSON");
        assert!(matches!(Body::json(&map), Err(Error::Serialization(_))));
    }

    #[tokio::test]
    async fn test_raw_body_is_verbatim() {
        let (content_type, stream) = Body::Raw(Bytes::from_static(b"{ok:1}")).build().unwrap();
        assert_eq!(content_type, "application/json");
        assert_eq!(&stream.read_all().await.unwrap()[..], b"{ok:1}");
    }

    #[tokio::test]
    async fn test_forwarded_body_taken_once() {
        let body = Body::forwarded(
            "text/plain",
            chunked([Bytes::from_static(b"ab"), Bytes::from_static(b"c")]),
        );
        let copy = body.clone();

        let (content_type, stream) = body.build().unwrap();
        assert_eq!(content_type, "text/plain");
        assert_eq!(&stream.read_all().await.unwrap()[..], b"abc");

        assert!(matches!(copy.build(), Err(Error::BodyConsumed)));
    }
}
