// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Bounded-chunk copy used by every relay

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};
use crate::http::BodyStream;

/// Chunk size used by the relays
pub const RELAY_CHUNK_SIZE: usize = 32 * 1024;

/// Copy `reader` into `writer` one chunk at a time until a zero-length read.
///
/// Nothing is buffered beyond one chunk. On failure the error reports how
/// many bytes the writer had already accepted; those bytes stay written.
pub async fn copy_chunked<R, W>(reader: &mut R, writer: &mut W, chunk_size: usize) -> Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut written = 0u64;

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::relay(written, e)),
        };
        writer
            .write_all(&buf[..n])
            .await
            .map_err(|e| Error::relay(written, e))?;
        written += n as u64;
    }

    writer.flush().await.map_err(|e| Error::relay(written, e))?;
    Ok(written)
}

/// Copy a body stream into `writer`, consuming (and releasing) the stream
pub async fn relay_body<W>(body: BodyStream, writer: &mut W) -> Result<u64>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut reader = body.into_reader();
    match copy_chunked(&mut reader, writer, RELAY_CHUNK_SIZE).await {
        Ok(written) => {
            tracing::debug!(bytes = written, "Relayed body");
            Ok(written)
        }
        Err(e) => {
            tracing::warn!(bytes = e.bytes_written(), error = %e, "Relay aborted");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn test_short_reads_copied_whole() {
        let mut reader = Builder::new()
            .read(b"abc")
            .read(b"defg")
            .read(b"hij")
            .build();
        let mut sink = Vec::new();

        let written = copy_chunked(&mut reader, &mut sink, 4).await.unwrap();
        assert_eq!(written, 10);
        assert_eq!(sink, b"abcdefghij");
    }

    #[tokio::test]
    async fn test_chunk_size_does_not_matter() {
        for chunk_size in [1, 2, 3, 4, 7, RELAY_CHUNK_SIZE] {
            let mut reader = &b"abc"[..];
            let mut sink = Vec::new();
            copy_chunked(&mut reader, &mut sink, chunk_size).await.unwrap();
            assert_eq!(sink, b"abc", "chunk size {}", chunk_size);
        }
    }

    #[tokio::test]
    async fn test_read_error_keeps_partial_data() {
        let mut reader = Builder::new()
            .read(b"abc")
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "upstream reset"))
            .build();
        let mut sink = Vec::new();

        let err = copy_chunked(&mut reader, &mut sink, 4).await.unwrap_err();
        assert_eq!(err.bytes_written(), Some(3));
        assert_eq!(sink, b"abc");
    }

    #[tokio::test]
    async fn test_write_error_aborts() {
        let mut reader = &b"abcdef"[..];
        let mut writer = Builder::new()
            .write(b"abc")
            .write_error(io::Error::new(io::ErrorKind::BrokenPipe, "client went away"))
            .build();

        let err = copy_chunked(&mut reader, &mut writer, 3).await.unwrap_err();
        assert!(matches!(err, Error::Relay { written: 3, .. }));
    }
}
