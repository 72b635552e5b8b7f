// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for reqpipe
//!
//! Errors fall into a few groups: configuration problems caught before any
//! network I/O, transport failures reported by reqwest, body encoding and
//! decoding failures, and relay failures that may leave partial data behind
//! in the destination sink.

use thiserror::Error;

/// Result type alias for reqpipe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for reqpipe
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure (connect, TLS, timeout, protocol)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Target URL could not be parsed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Proxy URL could not be parsed
    #[error("Invalid proxy URL '{proxy}': {reason}")]
    Proxy { proxy: String, reason: String },

    /// Invalid method, header name or header value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Structured body could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Response body could not be decoded
    #[error("Failed to decode {encoding} body: {source}")]
    Decode {
        encoding: String,
        #[source]
        source: std::io::Error,
    },

    /// Copy failed part way; `written` bytes already reached the sink
    #[error("Relay failed after {written} bytes: {source}")]
    Relay {
        written: u64,
        #[source]
        source: std::io::Error,
    },

    /// Forwarded body stream was already taken by an earlier exchange
    #[error("Forwarded body stream has already been consumed")]
    BodyConsumed,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a proxy parse error
    pub fn proxy(proxy: impl Into<String>, reason: impl ToString) -> Self {
        Error::Proxy {
            proxy: proxy.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a gzip decoding error
    pub fn gzip(source: std::io::Error) -> Self {
        Error::Decode {
            encoding: "gzip".to_string(),
            source,
        }
    }

    /// Create a relay error
    pub fn relay(written: u64, source: std::io::Error) -> Self {
        Error::Relay { written, source }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this error was raised before any network I/O
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Url(_) | Error::Proxy { .. } | Error::Config(_) | Error::Serialization(_)
        )
    }

    /// Check if this error came from the transport
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout(),
            Error::Io(e) | Error::Relay { source: e, .. } => {
                e.kind() == std::io::ErrorKind::TimedOut
            }
            _ => false,
        }
    }

    /// Bytes already delivered to the sink when a relay failed
    pub fn bytes_written(&self) -> Option<u64> {
        match self {
            Error::Relay { written, .. } => Some(*written),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors() {
        let err = Error::proxy("::not a url::", "relative URL without a base");
        assert!(err.is_config());
        assert!(!err.is_transport());
        assert!(err.to_string().contains("::not a url::"));

        let err: Error = url::Url::parse("not a url").unwrap_err().into();
        assert!(err.is_config());
    }

    #[test]
    fn test_relay_error() {
        let err = Error::relay(
            3,
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "peer went away"),
        );
        assert_eq!(err.bytes_written(), Some(3));
        assert!(!err.is_config());
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_timeout_classification() {
        let err = Error::relay(
            0,
            std::io::Error::new(std::io::ErrorKind::TimedOut, "slow upstream"),
        );
        assert!(err.is_timeout());
        assert_eq!(Error::BodyConsumed.bytes_written(), None);
    }
}
