// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Reqpipe - Layered HTTP Request Builder
//!
//! A fluent HTTP client with layered defaults and streaming relays.
//!
//! ## Features
//!
//! - Layered options: client defaults, parent builders and call-site values
//!   merge without overwriting what a layer already set
//! - Body strategies: form, verbatim JSON, serialized JSON, forwarded stream
//! - Per-request transport: proxy, cookie jar, redirect stop, no keep-alive
//! - Transparent gzip decoding of response bodies
//! - Streaming relays: response to writer, response to next request,
//!   received request to upstream, upstream response to client
//!
//! ## Example
//!
//! ```rust,no_run
//! use reqpipe::{Client, Values};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new()?;
//!
//!     let mut form = Values::new();
//!     form.add("userName", "nxu");
//!     form.add("pwd", "111");
//!
//!     let response = client
//!         .req(None)
//!         .post("https://example.com/login")
//!         .form_data(form)
//!         .fetch()
//!         .await?;
//!     println!("{}: {}", response.status, response.text_lossy());
//!
//!     // Stream a download straight to stdout
//!     let mut stdout = tokio::io::stdout();
//!     client
//!         .req(None)
//!         .get("https://example.com/large")
//!         .pipe_stream(&mut stdout)
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod http;
pub mod relay;

// Errors
pub use error::{Error, Result};

// Builder and client
pub use http::{Client, ClientConfig, RequestBuilder};

// Options
pub use http::{merge_options, HeaderValues, RequestOptions, Values};

// Bodies
pub use http::{Body, BodyStream, ForwardedStream};

// Cookies
pub use http::{Cookie, CookieJar};

// Responses
pub use http::{Response, StreamingResponse};

// Relays
pub use relay::{
    copy_chunked, IncomingRequest, OutboundResponse, ResponseRecorder, RELAY_CHUNK_SIZE,
};

/// Reqpipe version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
