// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP request layer
//!
//! Layered request options, body strategies, request assembly and the
//! fluent builder that runs exchanges.

mod body;
mod client;
mod cookie;
mod decode;
mod options;
mod request;
mod response;
mod values;

pub use body::{
    chunked, Body, BodyStream, BoxStream, ForwardedStream, FORM_CONTENT_TYPE, JSON_CONTENT_TYPE,
};
pub use client::{Client, ClientConfig, RequestBuilder};
pub use cookie::{Cookie, CookieJar};
pub use decode::{decode_body, is_gzip};
pub use options::{merge_options, HeaderValues, RequestOptions};
pub use request::{assemble, AssembledRequest, TransportSettings};
pub use response::{Response, StreamingResponse};
pub use values::Values;

