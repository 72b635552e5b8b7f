// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client, request builder and exchange execution

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::redirect::Policy;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::body::{Body, BodyStream};
use super::cookie::CookieJar;
use super::decode::decode_body;
use super::options::{merge_options, RequestOptions};
use super::request::{assemble, ClientKey, TransportSettings};
use super::response::{Response, StreamingResponse};
use super::values::Values;
use crate::error::Result;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent string (reqwest's default when None)
    pub user_agent: Option<String>,
    /// Default whole-exchange timeout
    pub timeout: Option<Duration>,
    /// Redirects followed when a request does not override the policy
    pub max_redirects: usize,
    /// Idle connections kept per host
    pub max_idle_per_host: usize,
    /// How long an idle connection is kept
    pub idle_timeout: Duration,
    /// Accept invalid certificates (dangerous!)
    pub accept_invalid_certs: bool,
    /// Template every new builder is overlaid on
    pub default_options: RequestOptions,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout: None,
            max_redirects: 10,
            max_idle_per_host: 10,
            idle_timeout: Duration::from_secs(30),
            accept_invalid_certs: false,
            default_options: RequestOptions::default(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Set the template new builders start from
    pub fn default_options(mut self, options: RequestOptions) -> Self {
        self.default_options = options;
        self
    }

    fn client_builder(&self) -> reqwest::ClientBuilder {
        let mut builder = reqwest::Client::builder()
            .redirect(Policy::limited(self.max_redirects))
            .pool_max_idle_per_host(self.max_idle_per_host)
            .pool_idle_timeout(self.idle_timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs);

        if let Some(ref user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder
    }
}

/// Entry point: owns the shared connection pool and the default options.
///
/// Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct Client {
    shared: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl Client {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let shared = config.client_builder().build()?;
        Ok(Self {
            shared,
            config: Arc::new(config),
        })
    }

    /// New builder from `options` overlaid on the client's default options
    pub fn req(&self, options: Option<RequestOptions>) -> RequestBuilder {
        let options =
            merge_options(options, Some(&self.config.default_options)).unwrap_or_default();
        RequestBuilder {
            options,
            transport: Transport::new(self.shared.clone(), self.config.clone()),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

/// Transport handle bound to one builder.
///
/// Exchanges that need per-request transport behaviour (proxy, cookie jar,
/// redirect stop, no keep-alive) get a dedicated client, cached until the
/// settings change.
struct Transport {
    shared: reqwest::Client,
    config: Arc<ClientConfig>,
    dedicated: Option<(ClientKey, reqwest::Client)>,
}

impl Transport {
    fn new(shared: reqwest::Client, config: Arc<ClientConfig>) -> Self {
        Self {
            shared,
            config,
            dedicated: None,
        }
    }

    fn client_for(&mut self, settings: &TransportSettings) -> Result<reqwest::Client> {
        if !settings.needs_dedicated_client() {
            return Ok(self.shared.clone());
        }

        let key = settings.client_key();
        if let Some((cached, client)) = &self.dedicated {
            if *cached == key {
                return Ok(client.clone());
            }
        }

        let mut builder = self.config.client_builder();
        if let Some(ref proxy) = settings.proxy {
            builder = builder.proxy(proxy.clone());
        }
        if let Some(ref jar) = settings.cookie_jar {
            builder = builder.cookie_provider(Arc::new(jar.clone()));
        }
        if settings.stop_at_redirect {
            builder = builder.redirect(Policy::custom(|attempt| attempt.stop()));
        }
        if settings.disable_keep_alive {
            builder = builder.pool_max_idle_per_host(0);
        }

        let client = builder.build()?;
        tracing::debug!(settings = ?settings, "Built dedicated transport client");
        self.dedicated = Some((key, client.clone()));
        Ok(client)
    }

    /// Independent handle sharing the pool but not the dedicated client
    fn fork(&self) -> Self {
        Self::new(self.shared.clone(), self.config.clone())
    }
}

/// Fluent, reusable request builder.
///
/// Setters mutate the builder in place and return it for chaining. The
/// builder can run any number of exchanges; it is not meant to be shared
/// between tasks, but [`RequestBuilder::req`] derives independent copies.
pub struct RequestBuilder {
    options: RequestOptions,
    transport: Transport,
}

impl RequestBuilder {
    /// Derive a child builder: `options` overlaid on a copy of this
    /// builder's options. The child never writes back into the parent.
    pub fn req(&self, options: Option<RequestOptions>) -> RequestBuilder {
        let options = merge_options(options, Some(&self.options)).unwrap_or_default();
        RequestBuilder {
            options,
            transport: self.transport.fork(),
        }
    }

    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut RequestOptions {
        &mut self.options
    }

    /// Set method and target URL
    pub fn method(&mut self, method: impl Into<String>, url: impl Into<String>) -> &mut Self {
        self.options.method = method.into();
        self.options.url = url.into();
        self
    }

    pub fn get(&mut self, url: impl Into<String>) -> &mut Self {
        self.method(Method::GET.as_str(), url)
    }

    pub fn post(&mut self, url: impl Into<String>) -> &mut Self {
        self.method(Method::POST.as_str(), url)
    }

    pub fn put(&mut self, url: impl Into<String>) -> &mut Self {
        self.method(Method::PUT.as_str(), url)
    }

    pub fn patch(&mut self, url: impl Into<String>) -> &mut Self {
        self.method(Method::PATCH.as_str(), url)
    }

    pub fn delete(&mut self, url: impl Into<String>) -> &mut Self {
        self.method(Method::DELETE.as_str(), url)
    }

    pub fn head(&mut self, url: impl Into<String>) -> &mut Self {
        self.method(Method::HEAD.as_str(), url)
    }

    /// Form body (`application/x-www-form-urlencoded`)
    pub fn form_data(&mut self, form: Values) -> &mut Self {
        self.body(Body::Form(form))
    }

    /// Pre-serialized JSON body, sent verbatim
    pub fn json_string(&mut self, json: impl Into<Bytes>) -> &mut Self {
        self.body(Body::Raw(json.into()))
    }

    /// JSON body serialized from `value`
    pub fn json_object<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<&mut Self> {
        let body = Body::json(value)?;
        Ok(self.body(body))
    }

    /// Forward an open stream as the body
    pub fn body_stream(&mut self, content_type: impl Into<String>, stream: BodyStream) -> &mut Self {
        self.body(Body::forwarded(content_type, stream))
    }

    pub fn body(&mut self, body: Body) -> &mut Self {
        self.options.body = Some(body);
        self
    }

    /// Append a header value; a name already present in another case
    /// collects under the stored spelling
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let key = self
            .options
            .headers
            .keys()
            .find(|existing| existing.eq_ignore_ascii_case(&name))
            .cloned()
            .unwrap_or(name);
        self.options.headers.entry(key).or_default().push(value.into());
        self
    }

    /// Append a query parameter
    pub fn query(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.options.query.add(key, value);
        self
    }

    /// Never send the header stored under `name`
    pub fn remove_header(&mut self, name: impl Into<String>) -> &mut Self {
        self.options.headers_to_remove.insert(name.into());
        self
    }

    pub fn timeout(&mut self, timeout: Duration) -> &mut Self {
        self.options.timeout = Some(timeout);
        self
    }

    pub fn proxy(&mut self, proxy: impl Into<String>) -> &mut Self {
        self.options.proxy = Some(proxy.into());
        self
    }

    /// `true` returns the first redirect response instead of following it
    pub fn follow_redirect(&mut self, follow: bool) -> &mut Self {
        self.options.follow_redirect = Some(follow);
        self
    }

    pub fn disable_keep_alive(&mut self, disable: bool) -> &mut Self {
        self.options.disable_keep_alive = Some(disable);
        self
    }

    pub fn cookie_jar(&mut self, jar: CookieJar) -> &mut Self {
        self.options.cookie_jar = Some(jar);
        self
    }

    /// Run the exchange without touching the body encoding
    pub async fn send_raw(&mut self) -> Result<StreamingResponse> {
        let assembled = assemble(&mut self.options)?;
        let client = self.transport.client_for(&assembled.settings)?;

        let mut request = client
            .request(assembled.method.clone(), assembled.url.clone())
            .headers(assembled.headers);
        if let Some(body) = assembled.body {
            request = request.body(body.into_reqwest_body());
        }
        if let Some(timeout) = assembled.settings.timeout {
            request = request.timeout(timeout);
        }

        let start = Instant::now();
        let response = request.send().await?;
        let response_time_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            method = %assembled.method,
            url = %assembled.url,
            status = %response.status(),
            time_ms = response_time_ms,
            "Response"
        );

        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let redirected = url != assembled.url;
        let body = BodyStream::from_stream(response.bytes_stream().map_err(transport_io_error));

        Ok(StreamingResponse {
            status,
            headers,
            url,
            redirected,
            response_time_ms,
            body,
        })
    }

    /// Run the exchange; a gzip body is decoded transparently
    pub async fn send(&mut self) -> Result<StreamingResponse> {
        let mut response = self.send_raw().await?;
        let raw = std::mem::replace(&mut response.body, BodyStream::empty());
        response.body = decode_body(&response.headers, raw).await?;
        Ok(response)
    }

    /// Run the exchange and read the whole body
    pub async fn fetch(&mut self) -> Result<Response> {
        self.send().await?.into_response().await
    }

    /// Run the exchange and decode the JSON body into `T`
    pub async fn to<T: DeserializeOwned>(&mut self) -> Result<(T, Response)> {
        let response = self.fetch().await?;
        let value = response.json()?;
        Ok((value, response))
    }
}

fn transport_io_error(err: reqwest::Error) -> io::Error {
    let kind = if err.is_timeout() {
        io::ErrorKind::TimedOut
    } else {
        io::ErrorKind::Other
    };
    io::Error::new(kind, err)
}
