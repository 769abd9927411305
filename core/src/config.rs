//! Immutable description of a single HTTP call.
//!
//! # Design
//! All validation happens here, at construction time, so a `RequestConfig`
//! that exists is always dispatchable. Fields are private and only exposed
//! through accessors; there is no way to mutate a config once built. The
//! body is converted to a `serde_json::Value` eagerly, which moves
//! serialization failures into `ConfigError` as well.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::error::ConfigError;
use crate::http::HttpMethod;

/// Timeout used by [`RequestConfigBuilder`] when none is given.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Clone, PartialEq)]
pub struct RequestConfig {
    base_url: String,
    endpoint: String,
    method: HttpMethod,
    headers: Option<BTreeMap<String, String>>,
    body: Option<Value>,
    timeout: Duration,
    auth_token: Option<String>,
}

impl RequestConfig {
    /// Validate the arguments and build a config.
    ///
    /// `headers: None` means "default headers only". A `Value::Null` body is
    /// treated as no body.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] when the base URL is empty or not an
    /// absolute http(s) URL, the endpoint is neither empty nor rooted at
    /// `/`, `timeout_ms` is zero, or a body is given for GET, HEAD or DELETE.
    pub fn build(
        base_url: &str,
        endpoint: &str,
        method: HttpMethod,
        headers: Option<BTreeMap<String, String>>,
        body: Option<Value>,
        timeout_ms: u64,
        auth_token: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let base_url = validate_base_url(base_url)?;
        if !endpoint.is_empty() && !endpoint.starts_with('/') {
            return Err(ConfigError::InvalidEndpoint(endpoint.to_string()));
        }
        if timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        let body = body.filter(|b| !b.is_null());
        if body.is_some() && !method.allows_body() {
            return Err(ConfigError::BodyNotAllowed(method));
        }

        Ok(Self {
            base_url,
            endpoint: endpoint.to_string(),
            method,
            headers,
            body,
            timeout: Duration::from_millis(timeout_ms),
            auth_token: auth_token.map(str::to_string),
        })
    }

    /// Same as [`RequestConfig::build`] with no auth token.
    ///
    /// # Errors
    /// See [`RequestConfig::build`].
    pub fn build_without_token(
        base_url: &str,
        endpoint: &str,
        method: HttpMethod,
        headers: Option<BTreeMap<String, String>>,
        body: Option<Value>,
        timeout_ms: u64,
    ) -> Result<Self, ConfigError> {
        Self::build(base_url, endpoint, method, headers, body, timeout_ms, None)
    }

    pub fn builder(base_url: &str, endpoint: &str, method: HttpMethod) -> RequestConfigBuilder {
        RequestConfigBuilder::new(base_url, endpoint, method)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `base_url` followed by `endpoint`.
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, self.endpoint)
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn headers(&self) -> Option<&BTreeMap<String, String>> {
        self.headers.as_ref()
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }
}

// Hand-written so the token never ends up in logs.
impl fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field("base_url", &self.base_url)
            .field("endpoint", &self.endpoint)
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("timeout", &self.timeout)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn validate_base_url(base_url: &str) -> Result<String, ConfigError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyBaseUrl);
    }
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };
    let parsed = url::Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", parsed.scheme())));
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Fluent alternative to the positional [`RequestConfig::build`].
#[derive(Debug, Clone)]
pub struct RequestConfigBuilder {
    base_url: String,
    endpoint: String,
    method: HttpMethod,
    headers: Option<BTreeMap<String, String>>,
    body: Option<Value>,
    body_error: Option<String>,
    timeout_ms: u64,
    auth_token: Option<String>,
}

impl RequestConfigBuilder {
    pub fn new(base_url: &str, endpoint: &str, method: HttpMethod) -> Self {
        Self {
            base_url: base_url.to_string(),
            endpoint: endpoint.to_string(),
            method,
            headers: None,
            body: None,
            body_error: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            auth_token: None,
        }
    }

    /// Add one header. Later values for the same name win.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Replace every header added so far.
    pub fn headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Serialize `body` to JSON. A serialization failure is reported by `build`.
    pub fn body<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => {
                self.body = Some(value);
                self.body_error = None;
            }
            Err(e) => {
                self.body = None;
                self.body_error = Some(e.to_string());
            }
        }
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// # Errors
    /// Everything [`RequestConfig::build`] rejects, plus
    /// [`ConfigError::BodySerialization`] when the body did not serialize.
    pub fn build(self) -> Result<RequestConfig, ConfigError> {
        if let Some(e) = self.body_error {
            return Err(ConfigError::BodySerialization(e));
        }
        RequestConfig::build(
            &self.base_url,
            &self.endpoint,
            self.method,
            self.headers,
            self.body,
            self.timeout_ms,
            self.auth_token.as_deref(),
        )
    }
}
