//! The single async entry point that performs a call and returns an envelope.
//!
//! # Design
//! `send` is build → execute → parse, with the pure halves in
//! [`crate::request`] and [`crate::response`] and the I/O behind a
//! [`Transport`]. The whole execute step, body read included, runs under
//! `tokio::time::timeout`; when the deadline passes the transport future is
//! dropped, which abandons the in-flight request. `send` never returns an
//! error: every failure ends up in the envelope.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::config::RequestConfig;
use crate::error::{ApiError, ConfigError};
use crate::hook::ScreenHook;
use crate::request::build_request;
use crate::response::{parse_response, ResponseEnvelope};
use crate::shape::{Json, NoPayload, ResponseShape};
use crate::transport::{ReqwestTransport, Transport};

/// Settings for the HTTP client behind a [`Dispatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// `None` sends no User-Agent header.
    pub user_agent: Option<String>,
    /// Separate bound on connection setup. The per-request deadline in
    /// `RequestConfig` still bounds the whole call.
    pub connect_timeout: Option<Duration>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            user_agent: Some(format!("apiclient/{}", env!("CARGO_PKG_VERSION"))),
            connect_timeout: None,
        }
    }
}

/// Sends [`RequestConfig`]s over a shared [`Transport`]; cheap to clone and share across tasks.
pub struct Dispatcher<T = ReqwestTransport> {
    transport: Arc<T>,
}

impl Dispatcher<ReqwestTransport> {
    /// A reqwest-backed dispatcher with [`DispatcherConfig::default`].
    ///
    /// # Errors
    /// [`ConfigError::HttpClient`] if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_config(&DispatcherConfig::default())
    }

    /// # Errors
    /// [`ConfigError::HttpClient`] if the TLS backend cannot be initialised.
    pub fn with_config(config: &DispatcherConfig) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        }
        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        let client = builder.build().map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self::with_transport(ReqwestTransport::new(client)))
    }
}

impl<T: Transport> Dispatcher<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Dispatch `config` and decode a 2xx body according to `shape`.
    ///
    /// `hook.on_start` fires before the request is issued; `hook.on_end`
    /// fires once the envelope is final, whatever the outcome, and also if
    /// this future is dropped before completing.
    #[instrument(skip_all, fields(method = %config.method(), url = %config.url()))]
    pub async fn send<S: ResponseShape>(
        &self,
        config: &RequestConfig,
        shape: S,
        hook: Option<&ScreenHook>,
    ) -> ResponseEnvelope<S::Output> {
        let guard = hook.map(ScreenHook::enter);

        let envelope = self.dispatch(config, &shape).await;
        match envelope.error() {
            Some(e) => warn!(kind = ?e.kind(), status = ?envelope.status_code(), error = %e, "request failed"),
            None => debug!(status = ?envelope.status_code(), "request succeeded"),
        }

        drop(guard);
        envelope
    }

    /// [`Dispatcher::send`] with a [`Json`] shape.
    pub async fn send_json<D: DeserializeOwned>(
        &self,
        config: &RequestConfig,
        hook: Option<&ScreenHook>,
    ) -> ResponseEnvelope<D> {
        self.send(config, Json::<D>::new(), hook).await
    }

    /// [`Dispatcher::send`] with the [`NoPayload`] shape.
    pub async fn send_empty(&self, config: &RequestConfig, hook: Option<&ScreenHook>) -> ResponseEnvelope<()> {
        self.send(config, NoPayload, hook).await
    }

    async fn dispatch<S: ResponseShape>(&self, config: &RequestConfig, shape: &S) -> ResponseEnvelope<S::Output> {
        let request = build_request(config);
        debug!(
            headers = request.headers.len(),
            has_body = request.body.is_some(),
            timeout_ms = config.timeout().as_millis() as u64,
            "issuing request"
        );

        match tokio::time::timeout(config.timeout(), self.transport.execute(request)).await {
            Err(_elapsed) => ResponseEnvelope::failure(ApiError::Timeout, None, Vec::new()),
            Ok(Err(e)) => ResponseEnvelope::failure(e.into(), None, Vec::new()),
            Ok(Ok(response)) => {
                debug!(status = response.status, bytes = response.body.len(), "response received");
                parse_response(response, shape)
            }
        }
    }
}

impl<T> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T> fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("transport", &std::any::type_name::<T>())
            .finish()
    }
}
