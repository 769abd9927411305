//! Error types for the API client core.
//!
//! # Design
//! `ConfigError` is the only error a caller ever sees as an `Err`: it is
//! raised while building a `RequestConfig`, before anything touches the
//! network. Everything that can go wrong during dispatch is an `ApiError`
//! and travels inside a failed `ResponseEnvelope` instead.

use thiserror::Error;

use crate::http::HttpMethod;

/// Longest slice of a response body quoted in an error message.
const MAX_BODY_IN_MESSAGE: usize = 512;

/// Invalid arguments passed to the `RequestConfig` builder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("base URL must not be empty")]
    EmptyBaseUrl,

    /// The base URL did not parse, or its scheme is not http/https.
    #[error("base URL `{url}` is not an absolute http(s) URL: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("endpoint `{0}` must be empty or start with '/'")]
    InvalidEndpoint(String),

    #[error("timeout must be a positive number of milliseconds")]
    ZeroTimeout,

    #[error("{0} requests must not carry a body")]
    BodyNotAllowed(HttpMethod),

    #[error("request body could not be serialized: {0}")]
    BodySerialization(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client could not be initialised: {0}")]
    HttpClient(String),
}

/// Failures reported by a `Transport` before any response arrived.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection refused, DNS lookup failure, TLS handshake failure.
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Everything that can make a dispatched call fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// No terminal response arrived before the configured deadline.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a status outside 200-299.
    #[error("{}", status_message(.status, .reason, .body))]
    HttpStatus {
        status: u16,
        reason: String,
        body: String,
    },

    /// A 2xx body did not match the expected response shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

/// Discriminant of [`ApiError`], handy for matching without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    Timeout,
    HttpStatus,
    Deserialization,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::Timeout => ErrorKind::Timeout,
            ApiError::HttpStatus { .. } => ErrorKind::HttpStatus,
            ApiError::Deserialization(_) => ErrorKind::Deserialization,
        }
    }

    /// Build an `HttpStatus` error, filling in the canonical reason phrase.
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("")
            .to_string();
        ApiError::HttpStatus {
            status,
            reason,
            body: body.into(),
        }
    }
}

fn status_message(status: &u16, reason: &str, body: &str) -> String {
    let mut message = format!("HTTP {status}");
    if !reason.is_empty() {
        message.push(' ');
        message.push_str(reason);
    }
    let body = body.trim();
    if !body.is_empty() {
        message.push_str(": ");
        match body.char_indices().nth(MAX_BODY_IN_MESSAGE) {
            Some((cut, _)) => {
                message.push_str(&body[..cut]);
                message.push_str("...");
            }
            None => message.push_str(body),
        }
    }
    message
}
