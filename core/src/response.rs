//! The success/failure envelope returned by every dispatched call.
//!
//! # Design
//! `ResponseEnvelope` exposes flat accessors (`is_successful`, `data`,
//! `status_code`, `error_message`) but stores the outcome as an enum, so a
//! payload and an error can never be set together.

use std::fmt;

use crate::error::ApiError;
use crate::http::HttpResponse;
use crate::shape::ResponseShape;

#[derive(Debug, Clone, PartialEq)]
enum Outcome<T> {
    Success(Option<T>),
    Failure(ApiError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope<T> {
    outcome: Outcome<T>,
    status_code: Option<u16>,
    headers: Vec<(String, String)>,
}

impl<T> ResponseEnvelope<T> {
    pub fn success(data: Option<T>, status_code: u16, headers: Vec<(String, String)>) -> Self {
        Self {
            outcome: Outcome::Success(data),
            status_code: Some(status_code),
            headers,
        }
    }

    /// `status_code` is `None` when no response arrived (transport failure, timeout).
    pub fn failure(error: ApiError, status_code: Option<u16>, headers: Vec<(String, String)>) -> Self {
        Self {
            outcome: Outcome::Failure(error),
            status_code,
            headers,
        }
    }

    pub fn is_successful(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match &self.outcome {
            Outcome::Success(data) => data.as_ref(),
            Outcome::Failure(_) => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self.outcome {
            Outcome::Success(data) => data,
            Outcome::Failure(_) => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    pub fn error(&self) -> Option<&ApiError> {
        match &self.outcome {
            Outcome::Success(_) => None,
            Outcome::Failure(e) => Some(e),
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }

    /// Response headers; empty when no response arrived.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// # Errors
    /// The failure carried by the envelope.
    pub fn into_result(self) -> Result<Option<T>, ApiError> {
        match self.outcome {
            Outcome::Success(data) => Ok(data),
            Outcome::Failure(e) => Err(e),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResponseEnvelope<U> {
        let outcome = match self.outcome {
            Outcome::Success(data) => Outcome::Success(data.map(f)),
            Outcome::Failure(e) => Outcome::Failure(e),
        };
        ResponseEnvelope {
            outcome,
            status_code: self.status_code,
            headers: self.headers,
        }
    }
}

impl<T> fmt::Display for ResponseEnvelope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.outcome, self.status_code) {
            (Outcome::Success(_), Some(status)) => {
                write!(f, "success (status {status}, {} headers)", self.headers.len())
            }
            (Outcome::Success(_), None) => write!(f, "success"),
            (Outcome::Failure(e), Some(status)) => write!(f, "failure (status {status}): {e}"),
            (Outcome::Failure(e), None) => write!(f, "failure: {e}"),
        }
    }
}

/// Interpret a received response according to `shape`.
///
/// Non-2xx statuses fail with [`ApiError::HttpStatus`]. A 2xx body the
/// shape cannot decode fails with [`ApiError::Deserialization`] and keeps
/// the 2xx status code.
pub fn parse_response<S: ResponseShape>(response: HttpResponse, shape: &S) -> ResponseEnvelope<S::Output> {
    if !response.is_success() {
        let HttpResponse { status, headers, body } = response;
        return ResponseEnvelope::failure(ApiError::http_status(status, body), Some(status), headers);
    }
    match shape.decode(&response) {
        Ok(data) => ResponseEnvelope::success(data, response.status, response.headers),
        Err(e) => ResponseEnvelope::failure(e, Some(response.status), response.headers),
    }
}
