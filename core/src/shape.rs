//! Descriptors for the expected body of a successful response.
//!
//! A shape decides what a 2xx body turns into: a typed JSON payload
//! ([`Json`]), nothing at all ([`NoPayload`], e.g. for HEAD), or the raw
//! text ([`Text`]). Non-2xx responses never reach a shape.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::HttpResponse;

pub trait ResponseShape {
    type Output;

    /// Decode a 2xx response. `Ok(None)` means success without data.
    ///
    /// # Errors
    /// [`ApiError::Deserialization`] when the body does not fit the shape.
    fn decode(&self, response: &HttpResponse) -> Result<Option<Self::Output>, ApiError>;
}

/// Parse the body as JSON into `T`.
///
/// An empty body is decoded as JSON `null`, so `Json<()>` and
/// `Json<Option<_>>` accept `204 No Content`. A zero-sized `T` (`()`, a unit
/// struct) still has its body checked but yields no data, like [`NoPayload`].
pub struct Json<T>(PhantomData<fn() -> T>);

impl<T> Json<T> {
    pub fn new() -> Self {
        Json(PhantomData)
    }
}

impl<T> Default for Json<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Json<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Json<T> {}

impl<T> fmt::Debug for Json<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Json<{}>", std::any::type_name::<T>())
    }
}

impl<T: DeserializeOwned> ResponseShape for Json<T> {
    type Output = T;

    fn decode(&self, response: &HttpResponse) -> Result<Option<T>, ApiError> {
        let body = if response.body.trim().is_empty() {
            "null"
        } else {
            response.body.as_str()
        };
        let value: T = serde_json::from_str(body).map_err(|e| {
            let message = match response.content_type() {
                Some(ct) if !ct.contains("json") => format!("{e} (content-type: {ct})"),
                _ => e.to_string(),
            };
            ApiError::Deserialization(message)
        })?;
        if std::mem::size_of::<T>() == 0 {
            return Ok(None);
        }
        Ok(Some(value))
    }
}

/// Success carries no data; the body is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPayload;

impl ResponseShape for NoPayload {
    type Output = ();

    fn decode(&self, _response: &HttpResponse) -> Result<Option<()>, ApiError> {
        Ok(None)
    }
}

/// The body as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Text;

impl ResponseShape for Text {
    type Output = String;

    fn decode(&self, response: &HttpResponse) -> Result<Option<String>, ApiError> {
        Ok(Some(response.body.clone()))
    }
}
