//! Typed, asynchronous HTTP client core.
//!
//! # Overview
//! A caller describes one call as an immutable [`RequestConfig`], hands it
//! to [`Dispatcher::send`] along with the shape it expects back, and gets a
//! [`ResponseEnvelope`] that is either a success (with typed data) or a
//! failure (with a message and, when a response arrived, its status code).
//! An optional [`ScreenHook`] is told when the call starts and ends.
//!
//! # Design
//! - Building ([`build_request`]) and parsing ([`parse_response`]) are pure
//!   functions over plain-data [`HttpRequest`] / [`HttpResponse`] values;
//!   only the [`Transport`] does I/O (reqwest by default).
//! - Invalid configs are rejected at build time with [`ConfigError`].
//!   Runtime failures never surface as `Err`; they land in the envelope.
//! - Response typing is compile-time: [`Json<T>`], [`NoPayload`], [`Text`].
//!
//! ```no_run
//! # async fn demo() -> Result<(), apiclient_core::ConfigError> {
//! use apiclient_core::{Dispatcher, HttpMethod, RequestConfig, ScreenHook};
//!
//! #[derive(serde::Deserialize)]
//! struct GetResponse {
//!     origin: String,
//! }
//!
//! let dispatcher = Dispatcher::new()?;
//! let config = RequestConfig::build_without_token("https://httpbin.org", "/get", HttpMethod::Get, None, None, 10_000)?;
//! let hook = ScreenHook::new().on_start(|| println!("busy")).on_end(|| println!("idle"));
//!
//! let response = dispatcher.send_json::<GetResponse>(&config, Some(&hook)).await;
//! match response.data() {
//!     Some(data) => println!("origin: {}", data.origin),
//!     None => eprintln!("failed: {:?}", response.error_message()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod hook;
pub mod http;
pub mod request;
pub mod response;
pub mod shape;
pub mod transport;

pub use config::{RequestConfig, RequestConfigBuilder, DEFAULT_TIMEOUT_MS};
pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use error::{ApiError, ConfigError, ErrorKind, TransportError};
pub use hook::{HookGuard, ScreenHook};
pub use http::{HttpMethod, HttpRequest, HttpResponse, UnknownMethod};
pub use request::build_request;
pub use response::{parse_response, ResponseEnvelope};
pub use shape::{Json, NoPayload, ResponseShape, Text};
pub use transport::{ReqwestTransport, Transport};
