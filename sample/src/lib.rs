//! Demo adapter over `apiclient-core`.
//!
//! One [`Verb`] per HTTP method, each bound to the matching httpbin
//! endpoint and response type. [`config_for`] builds the request,
//! [`run_verb`] sends it and forwards a one-line summary to a
//! [`DisplaySink`]. The `api-sample` binary wires these to the command line.

pub mod display;
pub mod types;

use std::fmt;

use apiclient_core::{
    ConfigError, Dispatcher, HttpMethod, RequestConfig, ResponseEnvelope, ScreenHook, Transport,
};
use serde_json::{json, Value};

pub use display::{BusyIndicator, DisplaySink, LogSink};
pub use types::{DeleteResponse, GetResponse, Named, PatchResponse, PostResponse, PutResponse};

/// Name sent in the body of POST, PUT and PATCH requests.
pub const SAMPLE_NAME: &str = "apiclient";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Patch,
}

impl Verb {
    pub const ALL: [Verb; 6] = [Verb::Get, Verb::Post, Verb::Put, Verb::Delete, Verb::Head, Verb::Patch];

    pub fn method(self) -> HttpMethod {
        match self {
            Verb::Get => HttpMethod::Get,
            Verb::Post => HttpMethod::Post,
            Verb::Put => HttpMethod::Put,
            Verb::Delete => HttpMethod::Delete,
            Verb::Head => HttpMethod::Head,
            Verb::Patch => HttpMethod::Patch,
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            Verb::Get => "/get",
            Verb::Post => "/post",
            Verb::Put => "/put",
            Verb::Delete => "/delete",
            Verb::Head => "/headers",
            Verb::Patch => "/patch",
        }
    }

    pub fn body(self) -> Option<Value> {
        self.method().allows_body().then(|| json!({ "name": SAMPLE_NAME }))
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.method(), f)
    }
}

/// Build the request for `verb` against `base_url`.
///
/// # Errors
/// Whatever [`RequestConfig::build`] rejects, e.g. an empty base URL.
pub fn config_for(
    base_url: &str,
    verb: Verb,
    timeout_ms: u64,
    token: Option<&str>,
) -> Result<RequestConfig, ConfigError> {
    match token {
        Some(token) => RequestConfig::build(
            base_url,
            verb.endpoint(),
            verb.method(),
            None,
            verb.body(),
            timeout_ms,
            Some(token),
        ),
        None => RequestConfig::build_without_token(
            base_url,
            verb.endpoint(),
            verb.method(),
            None,
            verb.body(),
            timeout_ms,
        ),
    }
}

/// Send `config` with the response type for `verb` and report the outcome.
///
/// Returns whether the request succeeded.
pub async fn run_verb<T: Transport>(
    dispatcher: &Dispatcher<T>,
    config: &RequestConfig,
    verb: Verb,
    hook: Option<&ScreenHook>,
    sink: &dyn DisplaySink,
) -> bool {
    match verb {
        Verb::Get => report(sink, verb, dispatcher.send_json::<GetResponse>(config, hook).await, |d| {
            format!("Origin - {}, URL - {}", d.origin, d.url)
        }),
        Verb::Post => report(sink, verb, dispatcher.send_json::<PostResponse>(config, hook).await, |d| {
            format!("Form Name - {}", d.form.name)
        }),
        Verb::Put => report(sink, verb, dispatcher.send_json::<PutResponse>(config, hook).await, |d| {
            format!("Data - {}", d.data)
        }),
        Verb::Delete => report(sink, verb, dispatcher.send_json::<DeleteResponse>(config, hook).await, |d| {
            format!("Origin - {}", d.origin)
        }),
        Verb::Head => report(sink, verb, dispatcher.send_empty(config, hook).await, |_| String::new()),
        Verb::Patch => report(sink, verb, dispatcher.send_json::<PatchResponse>(config, hook).await, |d| {
            format!("JSON Data - {}", d.json.name)
        }),
    }
}

fn report<D>(
    sink: &dyn DisplaySink,
    verb: Verb,
    envelope: ResponseEnvelope<D>,
    describe: impl FnOnce(&D) -> String,
) -> bool {
    if let Some(message) = envelope.error_message() {
        sink.failure(verb, &message);
        return false;
    }
    // No payload (HEAD): the envelope's own summary lists what came back.
    let summary = match envelope.data() {
        Some(data) => describe(data),
        None => format!("Headers Received - {envelope}"),
    };
    sink.success(verb, &summary);
    true
}
