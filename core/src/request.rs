//! Turn a `RequestConfig` into a plain-data `HttpRequest`.

use crate::config::RequestConfig;
use crate::http::HttpRequest;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Build the wire-level request for `config`.
///
/// Header order: defaults (`accept`, plus `content-type` when a body is
/// present), then caller headers replacing any default with the same name
/// (case-insensitive), then `authorization` when the config carries a token.
///
/// The body was already rendered to a JSON value when the config was built,
/// so this step cannot fail.
pub fn build_request(config: &RequestConfig) -> HttpRequest {
    let body = config.body().map(|value| value.to_string());

    let mut headers = vec![("accept".to_string(), JSON_CONTENT_TYPE.to_string())];
    if body.is_some() {
        headers.push(("content-type".to_string(), JSON_CONTENT_TYPE.to_string()));
    }
    if let Some(custom) = config.headers() {
        for (name, value) in custom {
            set_header(&mut headers, name, value);
        }
    }
    if let Some(token) = config.auth_token() {
        set_header(&mut headers, "authorization", &format!("Bearer {token}"));
    }

    HttpRequest {
        method: config.method(),
        url: config.url(),
        headers,
        body,
    }
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    headers.push((name.to_string(), value.to_string()));
}
