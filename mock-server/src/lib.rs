use std::{collections::BTreeMap, net::SocketAddr, time::Duration};

use axum::{
    extract::{ConnectInfo, Path},
    http::{header, Extensions, HeaderMap, StatusCode, Uri},
    response::IntoResponse,
    routing::{any, delete, get, patch, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Upper bound for `/delay/{secs}`.
pub const MAX_DELAY_SECS: u64 = 60;

/// What the echo endpoints send back, modelled on httpbin.
///
/// `form` holds the top-level scalar fields of a JSON object body, which is
/// enough for clients that read `form.name` after posting `{"name": ...}`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Echo {
    pub origin: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub json: Option<Value>,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub form: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Headers {
    pub headers: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Bearer {
    pub authenticated: bool,
    pub token: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/get", get(echo))
        .route("/post", post(echo))
        .route("/put", put(echo))
        .route("/patch", patch(echo))
        .route("/delete", delete(echo))
        .route("/headers", get(headers))
        .route("/bearer", get(bearer))
        .route("/delay/{secs}", get(delay))
        .route("/status/{code}", any(status))
        .route("/malformed", get(malformed))
        .layer(TraceLayer::new_for_http())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app().into_make_service_with_connect_info::<SocketAddr>()).await
}

async fn echo(extensions: Extensions, uri: Uri, headers: HeaderMap, body: String) -> Json<Echo> {
    Json(build_echo(&extensions, &uri, &headers, body))
}

async fn headers(headers: HeaderMap) -> Json<Headers> {
    Json(Headers {
        headers: header_map(&headers),
    })
}

async fn bearer(headers: HeaderMap) -> Result<Json<Bearer>, StatusCode> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;
    Ok(Json(Bearer {
        authenticated: true,
        token: token.to_string(),
    }))
}

async fn delay(
    Path(secs): Path<u64>,
    extensions: Extensions,
    uri: Uri,
    headers: HeaderMap,
) -> Json<Echo> {
    tokio::time::sleep(Duration::from_secs(secs.min(MAX_DELAY_SECS))).await;
    Json(build_echo(&extensions, &uri, &headers, String::new()))
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

async fn malformed() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], r#"{"origin": "#)
}

fn build_echo(extensions: &Extensions, uri: &Uri, headers: &HeaderMap, body: String) -> Echo {
    let origin = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let json: Option<Value> = serde_json::from_str(&body).ok();

    Echo {
        origin,
        url: format!("http://{host}{uri}"),
        headers: header_map(headers),
        form: json.as_ref().map(form_fields).unwrap_or_default(),
        json,
        data: body,
    }
}

fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
        .collect()
}

fn form_fields(json: &Value) -> BTreeMap<String, String> {
    let Some(object) = json.as_object() else {
        return BTreeMap::new();
    };
    object
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key.clone(), value))
        })
        .collect()
}
