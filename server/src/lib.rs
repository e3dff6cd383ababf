//! axum host for the item API.
//!
//! Every request lands on a single fallback service that converts it into
//! a plain `HttpRequest`, hands it to the core `Dispatcher` and writes the
//! resulting `HttpResponse` back. Routing, argument decoding and status
//! mapping all happen in the core; this crate only owns the network.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use http_body_util::LengthLimitError;
use itemapi_core::{codec, AppState, Dispatcher, HttpMethod, HttpRequest, HttpResponse};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod config;

use config::Config;

pub type SharedDispatcher = Arc<Dispatcher<AppState>>;

#[derive(Clone)]
struct Host {
    dispatcher: SharedDispatcher,
    max_body_bytes: usize,
}

/// Router over a fresh application with default settings.
pub fn app() -> Router {
    build(&Config::default())
}

/// Router over a fresh application configured from `config`.
pub fn build(config: &Config) -> Router {
    let dispatcher = itemapi_core::app().expose_fault_detail(config.expose_fault_detail);
    router(Arc::new(dispatcher), config.max_body_bytes)
}

/// Router over an existing dispatcher, so callers can inspect its state.
pub fn router(dispatcher: SharedDispatcher, max_body_bytes: usize) -> Router {
    Router::new()
        .fallback(bridge)
        .with_state(Host {
            dispatcher,
            max_body_bytes,
        })
        .layer(TraceLayer::new_for_http())
}

pub async fn run(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

async fn bridge(State(host): State<Host>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let Ok(method) = parts.method.as_str().parse::<HttpMethod>() else {
        tracing::debug!(method = %parts.method, "unsupported method");
        return error_response(StatusCode::NOT_IMPLEMENTED, "unsupported method");
    };

    let target = parts
        .uri
        .path_and_query()
        .map_or_else(|| parts.uri.path().to_string(), |pq| pq.as_str().to_string());

    let headers: Vec<(String, String)> = parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?;
            Some((name.as_str().to_string(), value.to_string()))
        })
        .collect();

    // Non-JSON posts are rejected by the core without looking at the body.
    let declares_json = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        == Some(codec::JSON_CONTENT_TYPE);

    let body = if method == HttpMethod::Post && declares_json {
        match to_bytes(body, host.max_body_bytes).await {
            Ok(bytes) => String::from_utf8(bytes.to_vec()).ok(),
            Err(err) => {
                let err = err.into_inner();
                if is_length_limit(&*err) {
                    return error_response(StatusCode::PAYLOAD_TOO_LARGE, "request body too large");
                }
                tracing::warn!(error = %err, "failed to read request body");
                return error_response(StatusCode::BAD_REQUEST, "failed to read request body");
            }
        }
    } else {
        None
    };

    let request = HttpRequest {
        method,
        target,
        headers,
        body,
    };
    into_axum_response(host.dispatcher.dispatch(&request))
}

fn is_length_limit(err: &(dyn std::error::Error + Send + Sync + 'static)) -> bool {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(err) = current {
        if err.is::<LengthLimitError>() {
            return true;
        }
        current = err.source();
    }
    false
}

fn into_axum_response(response: HttpResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = Response::builder().status(status);
    for (name, value) in &response.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder.body(Body::from(response.body)).unwrap_or_else(|err| {
        tracing::error!(error = %err, "failed to build response");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}

fn error_response(status: StatusCode, message: &str) -> Response {
    let body = codec::encode(&serde_json::json!({ "error": message })).unwrap_or_default();
    (
        status,
        [(header::CONTENT_TYPE, codec::JSON_CONTENT_TYPE)],
        body,
    )
        .into_response()
}
