//! HTTP endpoint for contact-form submissions.

use std::net::SocketAddr;

use axum::body::to_bytes;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::header::{HeaderMap, ORIGIN, USER_AGENT};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, debug, error, info_span, warn};
use uuid::Uuid;

use super::ContactState;
use super::model::{ClientInfo, ContactForm};

/// Largest request body accepted.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build the contact router: the submission endpoint on `/` and
/// `/api/contact`, plus a health check.
pub fn contact_routes(state: ContactState) -> Router {
    Router::new()
        .route("/", any(submit))
        .route("/api/contact", any(submit))
        .route("/health", get(health))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "contact-relay"
    }))
}

fn error_body(status: StatusCode, headers: HeaderMap, message: &str) -> Response {
    (status, headers, Json(serde_json::json!({ "error": message }))).into_response()
}

fn header_str<'a>(headers: &'a HeaderMap, name: impl axum::http::header::AsHeaderName) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Client address from `X-Forwarded-For` (verbatim), else the TCP peer.
fn client_info(request_headers: &HeaderMap, peer: Option<SocketAddr>) -> ClientInfo {
    let forwarded = header_str(request_headers, "x-forwarded-for");
    let ip = if forwarded.is_empty() {
        peer.map(|addr| addr.ip().to_string()).unwrap_or_default()
    } else {
        forwarded.to_string()
    };
    ClientInfo {
        ip,
        user_agent: header_str(request_headers, USER_AGENT).to_string(),
    }
}

/// POST/OPTIONS handler.
async fn submit(State(state): State<ContactState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let origin = header_str(&parts.headers, ORIGIN);

    match parts.method {
        Method::OPTIONS => {
            debug!(origin = origin, "Preflight");
            return (StatusCode::NO_CONTENT, state.origins.preflight_headers(origin))
                .into_response();
        }
        Method::POST => {}
        _ => {
            return error_body(
                StatusCode::METHOD_NOT_ALLOWED,
                HeaderMap::new(),
                "Method Not Allowed",
            );
        }
    }

    let Some(cors) = state.origins.request_headers(origin) else {
        warn!(origin = origin, "Rejected submission from disallowed origin");
        return error_body(StatusCode::FORBIDDEN, HeaderMap::new(), "Forbidden");
    };

    let peer = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_info(&parts.headers, peer);

    let form = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => serde_json::from_slice::<ContactForm>(&bytes).ok(),
        Err(e) => {
            debug!(error = %e, "Failed to read request body");
            None
        }
    };
    let Some(submission) = form.and_then(|form| form.validate(client)) else {
        debug!("Rejected submission with missing fields");
        return error_body(StatusCode::BAD_REQUEST, cors, "Bad Request");
    };

    let span = info_span!("submission", request_id = %Uuid::new_v4());
    match state.pipeline.process(&submission).instrument(span).await {
        Ok(_) => (StatusCode::OK, cors, Json(serde_json::json!({ "ok": true }))).into_response(),
        Err(e) => {
            error!(error = %e, "Submission failed");
            error_body(StatusCode::INTERNAL_SERVER_ERROR, cors, "Server Error")
        }
    }
}
