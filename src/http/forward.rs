//! Upstream forwarding and outbound redaction.
//!
//! # Responsibilities
//! - Rewrite the request URI to target the upstream build API
//! - Send the request with the shared legacy client
//! - Buffer the response and redact secret material before it leaves

use std::str::FromStr;

use axum::{
    body::{Body, Bytes},
    http::{
        header,
        request::Parts,
        uri::{Authority, Scheme},
        Request, Response, Uri,
    },
    response::IntoResponse,
};

use crate::config::GatewayConfig;
use crate::error::Rejection;
use crate::http::server::AppState;
use crate::secrets::redact::{redact_text, sanitize_value};

/// Ceiling on buffered upstream response bodies. Responses above this are
/// refused rather than passed through unscanned.
const MAX_RESPONSE_BYTES: usize = 32 * 1024 * 1024;

/// Forward an already-inspected request to the upstream and sanitize the
/// response on the way back.
pub async fn forward(
    state: &AppState,
    config: &GatewayConfig,
    parts: Parts,
    body: Bytes,
) -> axum::response::Response {
    let authority = match Authority::from_str(&config.upstream.address) {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(error = %e, address = %config.upstream.address, "Bad upstream address");
            return Rejection::service_unavailable("upstream_unavailable", "Upstream misconfigured")
                .into_response();
        }
    };

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(authority);
    let uri = match Uri::from_parts(uri_parts) {
        Ok(u) => u,
        Err(_) => parts.uri.clone(),
    };

    let mut builder = Request::builder()
        .method(parts.method.clone())
        .uri(uri)
        .version(parts.version);
    if let Some(headers) = builder.headers_mut() {
        for (name, value) in parts.headers.iter() {
            if name != header::HOST {
                headers.insert(name.clone(), value.clone());
            }
        }
    }
    let request = match builder.body(Body::from(body)) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build upstream request");
            return Rejection::service_unavailable("upstream_unavailable", "Upstream request failed")
                .into_response();
        }
    };

    match state.client.request(request).await {
        Ok(response) => sanitize_response(state, response.map(Body::new)).await,
        Err(e) => {
            tracing::error!(error = %e, "Upstream request failed");
            Rejection::service_unavailable("upstream_unavailable", "Upstream request failed")
                .into_response()
        }
    }
}

/// Buffer the upstream response and redact secrets from textual bodies.
/// Binary bodies pass through untouched.
async fn sanitize_response(state: &AppState, response: Response<Body>) -> axum::response::Response {
    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_RESPONSE_BYTES).await {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(error = %e, "Failed to buffer upstream response");
            return Rejection::service_unavailable(
                "upstream_unavailable",
                "Upstream response could not be read",
            )
            .into_response();
        }
    };

    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let sanitized: Bytes = if content_type.contains("json") {
        match serde_json::from_slice::<serde_json::Value>(&bytes) {
            Ok(value) => {
                let clean = sanitize_value(&state.secrets, &value);
                match serde_json::to_vec(&clean) {
                    Ok(v) => Bytes::from(v),
                    Err(_) => bytes,
                }
            }
            // Declared JSON that does not parse still gets the text pass.
            Err(_) => redact_bytes(state, bytes),
        }
    } else if content_type.starts_with("text/") || content_type.is_empty() {
        redact_bytes(state, bytes)
    } else {
        bytes
    };

    // Length changed under redaction; let the server recompute framing.
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.remove(header::TRANSFER_ENCODING);
    Response::from_parts(parts, Body::from(sanitized)).into_response()
}

fn redact_bytes(state: &AppState, bytes: Bytes) -> Bytes {
    match std::str::from_utf8(&bytes) {
        Ok(text) => {
            let clean = redact_text(&state.secrets, text);
            if clean == text {
                bytes
            } else {
                Bytes::from(clean)
            }
        }
        Err(_) => bytes,
    }
}
