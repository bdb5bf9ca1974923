//! Error taxonomy and structured rejection responses.
//!
//! # Responsibilities
//! - Define the gateway error taxonomy (validation / auth / authz / quota / policy)
//! - Map every rejection to a structured `{status_category, error_code, message}` body
//! - Surface rate-limit state via response headers on 429s
//!
//! # Design Decisions
//! - Live-traffic checks are fail-closed: the first error is terminal
//! - Rejection bodies never carry raw payloads or unredacted secrets
//! - Policy findings are advisory and never become live rejections

use axum::http::{header::HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// Coarse rejection category, serialized into every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Unauthorized,
    Forbidden,
    BadRequest,
    PayloadTooLarge,
    RateLimited,
    Timeout,
    MethodNotAllowed,
    ServiceUnavailable,
}

impl StatusCategory {
    pub fn status_code(self) -> StatusCode {
        match self {
            StatusCategory::Unauthorized => StatusCode::UNAUTHORIZED,
            StatusCategory::Forbidden => StatusCode::FORBIDDEN,
            StatusCategory::BadRequest => StatusCode::BAD_REQUEST,
            StatusCategory::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            StatusCategory::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            StatusCategory::Timeout => StatusCode::REQUEST_TIMEOUT,
            StatusCategory::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            StatusCategory::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusCategory::Unauthorized => "unauthorized",
            StatusCategory::Forbidden => "forbidden",
            StatusCategory::BadRequest => "bad_request",
            StatusCategory::PayloadTooLarge => "payload_too_large",
            StatusCategory::RateLimited => "rate_limited",
            StatusCategory::Timeout => "timeout",
            StatusCategory::MethodNotAllowed => "method_not_allowed",
            StatusCategory::ServiceUnavailable => "service_unavailable",
        }
    }
}

/// Structured rejection returned to the client on any failed check.
#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    pub status_category: StatusCategory,
    pub error_code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u64>,
}

impl Rejection {
    fn new(category: StatusCategory, code: &str, message: impl Into<String>) -> Self {
        Self {
            status_category: category,
            error_code: code.to_string(),
            message: message.into(),
            limit: None,
            remaining: None,
        }
    }

    pub fn unauthorized(code: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCategory::Unauthorized, code, message)
    }

    pub fn forbidden(code: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCategory::Forbidden, code, message)
    }

    pub fn bad_request(code: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCategory::BadRequest, code, message)
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(StatusCategory::PayloadTooLarge, "payload_too_large", message)
    }

    pub fn rate_limited(limit: u64, remaining: u64) -> Self {
        let mut r = Self::new(
            StatusCategory::RateLimited,
            "rate_limit_exceeded",
            "Rate limit exceeded",
        );
        r.limit = Some(limit);
        r.remaining = Some(remaining);
        r
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCategory::Timeout, "body_read_timeout", message)
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::new(StatusCategory::MethodNotAllowed, "method_not_allowed", message)
    }

    pub fn service_unavailable(code: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCategory::ServiceUnavailable, code, message)
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let status = self.status_category.status_code();
        let limit = self.limit;
        let remaining = self.remaining;
        let body = serde_json::to_string(&self)
            .unwrap_or_else(|_| r#"{"status_category":"bad_request"}"#.to_string());

        let mut response = Response::new(axum::body::Body::from(body));
        *response.status_mut() = status;
        response.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        if let (Some(l), Some(r)) = (limit, remaining) {
            if let Ok(v) = HeaderValue::from_str(&l.to_string()) {
                response.headers_mut().insert(X_RATELIMIT_LIMIT, v);
            }
            if let Ok(v) = HeaderValue::from_str(&r.to_string()) {
                response.headers_mut().insert(X_RATELIMIT_REMAINING, v);
            }
        }
        response
    }
}

/// Gateway error taxonomy. Library APIs return these; the HTTP layer
/// converts them into [`Rejection`] bodies at the edge.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed input or a matched injection signature.
    #[error("validation failed ({code}): {message}")]
    Validation { code: String, message: String },

    /// Missing or invalid credential.
    #[error("unauthenticated: {0}")]
    Auth(String),

    /// Authenticated but not permitted (verb, resource, or namespace).
    #[error("forbidden: {0}")]
    Authz(String),

    /// A size, rate, connection, queue, resource-quota, or
    /// disruption-budget ceiling was exceeded.
    #[error("quota exceeded: {0}")]
    Quota(String),

    /// Non-compliant cloud policy document. Reporting only; never raised
    /// on the request path.
    #[error("policy violation: {0}")]
    Policy(String),
}

impl GatewayError {
    pub fn validation(code: &str, message: impl Into<String>) -> Self {
        GatewayError::Validation {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Render this error as the wire-level rejection body.
    pub fn to_rejection(&self) -> Rejection {
        match self {
            GatewayError::Validation { code, message } => Rejection::bad_request(code, message),
            GatewayError::Auth(msg) => Rejection::unauthorized("unauthenticated", msg.clone()),
            GatewayError::Authz(msg) => Rejection::forbidden("forbidden", msg.clone()),
            GatewayError::Quota(msg) => {
                Rejection::forbidden("quota_exceeded", msg.clone())
            }
            GatewayError::Policy(msg) => Rejection::forbidden("policy_violation", msg.clone()),
        }
    }
}

impl From<crate::protect::quota::QuotaViolation> for GatewayError {
    fn from(violation: crate::protect::quota::QuotaViolation) -> Self {
        GatewayError::Quota(violation.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_maps_to_expected_status() {
        assert_eq!(
            StatusCategory::RateLimited.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            StatusCategory::PayloadTooLarge.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            StatusCategory::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn rejection_body_is_structured() {
        let r = Rejection::bad_request("sql_injection", "injection signature matched");
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"status_category\":\"bad_request\""));
        assert!(json.contains("\"error_code\":\"sql_injection\""));
    }

    #[test]
    fn quota_violations_map_to_forbidden_rejections() {
        let violation = crate::protect::quota::QuotaViolation::Exceeded {
            resource: "limits.cpu".to_string(),
            requested: "8".to_string(),
            limit: "4".to_string(),
        };
        let err: GatewayError = violation.into();
        let rejection = err.to_rejection();
        assert_eq!(rejection.status_category, StatusCategory::Forbidden);
        assert_eq!(rejection.error_code, "quota_exceeded");
    }

    #[test]
    fn rate_limited_carries_limit_and_remaining() {
        let r = Rejection::rate_limited(10, 0);
        assert_eq!(r.limit, Some(10));
        assert_eq!(r.remaining, Some(0));
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"limit\":10"));
    }
}
