//! Header and verb hardening.
//!
//! # Responsibilities
//! - Reject CR/LF bytes in header names or values (response splitting)
//! - Enforce a header-count ceiling before anything else allocates
//! - Block verbs that are never legitimate (TRACE, CONNECT)
//! - Strip method-override headers so the upstream never sees them
//!
//! # Design Decisions
//! - These checks run earliest in the pipeline: cheapest and most decisive
//! - The wire verb is authoritative; override headers are never honored
//! - CR/LF is checked on raw bytes even though hyper validates values on
//!   parse; the gateway does not assume anything about the listener stack

use axum::http::{HeaderMap, Method};

use crate::error::Rejection;

/// Upper bound on header count; more than this is not a build request.
pub const MAX_HEADER_COUNT: usize = 100;

/// Headers that attempt to rewrite the verb after routing. Ignored for
/// authorization and removed before forwarding.
pub const OVERRIDE_HEADERS: &[&str] = &[
    "x-http-method-override",
    "x-http-method",
    "x-method-override",
];

/// True when a single name/value pair is free of CR/LF bytes.
pub fn pair_is_clean(name: &str, value: &[u8]) -> bool {
    !name.bytes().any(|b| b == b'\r' || b == b'\n')
        && !value.iter().any(|&b| b == b'\r' || b == b'\n')
}

/// Reject header sets containing CR/LF bytes or too many entries.
pub fn validate_headers(headers: &HeaderMap) -> Result<(), Rejection> {
    if headers.len() > MAX_HEADER_COUNT {
        return Err(Rejection::bad_request(
            "too_many_headers",
            "Header count exceeds limit",
        ));
    }
    for (name, value) in headers.iter() {
        if !pair_is_clean(name.as_str(), value.as_bytes()) {
            return Err(Rejection::bad_request(
                "header_crlf",
                "Header contains CR/LF bytes",
            ));
        }
    }
    Ok(())
}

/// Block TRACE and CONNECT unconditionally, before authentication.
pub fn check_verb(method: &Method) -> Result<(), Rejection> {
    if *method == Method::TRACE || *method == Method::CONNECT {
        return Err(Rejection::method_not_allowed(format!(
            "{method} is not accepted"
        )));
    }
    Ok(())
}

/// Remove method-override headers in place.
pub fn strip_override_headers(headers: &mut HeaderMap) {
    for name in OVERRIDE_HEADERS {
        while headers.remove(*name).is_some() {}
    }
}
