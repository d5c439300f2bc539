// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP error code mapping to stable backend failure reasons.
//!
//! Backend APIs report failures with very different bodies, but their HTTP status
//! codes mean roughly the same thing everywhere. This module maps status codes to a
//! small set of reason codes so errors and metrics stay comparable across providers.
//!
//! # Usage
//!
//! ```rust
//! use dns01_providers::http_errors::map_http_error_to_reason;
//!
//! let (reason, message) = map_http_error_to_reason(401);
//! assert_eq!(reason, "BackendAuthFailed");
//!
//! let (reason, message) = map_http_error_to_reason(429);
//! assert_eq!(reason, "BackendRateLimited");
//! ```

/// The request was malformed or rejected by validation (400, 409, 422)
pub const REASON_BACKEND_BAD_REQUEST: &str = "BackendBadRequest";

/// Credentials were rejected or lack permission (401, 403)
pub const REASON_BACKEND_AUTH_FAILED: &str = "BackendAuthFailed";

/// The zone, domain or record does not exist (404)
pub const REASON_BACKEND_NOT_FOUND: &str = "BackendNotFound";

/// The backend is throttling requests (429)
pub const REASON_BACKEND_RATE_LIMITED: &str = "BackendRateLimited";

/// The backend failed internally (500, 501)
pub const REASON_BACKEND_INTERNAL_ERROR: &str = "BackendInternalError";

/// A gateway in front of the backend failed (502, 503, 504)
pub const REASON_GATEWAY_ERROR: &str = "GatewayError";

/// No HTTP response was received, or the status is not otherwise classified
pub const REASON_BACKEND_UNREACHABLE: &str = "BackendUnreachable";

/// Map HTTP status code to a reason code and message.
///
/// # HTTP Code Mapping
///
/// | HTTP Code | Reason | Meaning |
/// |-----------|--------|---------|
/// | 400, 409, 422 | `BackendBadRequest` | Request rejected |
/// | 401, 403 | `BackendAuthFailed` | Credentials rejected |
/// | 404 | `BackendNotFound` | Resource not found |
/// | 429 | `BackendRateLimited` | Too many requests |
/// | 500, 501 | `BackendInternalError` | Server error |
/// | 502, 503, 504 | `GatewayError` | Gateway failure |
/// | Other | `BackendUnreachable` | Unexpected status |
#[must_use]
pub fn map_http_error_to_reason(status_code: u16) -> (&'static str, String) {
    match status_code {
        400 => (
            REASON_BACKEND_BAD_REQUEST,
            "Invalid request to backend API (400)".into(),
        ),
        409 => (
            REASON_BACKEND_BAD_REQUEST,
            "Backend API reported a conflict (409)".into(),
        ),
        422 => (
            REASON_BACKEND_BAD_REQUEST,
            "Backend API rejected the record data (422)".into(),
        ),
        401 => (
            REASON_BACKEND_AUTH_FAILED,
            "Backend authentication required (401)".into(),
        ),
        403 => (
            REASON_BACKEND_AUTH_FAILED,
            "Backend authorization failed (403)".into(),
        ),
        404 => (
            REASON_BACKEND_NOT_FOUND,
            "Zone or record not found on backend (404)".into(),
        ),
        429 => (
            REASON_BACKEND_RATE_LIMITED,
            "Backend API rate limit exceeded (429)".into(),
        ),
        500 => (
            REASON_BACKEND_INTERNAL_ERROR,
            "Backend API internal error (500)".into(),
        ),
        501 => (
            REASON_BACKEND_INTERNAL_ERROR,
            "Operation not supported by backend (501)".into(),
        ),
        502 => (
            REASON_GATEWAY_ERROR,
            "Bad gateway reaching backend (502)".into(),
        ),
        503 => (
            REASON_GATEWAY_ERROR,
            "Backend service unavailable (503)".into(),
        ),
        504 => (
            REASON_GATEWAY_ERROR,
            "Gateway timeout reaching backend (504)".into(),
        ),
        _ => (
            REASON_BACKEND_UNREACHABLE,
            format!("Unexpected HTTP status from backend ({status_code})"),
        ),
    }
}

/// Map a connection failure to a reason code and message.
///
/// Use this when the HTTP client could not reach the backend at all, before
/// receiving any HTTP status code.
#[must_use]
pub fn map_connection_error() -> (&'static str, String) {
    (
        REASON_BACKEND_UNREACHABLE,
        "Cannot connect to backend API".into(),
    )
}

#[cfg(test)]
#[path = "http_errors_tests.rs"]
mod http_errors_tests;
