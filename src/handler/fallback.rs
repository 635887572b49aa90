//! Catch-all responses
//!
//! Used when no route matched, or when a handler failed or panicked.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use super::endpoints::Endpoint;
use super::types::{timestamp, InternalErrorResponse, NotFoundResponse};
use crate::http::build_fallback_json;

/// 404 envelope listing the available endpoints
pub fn not_found(path: &str) -> Response<Full<Bytes>> {
    build_fallback_json(
        StatusCode::NOT_FOUND,
        &NotFoundResponse {
            message: "Endpoint not found",
            path,
            timestamp: timestamp(),
            available_endpoints: Endpoint::ALL.into_iter().map(Endpoint::description).collect(),
        },
    )
}

/// Generic 500 envelope; never carries fault details
pub fn internal_error() -> Response<Full<Bytes>> {
    build_fallback_json(
        StatusCode::INTERNAL_SERVER_ERROR,
        &InternalErrorResponse {
            message: "Internal server error",
            timestamp: timestamp(),
        },
    )
}
