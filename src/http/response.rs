//! HTTP response building module
//!
//! Provides builders for the JSON responses produced by the API, decoupled from specific business logic.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::Serialize;
use thiserror::Error;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Last-resort body when even the error envelope cannot be built
const FALLBACK_ERROR_BODY: &str = r#"{"message":"Internal server error"}"#;

/// Failure while turning a handler result into an HTTP response
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("failed to serialize response body: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to build response: {0}")]
    Build(#[from] hyper::http::Error),
}

/// Build JSON response
pub fn json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
) -> Result<Response<Full<Bytes>>, ResponseError> {
    let json = serde_json::to_vec(body)?;

    Ok(Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .header(CONTENT_LENGTH, json.len())
        .body(Full::new(Bytes::from(json)))?)
}

/// Build JSON response that cannot fail, used by the fallback handlers
pub fn build_fallback_json<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    json_response(status, body).unwrap_or_else(|e| {
        log_build_error(status.as_str(), &e);
        let mut resp = Response::new(Full::new(Bytes::from_static(
            FALLBACK_ERROR_BODY.as_bytes(),
        )));
        *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        resp
    })
}

/// Build OPTIONS response (preflight request)
pub fn build_preflight_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_LENGTH, 0)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &ResponseError::Build(e));
            Response::new(Full::new(Bytes::new()))
        })
}

/// Drop the body of a response to a HEAD request, keeping its headers
pub fn strip_body(resp: Response<Full<Bytes>>) -> Response<Full<Bytes>> {
    let (parts, _) = resp.into_parts();
    Response::from_parts(parts, Full::new(Bytes::new()))
}

/// Log response build error
fn log_build_error(status: &str, error: &ResponseError) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_json_response_headers_and_body() {
        let resp = json_response(StatusCode::CREATED, &serde_json::json!({"ok": true})).unwrap();

        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.headers().get(CONTENT_TYPE).unwrap(), JSON_CONTENT_TYPE);
        assert_eq!(resp.headers().get(CONTENT_LENGTH).unwrap(), "11");

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn test_preflight_is_empty() {
        let resp = build_preflight_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_strip_body_keeps_headers() {
        let resp = json_response(StatusCode::OK, &serde_json::json!({"a": 1})).unwrap();
        let resp = strip_body(resp);

        assert_eq!(resp.headers().get(CONTENT_LENGTH).unwrap(), "7");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }
}
