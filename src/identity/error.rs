//! Identity header decoding errors.

use thiserror::Error;

/// Errors raised while decoding the client principal header.
///
/// These are recoverable: handlers turn them into response data rather than
/// failing the request.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The header value is not valid base64.
    #[error("client principal is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded bytes are not UTF-8 text.
    #[error("client principal is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The decoded text is not a JSON object.
    #[error("client principal is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
