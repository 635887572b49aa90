// Response envelope types
// One struct per endpoint, serialized with camelCase keys

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::identity::ClientPrincipal;

/// Current time as ISO-8601 UTC with millisecond precision
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Serialize)]
pub struct RootStatus {
    pub message: &'static str,
    pub timestamp: String,
    pub authenticated: bool,
    pub status: &'static str,
    pub version: &'static str,
    pub authentication: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
    /// Seconds since process start
    pub uptime: f64,
    pub environment: String,
}

#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub message: &'static str,
    pub timestamp: String,
    pub authenticated: bool,
    pub user: Option<WelcomeUser>,
}

/// Selected principal fields echoed by the welcome endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeUser {
    pub user_id: Option<Value>,
    pub user_details: Option<Value>,
    pub identity_provider: Option<Value>,
    pub claims: Option<Value>,
}

impl From<&ClientPrincipal> for WelcomeUser {
    fn from(principal: &ClientPrincipal) -> Self {
        Self {
            user_id: principal.user_id().cloned(),
            user_details: principal.user_details().cloned(),
            identity_provider: principal.identity_provider().cloned(),
            claims: principal.claims().cloned(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WelcomeError {
    pub message: &'static str,
    pub timestamp: String,
    pub authenticated: bool,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthInfoResponse {
    pub message: &'static str,
    pub timestamp: String,
    pub auth_headers: BTreeMap<String, String>,
    pub decoded_user: Option<DecodedUser>,
    pub has_bearer: bool,
}

/// Decoded principal, or an inline marker when the header was malformed
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DecodedUser {
    Principal(ClientPrincipal),
    Invalid { error: &'static str },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotFoundResponse<'a> {
    pub message: &'static str,
    pub path: &'a str,
    pub timestamp: String,
    pub available_endpoints: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct InternalErrorResponse {
    pub message: &'static str,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_shape() {
        let ts = timestamp();
        // 2026-10-18T12:34:56.789Z
        assert_eq!(ts.len(), 24);
        assert!(ts.ends_with('Z'));
        assert_eq!(&ts[19..20], ".");
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn test_decoded_user_invalid_marker() {
        let body = serde_json::to_value(DecodedUser::Invalid {
            error: "Failed to decode user info",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"error": "Failed to decode user info"}));
    }
}
