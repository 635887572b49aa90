//! Endpoint table and handlers
//!
//! Handlers are synchronous functions of the request headers and shared state.
//! None of them enforce authentication: `/api/*` is protected by the proxy in
//! front of the service, not here.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::AUTHORIZATION;
use hyper::{HeaderMap, Method, Response, StatusCode};

use super::types::{
    timestamp, AuthInfoResponse, DecodedUser, HealthStatus, RootStatus, WelcomeError,
    WelcomeResponse, WelcomeUser,
};
use crate::config::AppState;
use crate::http::{json_response, ResponseError};
use crate::identity::{self, ClientPrincipal};
use crate::logger;

pub type HandlerResult = Result<Response<Full<Bytes>>, ResponseError>;

/// Marker returned by auth-info when the principal header cannot be decoded
const DECODE_FAILURE_MARKER: &str = "Failed to decode user info";

/// Routes served by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Root,
    Health,
    Welcome,
    AuthInfo,
}

impl Endpoint {
    pub const ALL: [Self; 4] = [Self::Root, Self::Health, Self::Welcome, Self::AuthInfo];

    pub const fn path(self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::Health => "/health",
            Self::Welcome => "/api/welcome",
            Self::AuthInfo => "/api/auth-info",
        }
    }

    const fn summary(self) -> &'static str {
        match self {
            Self::Root => "Health check",
            Self::Health => "Health status",
            Self::Welcome => "Main API endpoint (Easy Auth protected)",
            Self::AuthInfo => "Authentication headers info (Easy Auth protected)",
        }
    }

    /// Human-readable listing, e.g. `GET /health - Health status`
    pub fn description(self) -> String {
        format!("GET {} - {}", self.path(), self.summary())
    }

    /// Match a request against the table.
    ///
    /// Only GET and HEAD are routed. Matching ignores ASCII case and a
    /// trailing slash.
    pub fn resolve(method: &Method, path: &str) -> Option<Self> {
        if !matches!(*method, Method::GET | Method::HEAD) {
            return None;
        }
        let normalized = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        Self::ALL
            .into_iter()
            .find(|endpoint| endpoint.path().eq_ignore_ascii_case(normalized))
    }

    pub fn handle(self, headers: &HeaderMap, state: &AppState) -> HandlerResult {
        match self {
            Self::Root => root_status(headers),
            Self::Health => health_status(state),
            Self::Welcome => welcome(headers),
            Self::AuthInfo => auth_info(headers),
        }
    }
}

/// `GET /` - liveness plus whether a principal header is present
fn root_status(headers: &HeaderMap) -> HandlerResult {
    json_response(
        StatusCode::OK,
        &RootStatus {
            message: "API is running with App Service Easy Auth",
            timestamp: timestamp(),
            authenticated: identity::has_client_principal(headers),
            status: "healthy",
            version: env!("CARGO_PKG_VERSION"),
            authentication: "App Service Easy Auth with Bearer token support",
        },
    )
}

/// `GET /health`
fn health_status(state: &AppState) -> HandlerResult {
    json_response(
        StatusCode::OK,
        &HealthStatus {
            status: "healthy",
            timestamp: timestamp(),
            uptime: state.uptime_secs(),
            environment: state.config.app.environment.clone(),
        },
    )
}

/// `GET /api/welcome` - echo selected principal fields.
///
/// A malformed principal yields a 500 envelope carrying the decode error.
fn welcome(headers: &HeaderMap) -> HandlerResult {
    let authenticated = identity::has_client_principal(headers);

    match ClientPrincipal::from_headers(headers) {
        Ok(principal) => json_response(
            StatusCode::OK,
            &WelcomeResponse {
                message: "🎉 API CALL SUCCESSFUL WITH EASY AUTH!",
                timestamp: timestamp(),
                authenticated,
                user: principal.as_ref().map(WelcomeUser::from),
            },
        ),
        Err(e) => {
            logger::log_warning(&format!("Rejected client principal on /api/welcome: {e}"));
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &WelcomeError {
                    message: "Error processing authenticated request",
                    timestamp: timestamp(),
                    authenticated,
                    error: e.to_string(),
                },
            )
        }
    }
}

/// `GET /api/auth-info` - dump platform headers and the decoded principal
fn auth_info(headers: &HeaderMap) -> HandlerResult {
    let decoded_user = match ClientPrincipal::from_headers(headers) {
        Ok(principal) => principal.map(DecodedUser::Principal),
        Err(e) => {
            logger::log_warning(&format!("Rejected client principal on /api/auth-info: {e}"));
            Some(DecodedUser::Invalid {
                error: DECODE_FAILURE_MARKER,
            })
        }
    };

    json_response(
        StatusCode::OK,
        &AuthInfoResponse {
            message: "Authentication information from App Service Easy Auth",
            timestamp: timestamp(),
            auth_headers: identity::platform_headers(headers),
            decoded_user,
            has_bearer: headers.get(AUTHORIZATION).is_some_and(|v| !v.is_empty()),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_paths() {
        assert_eq!(Endpoint::resolve(&Method::GET, "/"), Some(Endpoint::Root));
        assert_eq!(Endpoint::resolve(&Method::GET, "/health"), Some(Endpoint::Health));
        assert_eq!(
            Endpoint::resolve(&Method::HEAD, "/api/welcome"),
            Some(Endpoint::Welcome)
        );
        assert_eq!(
            Endpoint::resolve(&Method::GET, "/api/auth-info"),
            Some(Endpoint::AuthInfo)
        );
    }

    #[test]
    fn test_resolve_is_lenient_about_case_and_trailing_slash() {
        assert_eq!(Endpoint::resolve(&Method::GET, "/health/"), Some(Endpoint::Health));
        assert_eq!(
            Endpoint::resolve(&Method::GET, "/API/Welcome"),
            Some(Endpoint::Welcome)
        );
        assert_eq!(Endpoint::resolve(&Method::GET, "//"), Some(Endpoint::Root));
    }

    #[test]
    fn test_resolve_rejects_other_methods_and_paths() {
        assert_eq!(Endpoint::resolve(&Method::POST, "/"), None);
        assert_eq!(Endpoint::resolve(&Method::DELETE, "/health"), None);
        assert_eq!(Endpoint::resolve(&Method::GET, "/nope"), None);
        assert_eq!(Endpoint::resolve(&Method::GET, "/api"), None);
        assert_eq!(Endpoint::resolve(&Method::GET, "/health/extra"), None);
    }

    #[test]
    fn test_descriptions() {
        let listed: Vec<String> = Endpoint::ALL.into_iter().map(Endpoint::description).collect();
        assert_eq!(
            listed,
            vec![
                "GET / - Health check",
                "GET /health - Health status",
                "GET /api/welcome - Main API endpoint (Easy Auth protected)",
                "GET /api/auth-info - Authentication headers info (Easy Auth protected)",
            ]
        );
    }
}
