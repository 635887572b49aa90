//! Cross-origin policy
//!
//! Echoes allow-listed origins and always advertises the permitted methods
//! and headers, including the identity headers injected by the auth proxy.

use hyper::header::{
    HeaderMap, HeaderValue, InvalidHeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS,
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ORIGIN, VARY,
};

use crate::config::CorsConfig;

/// CORS response headers prepared from configuration
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    origin_patterns: Vec<String>,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    allow_credentials: bool,
}

impl CorsPolicy {
    pub fn from_config(config: &CorsConfig) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            origin_patterns: config
                .allowed_origin_patterns
                .iter()
                .filter(|p| !p.is_empty())
                .cloned()
                .collect(),
            allow_methods: HeaderValue::from_str(&config.allowed_methods.join(", "))?,
            allow_headers: HeaderValue::from_str(&config.allowed_headers.join(", "))?,
            allow_credentials: config.allow_credentials,
        })
    }

    /// The request origin, if it contains one of the allow-listed patterns
    pub fn allowed_origin<'h>(&self, request_headers: &'h HeaderMap) -> Option<&'h HeaderValue> {
        let origin = request_headers.get(ORIGIN)?;
        let origin_str = origin.to_str().ok()?;
        self.origin_patterns
            .iter()
            .any(|pattern| origin_str.contains(pattern.as_str()))
            .then_some(origin)
    }

    /// Write the CORS headers for a request into a response header map
    ///
    /// `Vary: Origin` is sent whenever origins are matched at all, so shared
    /// caches key on it even for responses without an allowed origin.
    pub fn apply(&self, request_headers: &HeaderMap, response_headers: &mut HeaderMap) {
        if !self.origin_patterns.is_empty() {
            response_headers.append(VARY, HeaderValue::from_static("Origin"));
        }
        if let Some(origin) = self.allowed_origin(request_headers) {
            response_headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        }
        response_headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        response_headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
        if self.allow_credentials {
            response_headers.insert(
                ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> CorsPolicy {
        CorsPolicy::from_config(&CorsConfig::default()).unwrap()
    }

    fn request_with_origin(origin: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ORIGIN, HeaderValue::from_str(origin).unwrap());
        headers
    }

    #[test]
    fn test_allowed_origin_is_echoed() {
        let req = request_with_origin("https://webapp-frontend.azurewebsites.net");
        let mut resp = HeaderMap::new();
        policy().apply(&req, &mut resp);

        assert_eq!(
            resp.get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://webapp-frontend.azurewebsites.net"
        );
        assert_eq!(resp.get(VARY).unwrap(), "Origin");
    }

    #[test]
    fn test_foreign_origin_is_omitted() {
        let req = request_with_origin("https://evil.example.com");
        let mut resp = HeaderMap::new();
        policy().apply(&req, &mut resp);

        assert!(resp.get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert_eq!(resp.get(VARY).unwrap(), "Origin");
        // fixed headers are still advertised
        assert!(resp.get(ACCESS_CONTROL_ALLOW_METHODS).is_some());
    }

    #[test]
    fn test_fixed_headers_without_origin() {
        let mut resp = HeaderMap::new();
        policy().apply(&HeaderMap::new(), &mut resp);

        assert!(resp.get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert_eq!(
            resp.get(ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        let allow_headers = resp
            .get(ACCESS_CONTROL_ALLOW_HEADERS)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(allow_headers.contains("Authorization"));
        assert!(allow_headers.contains("X-MS-CLIENT-PRINCIPAL-ID"));
        assert_eq!(resp.get(ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(), "true");
    }

    #[test]
    fn test_credentials_can_be_disabled() {
        let config = CorsConfig {
            allow_credentials: false,
            ..CorsConfig::default()
        };
        let mut resp = HeaderMap::new();
        CorsPolicy::from_config(&config)
            .unwrap()
            .apply(&HeaderMap::new(), &mut resp);

        assert!(resp.get(ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
    }

    #[test]
    fn test_empty_pattern_never_matches() {
        let config = CorsConfig {
            allowed_origin_patterns: vec![String::new()],
            ..CorsConfig::default()
        };
        let policy = CorsPolicy::from_config(&config).unwrap();
        let req = request_with_origin("https://anything.example");

        assert!(policy.allowed_origin(&req).is_none());
    }

    #[test]
    fn test_vary_origin_on_every_response_when_patterns_configured() {
        let mut resp = HeaderMap::new();
        policy().apply(&HeaderMap::new(), &mut resp);
        assert_eq!(resp.get(VARY).unwrap(), "Origin");

        let config = CorsConfig {
            allowed_origin_patterns: vec![],
            ..CorsConfig::default()
        };
        let mut resp = HeaderMap::new();
        CorsPolicy::from_config(&config)
            .unwrap()
            .apply(&request_with_origin("https://a.azurewebsites.net"), &mut resp);
        assert!(resp.get(VARY).is_none());
        assert!(resp.get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[test]
    fn test_invalid_header_config_is_rejected() {
        let config = CorsConfig {
            allowed_methods: vec!["GET\n".to_string()],
            ..CorsConfig::default()
        };
        assert!(CorsPolicy::from_config(&config).is_err());
    }
}
