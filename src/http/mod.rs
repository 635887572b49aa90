//! HTTP protocol layer module
//!
//! Provides cross-origin handling and response builders, decoupled from specific business logic.

pub mod cors;
pub mod response;

// Re-export commonly used types
pub use cors::CorsPolicy;
pub use response::{
    build_fallback_json, build_preflight_response, json_response, strip_body, ResponseError,
};
