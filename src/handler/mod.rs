//! Request handler module
//!
//! Responsible for the request pipeline, the endpoint table and the
//! fallback responses.

pub mod endpoints;
pub mod fallback;
pub mod router;
pub mod types;

// Re-export main entry point
pub use endpoints::Endpoint;
pub use router::handle_request;
