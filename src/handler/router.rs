//! Request pipeline module
//!
//! Entry point for HTTP request processing. Stages run in order:
//! 1. CORS preflight: `OPTIONS` on any path stops here
//! 2. Route: the matched endpoint runs inside a fault guard
//! 3. Not found: terminal stage, reached only when nothing matched
//!
//! CORS headers are attached to whatever response the stages produce.

use std::any::Any;
use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{HeaderMap, Method, Request, Response};

use super::endpoints::{Endpoint, HandlerResult};
use super::fallback;
use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub headers: &'a HeaderMap,
}

/// Outcome of a pipeline stage
enum Flow {
    Continue,
    Respond(Response<Full<Bytes>>),
}

/// Main entry point for HTTP request handling
///
/// The request body is never read, so any body type is accepted.
pub fn handle_request<B>(
    req: &Request<B>,
    state: &AppState,
    peer_addr: SocketAddr,
) -> Response<Full<Bytes>> {
    let started = Instant::now();
    let logging = &state.config.logging;

    let access_entry = logging.access_log.then(|| {
        AccessLogEntry::from_request(&peer_addr, req.method(), req.uri(), req.version(), req.headers())
    });
    logger::log_headers(req.headers(), logging.show_headers);

    let ctx = RequestContext {
        method: req.method(),
        path: req.uri().path(),
        headers: req.headers(),
    };

    let mut response = run_pipeline(&ctx, state);
    state.cors.apply(ctx.headers, response.headers_mut());

    if *ctx.method == Method::HEAD {
        response = http::strip_body(response);
    }

    if let Some(mut entry) = access_entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &logging.access_log_format);
    }

    response
}

fn run_pipeline(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    if let Flow::Respond(resp) = preflight_stage(ctx) {
        return resp;
    }
    if let Flow::Respond(resp) = route_stage(ctx, state) {
        return resp;
    }
    fallback::not_found(ctx.path)
}

fn preflight_stage(ctx: &RequestContext<'_>) -> Flow {
    if *ctx.method == Method::OPTIONS {
        Flow::Respond(http::build_preflight_response())
    } else {
        Flow::Continue
    }
}

fn route_stage(ctx: &RequestContext<'_>, state: &AppState) -> Flow {
    match Endpoint::resolve(ctx.method, ctx.path) {
        Some(endpoint) => Flow::Respond(guarded(|| endpoint.handle(ctx.headers, state))),
        None => Flow::Continue,
    }
}

/// Run a handler, converting errors and panics into the generic 500 envelope
fn guarded<F>(handler: F) -> Response<Full<Bytes>>
where
    F: FnOnce() -> HandlerResult,
{
    match panic::catch_unwind(AssertUnwindSafe(handler)) {
        Ok(Ok(resp)) => resp,
        Ok(Err(e)) => {
            logger::log_error(&format!("Handler failed: {e}"));
            fallback::internal_error()
        }
        Err(payload) => {
            logger::log_error(&format!("Handler panicked: {}", panic_message(&*payload)));
            fallback::internal_error()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic payload")
}
