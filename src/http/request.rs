//! Per-request plumbing.
//!
//! # Responsibilities
//! - Generate unique request IDs (UUID v4)
//! - Derive each request's cancellation context from the server root
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The caller may only shorten the request deadline, never extend it

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, HeaderName, HeaderValue, Request},
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::config::TimeoutConfig;
use crate::context::{CancelOnDrop, Context};
use crate::http::server::AppState;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Header a caller sets to bound how long it is willing to wait.
pub const X_REQUEST_TIMEOUT_MS: HeaderName = HeaderName::from_static("x-request-timeout-ms");

/// Generates a fresh UUID v4 for every request that arrives without an ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestUuid;

impl MakeRequestId for RequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Derive the context a request runs under.
///
/// Starts from `root`, applies the configured request deadline and then the
/// caller's `x-request-timeout-ms`, if present. A malformed header is ignored.
pub fn derive_context(root: &Context, timeouts: &TimeoutConfig, headers: &HeaderMap) -> Context {
    let mut ctx = match timeouts.request_timeout() {
        Some(timeout) => root.with_timeout(timeout),
        None => root.child(),
    };

    if let Some(value) = headers.get(&X_REQUEST_TIMEOUT_MS) {
        match value.to_str().ok().and_then(|v| v.trim().parse::<u64>().ok()) {
            Some(ms) => ctx = ctx.with_timeout(Duration::from_millis(ms)),
            None => tracing::warn!(value = ?value, "Ignoring malformed x-request-timeout-ms"),
        }
    }

    ctx
}

/// Extractor handing a handler its request context.
///
/// The context is cancelled when the extractor is dropped, which also covers
/// the server dropping the handler because the client went away.
#[derive(Debug)]
pub struct RequestContext {
    guard: CancelOnDrop,
}

impl RequestContext {
    pub fn context(&self) -> &Context {
        self.guard.context()
    }
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let ctx = derive_context(&state.root, &state.config.timeouts, &parts.headers);
        Ok(Self {
            guard: ctx.cancel_on_drop(),
        })
    }
}
