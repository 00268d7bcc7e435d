//! The cancellable `/hello` handler.
//!
//! # State Machine
//! ```text
//! Started ──work timer elapsed──▶ Completed   (200 "hello\n")
//!    │
//!    └──context fired───────────▶ Cancelled   (500 reason text)
//! ```
//!
//! Both terminal states are final. A request dropped by the server before
//! either transition is logged as abandoned.

use std::time::{Duration, Instant};

use axum::extract::State;
use futures_util::future::Either;

use crate::context::{race, CancelReason, Context};
use crate::http::request::RequestContext;
use crate::http::response::HandlerError;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Body returned when the simulated work completes.
pub const HELLO_BODY: &str = "hello\n";

/// How a unit of simulated work ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Cancelled(CancelReason),
}

/// Wait `work` unless `ctx` fires first.
///
/// The work timer is dropped on both paths.
pub async fn simulate_work(ctx: &Context, work: Duration) -> Outcome {
    match race(tokio::time::sleep(work), ctx.done()).await {
        Either::Left(()) => Outcome::Completed,
        Either::Right(()) => Outcome::Cancelled(ctx.err().unwrap_or(CancelReason::Canceled)),
    }
}

/// Handler lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    Started,
    Completed,
    Cancelled,
}

impl HandlerState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, HandlerState::Started)
    }
}

/// Logs a handler's start on creation and its end on drop.
///
/// The end line is written exactly once, whichever way the handler exits.
#[derive(Debug)]
pub struct HandlerTrace {
    handler: &'static str,
    state: HandlerState,
    started: Instant,
}

impl HandlerTrace {
    pub fn start(handler: &'static str) -> Self {
        tracing::info!(handler, "Handler started");
        Self {
            handler,
            state: HandlerState::Started,
            started: Instant::now(),
        }
    }

    /// Move to a terminal state. Returns `false` if one was already reached.
    pub fn finish(&mut self, terminal: HandlerState) -> bool {
        if self.state.is_terminal() || !terminal.is_terminal() {
            return false;
        }
        self.state = terminal;
        true
    }

    pub fn state(&self) -> HandlerState {
        self.state
    }
}

impl Drop for HandlerTrace {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        if self.state.is_terminal() {
            tracing::info!(handler = self.handler, state = ?self.state, elapsed_ms, "Handler ended");
        } else {
            tracing::warn!(handler = self.handler, elapsed_ms, "Handler ended before finishing (abandoned)");
        }
    }
}

/// `GET /hello`
pub async fn hello(
    State(state): State<AppState>,
    request: RequestContext,
) -> Result<&'static str, HandlerError> {
    let mut trace = HandlerTrace::start("hello");

    match simulate_work(request.context(), state.config.hello.work()).await {
        Outcome::Completed => {
            trace.finish(HandlerState::Completed);
            metrics::record_hello_outcome("completed");
            Ok(HELLO_BODY)
        }
        Outcome::Cancelled(reason) => {
            tracing::info!(reason = %reason, "Hello handler cancelled");
            trace.finish(HandlerState::Cancelled);
            metrics::record_hello_outcome(reason.as_label());
            Err(HandlerError::Cancelled(reason))
        }
    }
}
