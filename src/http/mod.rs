//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, request context + deadline)
//!     → hello.rs / headers.rs / pages (handlers)
//!     → response.rs (handler errors → status + text body)
//!     → Send to client
//! ```

pub mod headers;
pub mod hello;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestContext, RequestUuid, X_REQUEST_ID, X_REQUEST_TIMEOUT_MS};
pub use response::HandlerError;
pub use server::{AppState, HttpServer, ServerError};
