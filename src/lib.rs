//! Cancellable request server library.

pub mod config;
pub mod context;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pages;

pub use config::schema::ServerConfig;
pub use context::{CancelReason, Context};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
