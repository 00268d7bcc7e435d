//! Page store collaborator and the wiki routes built on it.
//!
//! # Data Flow
//! ```text
//! /view/{title}  → validate title → store.load → view template
//!                                  └ missing   → 302 /edit/{title}
//! /edit/{title}  → validate title → store.load (or empty page) → edit template
//! /save/{title}  → validate title → store.save → 302 /view/{title}
//! ```

pub mod handlers;
pub mod store;
pub mod templates;

use axum::{
    routing::{get, post},
    Router,
};

use crate::http::server::AppState;

pub use store::{FilePageStore, MemoryPageStore, Page, PageStore, StoreError};
pub use templates::{PageTemplate, Templates};

/// Routes for viewing, editing and saving pages.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/view/{title}", get(handlers::view))
        .route("/edit/{title}", get(handlers::edit))
        .route("/save/{title}", post(handlers::save))
}
