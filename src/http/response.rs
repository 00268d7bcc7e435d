//! Handler errors and their HTTP mapping.
//!
//! # Design Decisions
//! - Every handler error answers with its `Display` text as a plain body
//! - Cancellation is a 500, the reason text is the body

use axum::{
    extract::rejection::FormRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::context::CancelReason;
use crate::pages::StoreError;

/// Errors a handler can finish with.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The request context fired before the work finished.
    #[error("{0}")]
    Cancelled(CancelReason),

    #[error("invalid page title")]
    InvalidTitle,

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Form(#[from] FormRejection),

    #[error("{0}")]
    Template(#[from] minijinja::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::Form(rejection) => rejection.status(),
            HandlerError::InvalidTitle | HandlerError::Store(StoreError::NotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            HandlerError::Cancelled(_)
            | HandlerError::Store(StoreError::Io(_))
            | HandlerError::Template(_)
            | HandlerError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = %status, error = %self, "Request failed");
        }
        (status, self.to_string()).into_response()
    }
}
