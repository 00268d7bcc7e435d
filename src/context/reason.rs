//! Why a request context fired.

use std::fmt;

/// The reason a [`Context`](super::Context) was cancelled.
///
/// The `Display` form is what ends up in the response body of a cancelled
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    /// The caller abandoned the request, or the server is shutting down.
    Canceled,
    /// The request deadline elapsed before the work finished.
    DeadlineExceeded,
}

impl CancelReason {
    /// Short label used for metrics and log fields.
    pub const fn as_label(self) -> &'static str {
        match self {
            Self::Canceled => "canceled",
            Self::DeadlineExceeded => "deadline_exceeded",
        }
    }
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Canceled => write!(f, "context canceled"),
            Self::DeadlineExceeded => write!(f, "context deadline exceeded"),
        }
    }
}

impl std::error::Error for CancelReason {}
