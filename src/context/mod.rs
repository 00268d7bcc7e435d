//! Request-scoped cancellation.
//!
//! # Data Flow
//! ```text
//! server root context (cancelled on shutdown)
//!     → per-request child (request deadline from config)
//!     → tightened by the caller's x-request-timeout-ms
//!     → handler waits on done() at its single suspension point
//! ```
//!
//! # Design Decisions
//! - A context fires at most once; the first reason recorded sticks
//! - Children observe their parent firing, never the other way around
//! - Deadlines are checked lazily (no background timer task per request)

pub mod race;
pub mod reason;

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub use race::race;
pub use reason::CancelReason;

/// A cancellation signal with an optional deadline.
///
/// Cloning is cheap and all clones observe the same signal.
#[derive(Debug, Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    token: CancellationToken,
    fired: OnceLock<Fired>,
    deadline: Option<Instant>,
    parent: Option<Context>,
}

/// When and why a context fired.
#[derive(Debug, Clone, Copy)]
struct Fired {
    reason: CancelReason,
    at: Instant,
}

impl Context {
    /// A root context that only fires when cancelled explicitly.
    pub fn background() -> Self {
        Self {
            inner: Arc::new(Inner {
                token: CancellationToken::new(),
                fired: OnceLock::new(),
                deadline: None,
                parent: None,
            }),
        }
    }

    /// Derive a context that fires whenever `self` fires.
    pub fn child(&self) -> Self {
        self.derive(self.inner.deadline)
    }

    /// Derive a context that also fires `timeout` from now.
    ///
    /// A timeout too large to represent as an instant adds no deadline.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.child(),
        }
    }

    /// Derive a context that also fires at `deadline`.
    ///
    /// The earlier of the parent's deadline and `deadline` applies.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let effective = match self.inner.deadline {
            Some(parent) if parent <= deadline => parent,
            _ => deadline,
        };
        self.derive(Some(effective))
    }

    fn derive(&self, deadline: Option<Instant>) -> Self {
        Self {
            inner: Arc::new(Inner {
                token: self.inner.token.child_token(),
                fired: OnceLock::new(),
                deadline,
                parent: Some(self.clone()),
            }),
        }
    }

    /// Fire this context (and its children) with [`CancelReason::Canceled`].
    ///
    /// Has no effect if the context already fired. If the deadline has
    /// already passed the context records [`CancelReason::DeadlineExceeded`].
    pub fn cancel(&self) {
        self.fire(CancelReason::Canceled, Instant::now());
    }

    /// Record that the context fired for `reason` at `at`.
    ///
    /// A deadline at or before `at` came first and wins.
    fn fire(&self, reason: CancelReason, at: Instant) -> Fired {
        let fired = *self.inner.fired.get_or_init(|| match self.inner.deadline {
            Some(deadline) if deadline <= at => Fired {
                reason: CancelReason::DeadlineExceeded,
                at: deadline,
            },
            _ => Fired { reason, at },
        });
        self.inner.token.cancel();
        fired
    }

    fn observe(&self) -> Option<Fired> {
        if let Some(fired) = self.inner.fired.get() {
            return Some(*fired);
        }

        if self.inner.token.is_cancelled() {
            // Fired through an ancestor.
            let inherited = self
                .inner
                .parent
                .as_ref()
                .and_then(Context::observe)
                .unwrap_or(Fired {
                    reason: CancelReason::Canceled,
                    at: Instant::now(),
                });
            return Some(self.fire(inherited.reason, inherited.at));
        }

        match self.inner.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                Some(self.fire(CancelReason::DeadlineExceeded, deadline))
            }
            _ => None,
        }
    }

    /// Why this context fired, or `None` while it is still live.
    pub fn err(&self) -> Option<CancelReason> {
        self.observe().map(|fired| fired.reason)
    }

    /// Whether the context has fired.
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// The effective deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Resolves once the context fires. Cancel safe.
    pub async fn done(&self) {
        match self.inner.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.inner.token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {
                        self.fire(CancelReason::DeadlineExceeded, deadline);
                    }
                }
            }
            None => self.inner.token.cancelled().await,
        }
    }

    /// Guard that cancels this context when dropped.
    pub fn cancel_on_drop(&self) -> CancelOnDrop {
        CancelOnDrop {
            ctx: self.clone(),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

/// Cancels the wrapped context when dropped.
///
/// Tie one of these to a request so that work derived from the request
/// context is told to stop once the request itself is gone.
#[derive(Debug)]
pub struct CancelOnDrop {
    ctx: Context,
}

impl CancelOnDrop {
    /// The guarded context.
    pub fn context(&self) -> &Context {
        &self.ctx
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.ctx.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_is_live_until_cancelled() {
        let ctx = Context::background();
        assert_eq!(ctx.err(), None);
        assert!(ctx.deadline().is_none());

        ctx.cancel();
        assert_eq!(ctx.err(), Some(CancelReason::Canceled));
        assert!(ctx.is_done());
    }

    #[tokio::test(start_paused = true)]
    async fn first_reason_sticks() {
        let ctx = Context::background().with_timeout(Duration::from_secs(1));
        ctx.cancel();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ctx.err(), Some(CancelReason::Canceled));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_fires_with_deadline_exceeded() {
        let ctx = Context::background().with_timeout(Duration::from_secs(2));
        assert_eq!(ctx.err(), None);

        let start = Instant::now();
        ctx.done().await;
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert_eq!(ctx.err(), Some(CancelReason::DeadlineExceeded));

        // Stays fired.
        ctx.cancel();
        assert_eq!(ctx.err(), Some(CancelReason::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_unobserved_deadline_reports_deadline() {
        let ctx = Context::background().with_timeout(Duration::from_secs(1));

        tokio::time::sleep(Duration::from_secs(2)).await;
        ctx.cancel();
        assert_eq!(ctx.err(), Some(CancelReason::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn parent_cancel_after_child_deadline_reports_deadline() {
        let root = Context::background();
        let child = root.with_timeout(Duration::from_secs(1));

        tokio::time::sleep(Duration::from_secs(2)).await;
        root.cancel();
        assert_eq!(root.err(), Some(CancelReason::Canceled));
        assert_eq!(child.err(), Some(CancelReason::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn parent_cancel_before_child_deadline_reports_canceled_when_seen_late() {
        let root = Context::background();
        let child = root.with_timeout(Duration::from_secs(5));

        tokio::time::sleep(Duration::from_secs(1)).await;
        root.cancel();
        // Nobody looks at the child until well after its deadline.
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(child.err(), Some(CancelReason::Canceled));
    }

    #[tokio::test(start_paused = true)]
    async fn huge_timeout_means_no_deadline() {
        let ctx = Context::background().with_timeout(Duration::from_secs(u64::MAX));
        assert!(ctx.deadline().is_none());
        assert!(!ctx.is_done());

        let tight = ctx.with_timeout(Duration::from_secs(1));
        assert!(tight.deadline().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_timeout_is_already_done() {
        let ctx = Context::background().with_timeout(Duration::ZERO);
        assert_eq!(ctx.err(), Some(CancelReason::DeadlineExceeded));
        ctx.done().await;
    }

    #[tokio::test]
    async fn child_inherits_parent_reason() {
        let parent = Context::background();
        let child = parent.child();

        parent.cancel();
        child.done().await;
        assert_eq!(child.err(), Some(CancelReason::Canceled));
    }

    #[test]
    fn cancelling_child_leaves_parent_live() {
        let parent = Context::background();
        let child = parent.child();

        child.cancel();
        assert!(child.is_done());
        assert!(!parent.is_done());
    }

    #[tokio::test(start_paused = true)]
    async fn child_keeps_earlier_parent_deadline() {
        let parent = Context::background().with_timeout(Duration::from_secs(1));
        let child = parent.with_timeout(Duration::from_secs(10));
        assert_eq!(child.deadline(), parent.deadline());

        child.done().await;
        assert_eq!(child.err(), Some(CancelReason::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn grandchild_sees_deadline_of_ancestor() {
        let root = Context::background();
        let mid = root.with_timeout(Duration::from_secs(3));
        let leaf = mid.child();

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(leaf.err(), Some(CancelReason::DeadlineExceeded));
    }

    #[test]
    fn guard_cancels_on_drop() {
        let ctx = Context::background();
        let guard = ctx.cancel_on_drop();
        assert!(!guard.context().is_done());

        drop(guard);
        assert_eq!(ctx.err(), Some(CancelReason::Canceled));
    }
}
