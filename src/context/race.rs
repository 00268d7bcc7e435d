//! Race combinator: run two futures, first one wins.
//!
//! ```text
//! race(a, b):
//!   poll a, poll b, ...
//!   first Ready  → winner
//!   other future → dropped before race returns
//! ```
//!
//! Dropping the loser is what releases its resources (a pending timer, a
//! cancellation waiter). If both are ready on the same poll, `a` wins; callers
//! must not rely on that tie-break.

use std::future::Future;
use std::pin::pin;

use futures_util::future::{self, Either};

/// Run `a` and `b` concurrently and return the output of whichever finishes
/// first. The losing future is dropped without being polled again.
pub async fn race<A, B>(a: A, b: B) -> Either<A::Output, B::Output>
where
    A: Future,
    B: Future,
{
    let a = pin!(a);
    let b = pin!(b);

    match future::select(a, b).await {
        Either::Left((out, _loser)) => Either::Left(out),
        Either::Right((out, _loser)) => Either::Right(out),
    }
}
