//! Cancellation and deadlines for individual API calls.
//!
//! Every service operation takes a [`Context`]. A context is cheap to clone
//! and carries two optional limits: a deadline and a cancellation signal
//! fired through a [`CancelHandle`]. The client races the network round-trip
//! against both and reports which one ended the call.
//!
//! ```
//! use std::time::Duration;
//! use harvest_client::Context;
//!
//! let (ctx, handle) = Context::background()
//!     .with_timeout(Duration::from_secs(10))
//!     .with_cancel();
//! handle.cancel();
//! assert!(ctx.is_cancelled());
//! ```

use std::future::{pending, Future};
use std::time::Duration;

use futures::future::select_all;
use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};

use crate::error::{HarvestError, Result};

/// Per-call limits: an optional deadline and an optional cancel signal.
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    /// Cancel signals of this context and every context it derives from.
    cancel: Vec<watch::Receiver<bool>>,
}

/// Fires the cancel signal of the contexts derived through
/// [`Context::with_cancel`].
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancel every call using the associated context. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Context {
    /// A context with no deadline that can never be cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    /// Tighten the deadline to `timeout` from now. An earlier existing
    /// deadline is kept.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Tighten the deadline to `deadline`. An earlier existing deadline is
    /// kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// Derive a cancellable context.
    ///
    /// The new context ends when the returned handle fires or when any
    /// context it was derived from is cancelled. The handle does not reach
    /// back to `self`.
    pub fn with_cancel(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancel.push(rx);
        (self, CancelHandle { tx })
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.iter().any(|rx| *rx.borrow())
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|at| at <= Instant::now())
    }

    /// Drive `fut` to completion unless the context ends first.
    ///
    /// An already cancelled or expired context fails without polling `fut`.
    pub(crate) async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_cancelled() {
            return Err(HarvestError::Cancelled);
        }
        if self.is_expired() {
            return Err(HarvestError::DeadlineExceeded);
        }

        let signals: Vec<_> = self
            .cancel
            .iter()
            .cloned()
            .map(|mut rx| {
                Box::pin(async move {
                    // A dropped handle can no longer cancel.
                    let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
                    if closed {
                        pending::<()>().await;
                    }
                })
            })
            .collect();
        let cancelled = async move {
            if signals.is_empty() {
                pending::<()>().await;
            } else {
                select_all(signals).await;
            }
        };
        let expired = async {
            match self.deadline {
                Some(at) => sleep_until(at).await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => Err(HarvestError::Cancelled),
            _ = expired => Err(HarvestError::DeadlineExceeded),
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_has_no_limits() {
        let ctx = Context::background();
        assert!(ctx.deadline().is_none());
        assert!(!ctx.is_cancelled());
        assert!(!ctx.is_expired());
    }

    #[tokio::test]
    async fn timeout_only_tightens() {
        let short = Context::background().with_timeout(Duration::from_secs(1));
        let first = short.deadline().unwrap();
        let longer = short.with_timeout(Duration::from_secs(60));
        assert_eq!(longer.deadline(), Some(first));
    }

    #[tokio::test]
    async fn run_passes_through_result() {
        let ctx = Context::background().with_timeout(Duration::from_secs(5));
        let value = ctx.run(async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn run_reports_deadline() {
        let ctx = Context::background().with_timeout(Duration::from_millis(20));
        let result: Result<()> = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(HarvestError::DeadlineExceeded)));
    }

    #[tokio::test]
    async fn run_reports_cancel() {
        let (ctx, handle) = Context::background().with_cancel();
        let task = tokio::spawn(async move {
            ctx.run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
        let result = task.await.unwrap();
        assert!(matches!(result, Err(HarvestError::Cancelled)));
    }

    #[tokio::test]
    async fn cancelled_context_never_polls_future() {
        let (ctx, handle) = Context::background().with_cancel();
        handle.cancel();
        let polled = std::cell::Cell::new(false);
        let result: Result<()> = ctx
            .run(async {
                polled.set(true);
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(HarvestError::Cancelled)));
        assert!(!polled.get());
    }

    #[tokio::test]
    async fn dropped_handle_does_not_cancel() {
        let (ctx, handle) = Context::background().with_cancel();
        drop(handle);
        let value = ctx.run(async { Ok("done") }).await.unwrap();
        assert_eq!(value, "done");
    }

    #[test]
    fn parent_cancel_reaches_derived_context() {
        let (parent, parent_handle) = Context::background().with_cancel();
        let (child, child_handle) = parent.clone().with_cancel();

        child_handle.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());

        let (child, _child_handle) = parent.clone().with_cancel();
        parent_handle.cancel();
        assert!(parent.is_cancelled());
        assert!(child.is_cancelled());
    }

    #[tokio::test]
    async fn parent_cancel_interrupts_derived_run() {
        let (parent, handle) = Context::background().with_cancel();
        let (child, _child_handle) = parent.with_cancel();
        let task = tokio::spawn(async move {
            child
                .run(async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(())
                })
                .await
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
        let result = task.await.unwrap();
        assert!(matches!(result, Err(HarvestError::Cancelled)));
    }
}
