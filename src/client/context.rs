//! Caller-driven cancellation and deadlines for a single search call.

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

use super::TransportError;

/// Cancellation scope passed into [`Client::search`](super::Client::search).
///
/// A context never times out on its own. It ends only when its
/// [`CancelHandle`] fires or when a deadline set with
/// [`Context::with_timeout`] / [`Context::with_deadline`] passes.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancel: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

/// Cancels every clone of the [`Context`] it was created with.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_canceled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Context {
    /// A context that is never canceled
    pub fn background() -> Self {
        Self::default()
    }

    /// A context plus the handle that cancels it
    pub fn with_cancel() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let ctx = Self {
            cancel: Some(rx),
            deadline: None,
        };
        (ctx, CancelHandle { tx })
    }

    /// Bound this context to `timeout` from now. An earlier existing deadline is kept.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Why this context has ended, if it has
    pub fn err(&self) -> Option<TransportError> {
        if self.cancel.as_ref().is_some_and(|rx| *rx.borrow()) {
            return Some(TransportError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(TransportError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context ends. Pending forever for a background context.
    pub async fn done(&self) -> TransportError {
        let canceled = async {
            if let Some(rx) = &self.cancel {
                let mut rx = rx.clone();
                // Err means the handle was dropped without canceling
                if rx.wait_for(|canceled| *canceled).await.is_ok() {
                    return TransportError::Canceled;
                }
            }
            std::future::pending::<TransportError>().await
        };

        match self.deadline {
            Some(deadline) => tokio::select! {
                err = canceled => err,
                _ = tokio::time::sleep_until(deadline) => TransportError::DeadlineExceeded,
            },
            None => canceled.await,
        }
    }

    /// Drive `fut` until it completes or the context ends, whichever is first.
    ///
    /// A context that has already ended fails without polling `fut`. On
    /// cancellation `fut` is dropped, releasing anything it holds.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, TransportError>
    where
        F: Future<Output = Result<T, TransportError>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }

        tokio::select! {
            biased;
            err = self.done() => Err(err),
            res = fut => res,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_background_never_ends() {
        let ctx = Context::background();
        assert!(ctx.err().is_none());

        let res = ctx.run(async { Ok::<_, TransportError>(7) }).await;
        assert_eq!(res.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_cancel_before_run() {
        let (ctx, handle) = Context::with_cancel();
        handle.cancel();
        assert!(handle.is_canceled());
        assert!(matches!(ctx.err(), Some(TransportError::Canceled)));

        let res = ctx.run(async { Ok::<_, TransportError>(()) }).await;
        assert!(matches!(res, Err(TransportError::Canceled)));
    }

    #[tokio::test]
    async fn test_cancel_during_run() {
        let (ctx, handle) = Context::with_cancel();

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel();
        });

        let res = ctx
            .run(std::future::pending::<Result<(), TransportError>>())
            .await;
        assert!(matches!(res, Err(TransportError::Canceled)));
        canceller.await.unwrap();
    }

    #[tokio::test]
    async fn test_clones_share_cancellation() {
        let (ctx, handle) = Context::with_cancel();
        let clone = ctx.clone();
        handle.cancel();
        assert!(matches!(clone.err(), Some(TransportError::Canceled)));
    }

    #[tokio::test]
    async fn test_dropped_handle_does_not_cancel() {
        let (ctx, handle) = Context::with_cancel();
        drop(handle);
        assert!(ctx.err().is_none());

        let res = ctx.run(async { Ok::<_, TransportError>("done") }).await;
        assert_eq!(res.unwrap(), "done");
    }

    #[tokio::test]
    async fn test_deadline_exceeded() {
        let ctx = Context::background().with_timeout(Duration::from_millis(20));
        let res = ctx
            .run(std::future::pending::<Result<(), TransportError>>())
            .await;
        assert!(matches!(res, Err(TransportError::DeadlineExceeded)));
        assert!(matches!(ctx.err(), Some(TransportError::DeadlineExceeded)));
    }

    #[test]
    fn test_earlier_deadline_wins() {
        let now = Instant::now();
        let ctx = Context::background()
            .with_deadline(now + Duration::from_secs(1))
            .with_deadline(now + Duration::from_secs(10));
        assert_eq!(ctx.deadline(), Some(now + Duration::from_secs(1)));
    }
}
