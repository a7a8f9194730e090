//! Deferred - manually resolvable completion signal

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use futures::future::{self, BoxFuture, FutureExt, Shared};
use tokio::sync::oneshot;

/// Single-resolution signal
///
/// Clones share the same state. Resolving more than once has no effect. If
/// every clone is dropped without resolving, observers stay pending forever.
#[derive(Clone)]
pub struct Deferred {
    sender: Arc<Mutex<Option<oneshot::Sender<()>>>>,
    promise: DeferredPromise,
}

impl Deferred {
    pub fn new() -> Self {
        let (tx, rx) = oneshot::channel::<()>();
        let inner = async move {
            if rx.await.is_err() {
                future::pending::<()>().await;
            }
        }
        .boxed()
        .shared();

        Self {
            sender: Arc::new(Mutex::new(Some(tx))),
            promise: DeferredPromise { inner },
        }
    }

    /// Resolve the signal; returns `false` if it was already resolved
    pub fn resolve(&self) -> bool {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match sender {
            Some(tx) => {
                let _ = tx.send(());
                true
            }
            None => false,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Observer handle; every clone completes when the signal resolves
    pub fn promise(&self) -> DeferredPromise {
        self.promise.clone()
    }
}

impl Default for Deferred {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Deferred {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred")
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// Future side of a `Deferred`
#[derive(Clone)]
pub struct DeferredPromise {
    inner: Shared<BoxFuture<'static, ()>>,
}

impl Future for DeferredPromise {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.inner.poll_unpin(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_resolve_completes_all_observers() {
        let deferred = Deferred::new();
        let first = deferred.promise();
        let second = deferred.promise();

        assert!(deferred.resolve());
        first.await;
        second.await;
        assert!(deferred.is_resolved());
    }

    #[tokio::test]
    async fn test_resolve_is_single_shot() {
        let deferred = Deferred::new();
        assert!(deferred.resolve());
        assert!(!deferred.resolve());
        assert!(!deferred.clone().resolve());
    }

    #[tokio::test]
    async fn test_unresolved_stays_pending() {
        let deferred = Deferred::new();
        let result = timeout(Duration::from_millis(30), deferred.promise()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_dropped_without_resolve_never_completes() {
        let deferred = Deferred::new();
        let promise = deferred.promise();
        drop(deferred);
        let result = timeout(Duration::from_millis(30), promise).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_observer_attached_after_resolve() {
        let deferred = Deferred::new();
        deferred.resolve();
        timeout(Duration::from_millis(30), deferred.promise())
            .await
            .expect("late observer should complete");
    }
}
