//! Owned, self-cancelling subscriptions.

use std::fmt;
use tokio::sync::mpsc;

type UnsubscribeHook = Box<dyn FnOnce() + Send>;

/// Receiving end of a chain subscription.
///
/// The unsubscribe hook runs at most once: on the first call to
/// [`unsubscribe`](Self::unsubscribe) or on drop, whichever comes first.
/// Later calls are no-ops.
pub struct Subscription<T> {
    receiver: mpsc::Receiver<T>,
    unsubscribe: Option<UnsubscribeHook>,
}

impl<T> Subscription<T> {
    /// Wrap a receiver with the hook that tears down the producer side.
    pub fn new(receiver: mpsc::Receiver<T>, unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            receiver,
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Create a bounded channel and the subscription reading from it.
    pub fn channel(
        capacity: usize,
        unsubscribe: impl FnOnce() + Send + 'static,
    ) -> (mpsc::Sender<T>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(rx, unsubscribe))
    }

    /// Receive the next item.
    ///
    /// Returns `None` once the producer is gone, or once unsubscribed and
    /// any already-buffered items are drained.
    pub async fn next(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Tear down the subscription. Returns `true` if this call did it.
    pub fn unsubscribe(&mut self) -> bool {
        match self.unsubscribe.take() {
            Some(hook) => {
                self.receiver.close();
                hook();
                true
            }
            None => false,
        }
    }

    /// Whether the subscription has not been torn down yet.
    pub fn is_active(&self) -> bool {
        self.unsubscribe.is_some()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counted() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let hook_count = count.clone();
        (count, move || {
            hook_count.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test]
    async fn test_unsubscribe_runs_hook_once() {
        let (count, hook) = counted();
        let (_tx, mut sub) = Subscription::<u32>::channel(4, hook);

        assert!(sub.is_active());
        assert!(sub.unsubscribe());
        assert!(!sub.unsubscribe());
        drop(sub);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let (count, hook) = counted();
        let (_tx, sub) = Subscription::<u32>::channel(4, hook);
        drop(sub);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_buffered_items_drain_after_unsubscribe() {
        let (_count, hook) = counted();
        let (tx, mut sub) = Subscription::channel(4, hook);
        tx.send(1u32).await.unwrap();

        sub.unsubscribe();
        assert!(tx.send(2).await.is_err());
        assert_eq!(sub.next().await, Some(1));
        assert_eq!(sub.next().await, None);
    }
}
