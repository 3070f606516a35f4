use std::sync::{PoisonError, RwLock, Weak};

/// Subscribers held by weak reference. A subscriber that has been dropped is simply
/// skipped; expired entries are pruned whenever a new subscriber registers.
pub struct DestroyedCallbackRegistry<T: ?Sized + 'static> {
    callbacks: RwLock<Vec<Weak<dyn Fn(&T) + Send + Sync>>>,
}

impl<T: ?Sized + 'static> Default for DestroyedCallbackRegistry<T> {
    fn default() -> Self {
        Self {
            callbacks: RwLock::new(Vec::new()),
        }
    }
}

impl<T: ?Sized + 'static> std::fmt::Debug for DestroyedCallbackRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DestroyedCallbackRegistry")
            .field("registered", &self.len())
            .finish()
    }
}

impl<T: ?Sized + 'static> DestroyedCallbackRegistry<T> {
    pub fn register(&self, callback: Weak<dyn Fn(&T) + Send + Sync>) {
        let mut callbacks = self
            .callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        callbacks.retain(|callback| callback.strong_count() > 0);
        callbacks.push(callback);
    }

    /// Number of registered subscribers, including ones that may have expired since.
    pub fn len(&self) -> usize {
        self.callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calls every live subscriber with `value` and empties the registry, so each
    /// subscriber hears about it at most once.
    pub fn notify_all(&self, value: &T) {
        let callbacks = std::mem::take(
            &mut *self
                .callbacks
                .write()
                .unwrap_or_else(PoisonError::into_inner),
        );

        for callback in callbacks.iter().filter_map(Weak::upgrade) {
            callback(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    type Callback = dyn Fn(&u32) + Send + Sync;

    #[test]
    fn live_subscribers_are_notified_once() {
        let registry = DestroyedCallbackRegistry::<u32>::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let callback: Arc<Callback> = Arc::new(move |value: &u32| {
            assert_eq!(*value, 9);
            counter.fetch_add(1, Ordering::SeqCst);
        });
        registry.register(Arc::downgrade(&callback));

        registry.notify_all(&9);
        registry.notify_all(&9);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn expired_subscribers_are_skipped_and_pruned() {
        let registry = DestroyedCallbackRegistry::<u32>::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let dropped: Arc<Callback> = Arc::new(move |_: &u32| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        registry.register(Arc::downgrade(&dropped));
        drop(dropped);

        let kept: Arc<Callback> = Arc::new(|_: &u32| {});
        registry.register(Arc::downgrade(&kept));
        assert_eq!(registry.len(), 1);

        registry.notify_all(&1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
