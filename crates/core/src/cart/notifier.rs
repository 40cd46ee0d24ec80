//! Change notifications for the cart.
//!
//! A [`Notifier`] holds any number of listeners and calls each of them once
//! per [`Notifier::notify`]. Notifications carry no payload: a listener
//! re-reads whatever state it displays.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Handle returned by [`Notifier::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn() + Send + Sync>;

/// A set of invalidation listeners.
#[derive(Default)]
pub struct Notifier {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(ListenerId, Listener)>>,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.len())
            .finish_non_exhaustive()
    }
}

impl Notifier {
    /// Create a notifier with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It is called on every later notification until
    /// it is unsubscribed.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners
            .read()
            .map_or_else(|poisoned| poisoned.into_inner().len(), |l| l.len())
    }

    /// True when nobody is listening.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call every listener registered at the moment of the call, once each.
    ///
    /// Listeners run outside the registry lock, so they may subscribe or
    /// unsubscribe (themselves or others) without affecting this round.
    pub fn notify(&self) {
        let snapshot: Vec<Listener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in snapshot {
            listener();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&count);
        (count, move || {
            handle.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_every_listener_called_once_per_notify() {
        let notifier = Notifier::new();
        let (a, listener_a) = counter();
        let (b, listener_b) = counter();
        notifier.subscribe(listener_a);
        notifier.subscribe(listener_b);

        notifier.notify();
        notifier.notify();

        assert_eq!(a.load(Ordering::SeqCst), 2);
        assert_eq!(b.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_leaves_others_untouched() {
        let notifier = Notifier::new();
        let (a, listener_a) = counter();
        let (b, listener_b) = counter();
        let id_a = notifier.subscribe(listener_a);
        notifier.subscribe(listener_b);

        assert!(notifier.unsubscribe(id_a));
        assert!(!notifier.unsubscribe(id_a));
        notifier.notify();

        assert_eq!(a.load(Ordering::SeqCst), 0);
        assert_eq!(b.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.len(), 1);
    }

    #[test]
    fn test_listener_may_unsubscribe_during_dispatch() {
        let notifier = Arc::new(Notifier::new());
        let own_id: Arc<Mutex<Option<ListenerId>>> = Arc::new(Mutex::new(None));
        let (first, listener_first) = counter();
        let (last, listener_last) = counter();

        notifier.subscribe(listener_first);
        let weak = Arc::downgrade(&notifier);
        let slot = Arc::clone(&own_id);
        let id = notifier.subscribe(move || {
            let id = slot.lock().ok().and_then(|guard| *guard);
            if let (Some(notifier), Some(id)) = (weak.upgrade(), id) {
                notifier.unsubscribe(id);
            }
        });
        if let Ok(mut guard) = own_id.lock() {
            *guard = Some(id);
        }
        notifier.subscribe(listener_last);

        notifier.notify();
        notifier.notify();

        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(last.load(Ordering::SeqCst), 2);
        assert_eq!(notifier.len(), 2);
    }

    #[test]
    fn test_listener_subscribed_during_dispatch_waits_for_next_round() {
        let notifier = Arc::new(Notifier::new());
        let late = Arc::new(AtomicUsize::new(0));
        let weak = Arc::downgrade(&notifier);
        let late_handle = Arc::clone(&late);
        let added = Arc::new(AtomicUsize::new(0));
        let added_handle = Arc::clone(&added);

        notifier.subscribe(move || {
            if added_handle.fetch_add(1, Ordering::SeqCst) == 0
                && let Some(notifier) = weak.upgrade()
            {
                let late = Arc::clone(&late_handle);
                notifier.subscribe(move || {
                    late.fetch_add(1, Ordering::SeqCst);
                });
            }
        });

        notifier.notify();
        assert_eq!(late.load(Ordering::SeqCst), 0);

        notifier.notify();
        assert_eq!(late.load(Ordering::SeqCst), 1);
    }
}
