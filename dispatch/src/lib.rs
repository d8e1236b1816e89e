//! Ordered callback registries for Clipshelf.
//!
//! Two registries are built on this: global keyboard dispatch (first match
//! wins, so a modal's Escape handler can shadow page shortcuts) and backend
//! push-notification fan-out (every subscriber runs).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Identifier returned by [`CallbackRegistry::register`]. Handles come from
/// an ever-increasing counter and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(u64);

/// Result types that can stop a first-match dispatch pass.
pub trait Handled {
    fn is_handled(&self) -> bool;
}

impl Handled for bool {
    fn is_handled(&self) -> bool {
        *self
    }
}

impl<T> Handled for Option<T> {
    fn is_handled(&self) -> bool {
        self.is_some()
    }
}

type Callback<E, R> = Arc<dyn Fn(&E) -> R + Send + Sync>;

struct Inner<E, R> {
    next_handle: u64,
    // Insertion order is the dispatch order.
    entries: Vec<(u64, Callback<E, R>)>,
}

/// Generic ordered multi-subscriber registry.
pub struct CallbackRegistry<E, R = ()> {
    inner: Arc<Mutex<Inner<E, R>>>,
}

impl<E, R> Clone for CallbackRegistry<E, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E, R> Default for CallbackRegistry<E, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, R> CallbackRegistry<E, R> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                next_handle: 0,
                entries: Vec::new(),
            })),
        }
    }

    pub fn register<F>(&self, callback: F) -> Handle
    where
        F: Fn(&E) -> R + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock().expect("registry lock poisoned");
        let handle = inner.next_handle;
        inner.next_handle += 1;
        inner.entries.push((handle, Arc::new(callback)));
        Handle(handle)
    }

    /// Removes a registration. Idempotent: unknown handles are ignored.
    pub fn unregister(&self, handle: Handle) {
        let mut inner = self.inner.lock().expect("registry lock poisoned");
        inner.entries.retain(|(id, _)| *id != handle.0);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("registry lock poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Snapshot of the current subscriber list, so a callback that mutates
    // the registry mid-pass cannot skip or double-invoke unrelated entries.
    fn snapshot(&self) -> Vec<Callback<E, R>> {
        let inner = self.inner.lock().expect("registry lock poisoned");
        inner.entries.iter().map(|(_, cb)| Arc::clone(cb)).collect()
    }

    /// Invokes every currently registered callback in insertion order.
    /// Returns the number of callbacks invoked.
    pub fn dispatch_all(&self, value: &E) -> usize {
        let callbacks = self.snapshot();
        let count = callbacks.len();
        for cb in callbacks {
            let _ = cb(value);
        }
        count
    }
}

impl<E, R: Handled> CallbackRegistry<E, R> {
    /// Invokes callbacks in insertion order, stopping at the first one that
    /// reports the value as handled. Returns that result, or `None` if no
    /// callback handled it.
    pub fn dispatch_first(&self, value: &E) -> Option<R> {
        for cb in self.snapshot() {
            let result = cb(value);
            if result.is_handled() {
                return Some(result);
            }
        }
        None
    }
}

/// Monotonic id source for UI list keys and other per-process identifiers.
#[derive(Debug, Default)]
pub struct IdGen(AtomicU64);

impl IdGen {
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn register_then_unregister_dispatches_nothing() {
        let registry: CallbackRegistry<u32> = CallbackRegistry::new();
        let handle = registry.register(|_| ());
        registry.unregister(handle);
        assert_eq!(registry.dispatch_all(&1), 0);
    }

    #[test]
    fn unregister_is_idempotent() {
        let registry: CallbackRegistry<u32> = CallbackRegistry::new();
        let handle = registry.register(|_| ());
        registry.unregister(handle);
        registry.unregister(handle);
        assert!(registry.is_empty());
    }

    #[test]
    fn unregister_first_leaves_second_active() {
        let registry: CallbackRegistry<u32> = CallbackRegistry::new();
        let first_hits = Arc::new(AtomicUsize::new(0));
        let second_hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&first_hits);
        let first = registry.register(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = Arc::clone(&second_hits);
        let _second = registry.register(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        registry.unregister(first);
        assert_eq!(registry.dispatch_all(&7), 1);
        assert_eq!(first_hits.load(Ordering::SeqCst), 0);
        assert_eq!(second_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn first_match_stops_iteration() {
        let registry: CallbackRegistry<u32, bool> = CallbackRegistry::new();
        let second_hits = Arc::new(AtomicUsize::new(0));

        registry.register(|value| *value == 42);
        let counter = Arc::clone(&second_hits);
        registry.register(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        assert_eq!(registry.dispatch_first(&42), Some(true));
        assert_eq!(second_hits.load(Ordering::SeqCst), 0);

        // Unhandled by the first callback, so the second runs.
        assert_eq!(registry.dispatch_first(&0), Some(true));
        assert_eq!(second_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callbacks_run_in_insertion_order() {
        let registry: CallbackRegistry<(), u32> = CallbackRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..4u32 {
            let order = Arc::clone(&order);
            registry.register(move |_| {
                order.lock().unwrap().push(i);
                i
            });
        }

        registry.dispatch_all(&());
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn unregister_during_dispatch_does_not_skip_entries() {
        let registry: CallbackRegistry<()> = CallbackRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let victim = registry.register(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        // The first callback removes the third registration mid-pass.
        let registry_clone = registry.clone();
        let counter = Arc::clone(&hits);
        registry.register(move |_| {
            registry_clone.unregister(victim);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let counter = Arc::clone(&hits);
        registry.register(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        // victim runs first (snapshot), then the mutating callback, then the
        // last one; nothing panics and nothing is skipped.
        let registry2 = registry.clone();
        registry2.dispatch_all(&());
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn handles_are_never_reused() {
        let registry: CallbackRegistry<()> = CallbackRegistry::new();
        let a = registry.register(|_| ());
        registry.unregister(a);
        let b = registry.register(|_| ());
        assert_ne!(a, b);
    }

    #[test]
    fn idgen_is_monotonic() {
        let ids = IdGen::new();
        let a = ids.next();
        let b = ids.next();
        assert!(b > a);
    }
}
