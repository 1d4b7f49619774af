//! Push-based observable state cells.
//!
//! A [`Writable`] owns a value and a list of listeners. Every `set`/`update` publishes a fresh
//! snapshot and calls each listener synchronously with it. [`Readable`] is the read-only view
//! handed to consumers, and [`Readable::derive`] builds a cell that is recomputed on every
//! publish of its source.
//!
//! Locks are released before listeners run, so a listener may read any cell (including the one
//! that notified it). A listener must not `set` the cell that is notifying it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
    value: Mutex<T>,
    listeners: Mutex<Vec<(u64, Listener<T>)>>,
    next_listener: AtomicU64,
}

impl<T: Clone + Send + 'static> Inner<T> {
    fn new(value: T) -> Self {
        Self {
            value: Mutex::new(value),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(0),
        }
    }

    fn get(&self) -> T {
        self.value.lock().clone()
    }

    fn publish(&self, f: impl FnOnce(&mut T)) {
        let snapshot = {
            let mut value = self.value.lock();
            f(&mut *value);
            value.clone()
        };
        let listeners: Vec<Listener<T>> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    fn subscribe(self: &Arc<Self>, listener: Listener<T>) -> Subscription {
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().push((id, listener.clone()));
        listener(&self.get());

        let weak: Weak<Self> = Arc::downgrade(self);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.lock().retain(|(other, _)| *other != id);
            }
        })
    }

    fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

/// Handle returned by `subscribe`. Dropping it (or calling [`Subscription::unsubscribe`])
/// removes the listener.
#[must_use = "dropping a Subscription unsubscribes the listener immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    /// Keeps the listener registered for as long as the cell lives.
    pub fn detach(mut self) {
        self.cancel = None;
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Mutable observable cell. Clones share the same value and listeners.
pub struct Writable<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Writable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> Writable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Inner::new(value)),
        }
    }

    pub fn get(&self) -> T {
        self.inner.get()
    }

    pub fn set(&self, value: T) {
        self.inner.publish(move |slot| *slot = value);
    }

    /// Applies `f` to the current value and publishes the result.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.inner.publish(f);
    }

    /// Registers `listener` and calls it once with the current value.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.inner.subscribe(Arc::new(listener))
    }

    pub fn readable(&self) -> Readable<T> {
        Readable {
            inner: self.inner.clone(),
            _source: None,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listener_count()
    }
}

/// Read-only view of a cell. Derived cells keep their source subscription alive for as long
/// as any clone of the view exists.
pub struct Readable<T> {
    inner: Arc<Inner<T>>,
    _source: Option<Arc<Subscription>>,
}

impl<T> Clone for Readable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _source: self._source.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> Readable<T> {
    pub fn get(&self) -> T {
        self.inner.get()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.inner.subscribe(Arc::new(listener))
    }

    /// Builds a cell holding `f(source)` that is recomputed on every publish of `self`.
    pub fn derive<U, F>(&self, f: F) -> Readable<U>
    where
        U: Clone + Send + 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        let target = Arc::new(Inner::new(f(&self.get())));
        let weak = Arc::downgrade(&target);
        let source = self.inner.subscribe(Arc::new(move |value: &T| {
            if let Some(target) = weak.upgrade() {
                let next = f(value);
                target.publish(move |slot| *slot = next);
            }
        }));
        Readable {
            inner: target,
            _source: Some(Arc::new(source)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Writable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Writable")
            .field(&*self.inner.value.lock())
            .finish()
    }
}

impl<T: fmt::Debug> fmt::Debug for Readable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Readable")
            .field(&*self.inner.value.lock())
            .finish()
    }
}
