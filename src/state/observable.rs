//! Change-notifying record container.
//!
//! DESIGN
//! ======
//! Backed by a `tokio::sync::watch` channel: writers apply a whole closure
//! under one borrow, so a multi-field update is published in a single step
//! and subscribers never see a half-applied record. Handles are cheap clones
//! sharing one channel; everything runs on the single UI thread.

#[cfg(test)]
#[path = "observable_test.rs"]
mod observable_test;

use std::rc::Rc;

use tokio::sync::watch;

/// A shared, observable value.
#[derive(Debug)]
pub struct Observable<T> {
    tx: Rc<watch::Sender<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self { tx: Rc::clone(&self.tx) }
    }
}

impl<T: Clone> Observable<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        let (tx, _rx) = watch::channel(value);
        Self { tx: Rc::new(tx) }
    }

    /// Snapshot of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Read without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Apply `f` and notify subscribers.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
    }

    /// Apply `f`; subscribers are notified only when it returns `true`.
    pub fn update_if(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        self.tx.send_if_modified(f)
    }

    /// Swap in a new value, returning the old one.
    pub fn replace(&self, value: T) -> T {
        self.tx.send_replace(value)
    }

    /// Receiver that observes every published change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}
