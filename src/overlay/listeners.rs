//! Window-level input subscriptions owned by the engine.
//!
//! SYSTEM CONTEXT
//! ==============
//! The host mirrors every attach/detach the engine reports onto real DOM
//! listeners. This registry is the single source of truth for which ones are
//! live: attaching twice is a no-op, detaching something not attached is a
//! no-op, and the running totals let callers prove that every attach was
//! paired with a detach once the overlay is torn down.

#[cfg(test)]
#[path = "listeners_test.rs"]
mod listeners_test;

use std::collections::BTreeSet;

/// A global listener the engine may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Listener {
    /// `keydown` on the window; live while mounted.
    KeyDown,
    /// `keyup` on the window; live while mounted.
    KeyUp,
    /// `pointermove` tracking a drag 1:1.
    DragMove,
    /// `pointermove` panning the magnified overlay against the cursor.
    ZoomFollow,
    /// `wheel` adjusting opacity while Control is held.
    OpacityWheel,
}

#[derive(Debug, Default)]
pub struct InputSubscriptions {
    active: BTreeSet<Listener>,
    attached_total: u64,
    detached_total: u64,
}

impl InputSubscriptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the listener was not already attached.
    pub fn attach(&mut self, listener: Listener) -> bool {
        if !self.active.insert(listener) {
            return false;
        }
        self.attached_total += 1;
        tracing::debug!(?listener, "listener attached");
        true
    }

    /// Returns `true` if the listener was attached.
    pub fn detach(&mut self, listener: Listener) -> bool {
        if !self.active.remove(&listener) {
            return false;
        }
        self.detached_total += 1;
        tracing::debug!(?listener, "listener detached");
        true
    }

    /// Detach everything, returning what was live.
    pub fn detach_all(&mut self) -> Vec<Listener> {
        let live: Vec<Listener> = self.active.iter().copied().collect();
        for listener in &live {
            self.detach(*listener);
        }
        live
    }

    #[must_use]
    pub fn is_attached(&self, listener: Listener) -> bool {
        self.active.contains(&listener)
    }

    pub fn active(&self) -> impl Iterator<Item = Listener> + '_ {
        self.active.iter().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    #[must_use]
    pub fn attached_total(&self) -> u64 {
        self.attached_total
    }

    #[must_use]
    pub fn detached_total(&self) -> u64 {
        self.detached_total
    }
}
