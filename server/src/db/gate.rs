//! Process-wide mutual exclusion around the document store.
//!
//! Every handler that reads or writes the store holds the gate for the whole
//! of its store interaction. There is one gate and it is never acquired
//! recursively, so at most one store operation is in flight at a time.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Free,
    Held,
}

struct Inner<S> {
    store: Mutex<S>,
    held: AtomicBool,
}

/// Cloneable handle to the single gate guarding a store `S`.
pub struct Gate<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for Gate<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S> Gate<S> {
    pub fn new(store: S) -> Self {
        Self {
            inner: Arc::new(Inner {
                store: Mutex::new(store),
                held: AtomicBool::new(false),
            }),
        }
    }

    /// Block until the gate is free, then take exclusive access to the store.
    /// Access is released when the returned guard is dropped.
    ///
    /// A handler that panicked while holding the gate leaves it poisoned; the
    /// poison is cleared here since each store call is atomic on its own.
    pub fn acquire(&self) -> GateGuard<'_, S> {
        let guard = match self.inner.store.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("Store gate was poisoned by a panicking holder, recovering");
                self.inner.store.clear_poison();
                poisoned.into_inner()
            }
        };
        let was_held = self.inner.held.swap(true, Ordering::AcqRel);
        debug_assert!(!was_held, "gate state was Held on acquire");
        GateGuard {
            guard,
            held: &self.inner.held,
        }
    }

    /// Snapshot of the gate state.
    pub fn state(&self) -> GateState {
        if self.inner.held.load(Ordering::Acquire) {
            GateState::Held
        } else {
            GateState::Free
        }
    }
}

/// Exclusive access to the gated store.
pub struct GateGuard<'a, S> {
    guard: MutexGuard<'a, S>,
    held: &'a AtomicBool,
}

impl<S> GateGuard<'_, S> {
    /// Release the gate now instead of at end of scope.
    pub fn release(self) {
        drop(self);
    }
}

impl<S> Deref for GateGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.guard
    }
}

impl<S> DerefMut for GateGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.guard
    }
}

impl<S> Drop for GateGuard<'_, S> {
    fn drop(&mut self) {
        // Runs before `guard` unlocks the mutex, so the flag never reads Free
        // while another holder is inside.
        let was_held = self.held.swap(false, Ordering::AcqRel);
        debug_assert!(was_held, "gate state was Free on release");
    }
}
