//! The single lock serializing every debug-store operation.
//!
//! # Key Components
//!
//! - [`DebugGate`] - a re-entrant mutex around the store state, counting acquisitions
//!
//! The gate is re-entrant: a thread already holding it may take it again, so a public
//! operation can call another public operation without deadlocking. The state behind it
//! is only ever handed out as a shared reference; tables that need mutation use interior
//! mutability of their own.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

/// Re-entrant lock around the debug-store state.
///
/// # Examples
///
/// ```rust
/// use jitdebug::gate::DebugGate;
///
/// let gate = DebugGate::new(5u32);
/// let outer = gate.lock();
/// let inner = gate.lock(); // same thread, no deadlock
/// assert_eq!(*outer + *inner, 10);
/// assert_eq!(gate.acquisitions(), 2);
/// ```
#[derive(Debug)]
pub struct DebugGate<T> {
    inner: ReentrantMutex<T>,
    acquisitions: AtomicUsize,
}

impl<T> DebugGate<T> {
    /// Wrap `state` in a new gate.
    pub fn new(state: T) -> Self {
        Self {
            inner: ReentrantMutex::new(state),
            acquisitions: AtomicUsize::new(0),
        }
    }

    /// Take the gate, blocking until no other thread holds it.
    pub fn lock(&self) -> ReentrantMutexGuard<'_, T> {
        self.acquisitions.fetch_add(1, Ordering::Relaxed);
        self.inner.lock()
    }

    /// Number of times the gate was taken, nested acquisitions included.
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::Relaxed)
    }
}

impl<T: Default> Default for DebugGate<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
