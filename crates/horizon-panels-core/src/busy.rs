//! Reentrant busy counter for a view surface.
//!
//! Several background operations may run against the same surface at once.
//! Each one calls [`BusyState::begin`] when it starts and [`BusyState::end`]
//! when it finishes; the surface is busy while any of them is outstanding.
//! Only the idle-to-busy and busy-to-idle transitions are observable, through
//! [`BusyState::busy_changed`].

use std::sync::Arc;

use parking_lot::Mutex;

use crate::logging::targets;
use crate::signal::Signal;

/// A non-negative counter of in-flight operations.
pub struct BusyState {
    count: Mutex<usize>,
    busy_changed: Signal<bool>,
}

impl Default for BusyState {
    fn default() -> Self {
        Self::new()
    }
}

impl BusyState {
    /// Create an idle state.
    pub fn new() -> Self {
        Self {
            count: Mutex::new(0),
            busy_changed: Signal::new(),
        }
    }

    /// Register one more in-flight operation.
    ///
    /// Returns `true` if this call made the state busy.
    pub fn begin(&self) -> bool {
        let became_busy = {
            let mut count = self.count.lock();
            *count += 1;
            *count == 1
        };
        if became_busy {
            tracing::trace!(target: targets::BUSY, "busy");
            self.busy_changed.emit(true);
        }
        became_busy
    }

    /// Mark one in-flight operation finished.
    ///
    /// Returns `true` if this call made the state idle. Calling `end` while
    /// already idle is a bug in the caller; the counter stays at zero and a
    /// warning is logged.
    pub fn end(&self) -> bool {
        let became_idle = {
            let mut count = self.count.lock();
            match *count {
                0 => {
                    tracing::warn!(target: targets::BUSY, "end() called on idle busy state, ignoring");
                    return false;
                }
                n => {
                    *count = n - 1;
                    n == 1
                }
            }
        };
        if became_idle {
            tracing::trace!(target: targets::BUSY, "idle");
            self.busy_changed.emit(false);
        }
        became_idle
    }

    /// Whether any operation is outstanding.
    pub fn is_busy(&self) -> bool {
        *self.count.lock() > 0
    }

    /// Number of outstanding operations.
    pub fn count(&self) -> usize {
        *self.count.lock()
    }

    /// Emitted with `true` on idle-to-busy and `false` on busy-to-idle.
    ///
    /// Slots run on the thread that caused the transition.
    pub fn busy_changed(&self) -> &Signal<bool> {
        &self.busy_changed
    }

    /// `begin` now, `end` when the guard drops.
    pub fn enter(self: &Arc<Self>) -> BusyGuard {
        self.begin();
        BusyGuard {
            state: Some(self.clone()),
        }
    }
}

impl std::fmt::Debug for BusyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusyState")
            .field("count", &self.count())
            .finish()
    }
}

/// Ends one operation on drop. Created by [`BusyState::enter`].
#[must_use = "the operation ends as soon as the guard is dropped"]
pub struct BusyGuard {
    state: Option<Arc<BusyState>>,
}

impl BusyGuard {
    /// End the operation now.
    pub fn release(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if let Some(state) = self.state.take() {
            state.end();
        }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.finish();
    }
}

static_assertions::assert_impl_all!(BusyState: Send, Sync);
static_assertions::assert_impl_all!(BusyGuard: Send);
