//! Signal/slot notifications.
//!
//! A [`Signal<Args>`] holds any number of connected slots and invokes them
//! when emitted. Models use signals to announce shape and content changes;
//! [`BusyState`](crate::BusyState) uses one to announce busy/idle
//! transitions.
//!
//! # Connection Types
//!
//! - **Direct**: the slot runs immediately on the emitting thread.
//! - **Queued**: the slot is posted to a [`Dispatcher`] and runs on its
//!   thread, so a worker can emit and the UI thread still receives.
//!
//! Slots are snapshotted before they run, so a slot may connect or
//! disconnect on the same signal without deadlocking.
//!
//! # Example
//!
//! ```
//! use horizon_panels_core::Signal;
//!
//! let rows_loaded = Signal::<usize>::new();
//! let status = rows_loaded.connect(|count| {
//!     println!("{count} rows loaded");
//! });
//!
//! rows_loaded.emit(128);
//! assert!(rows_loaded.disconnect(status));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::dispatch::{Dispatcher, Invocation};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// How a slot is delivered.
enum Delivery {
    Direct,
    Queued(Arc<dyn Dispatcher>),
}

struct Connection<Args> {
    slot: Slot<Args>,
    delivery: Delivery,
}

/// A type-safe signal that can have multiple connected slots.
///
/// `Args` is the argument type passed to slots. Use `()` for signals with no
/// arguments and a tuple for several.
pub struct Signal<Args> {
    connections: Mutex<SlotMap<ConnectionId, Connection<Args>>>,
    blocked: AtomicBool,
}

impl<Args: Clone + Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: Clone + Send + 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot that runs directly on the emitting thread.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.insert(Arc::new(slot), Delivery::Direct)
    }

    /// Connect a slot that runs on `dispatcher`'s thread.
    ///
    /// Each emission clones the arguments into a posted invocation. If the
    /// dispatcher has closed, the emission is dropped for this slot.
    pub fn connect_queued<F>(&self, dispatcher: Arc<dyn Dispatcher>, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.insert(Arc::new(slot), Delivery::Queued(dispatcher))
    }

    fn insert(&self, slot: Slot<Args>, delivery: Delivery) -> ConnectionId {
        self.connections.lock().insert(Connection { slot, delivery })
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` do nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected slots.
    #[tracing::instrument(skip_all, target = "horizon_panels_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        let snapshot: Vec<(Slot<Args>, Option<Arc<dyn Dispatcher>>)> = {
            let connections = self.connections.lock();
            connections
                .values()
                .map(|conn| {
                    let dispatcher = match &conn.delivery {
                        Delivery::Direct => None,
                        Delivery::Queued(dispatcher) => Some(dispatcher.clone()),
                    };
                    (conn.slot.clone(), dispatcher)
                })
                .collect()
        };
        tracing::trace!(target: targets::SIGNAL, connection_count = snapshot.len(), "emitting signal");

        for (slot, dispatcher) in snapshot {
            match dispatcher {
                None => slot(&args),
                Some(dispatcher) => {
                    let args = args.clone();
                    if dispatcher
                        .post(Invocation::new(move || slot(&args)))
                        .is_err()
                    {
                        tracing::debug!(target: targets::SIGNAL, "dispatcher closed, queued slot skipped");
                    }
                }
            }
        }
    }
}

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);
