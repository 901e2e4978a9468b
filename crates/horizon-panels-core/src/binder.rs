//! Weak, swappable link from a controller to its current view.
//!
//! A controller outlives any one view: panels are created and discarded as
//! the user navigates, and background work started for one view may finish
//! after it is gone. The controller therefore talks to its view only through
//! a [`ViewBinder`], which holds a weak reference and drops updates aimed at a
//! view that is no longer attached.
//!
//! # Example
//!
//! ```
//! use horizon_panels_core::{EventQueue, ViewBinder};
//! use parking_lot::Mutex;
//! use std::sync::Arc;
//!
//! struct Label(Mutex<String>);
//!
//! let queue = EventQueue::new();
//! let binder = ViewBinder::<Label>::new(queue.dispatcher());
//! let label = Arc::new(Label(Mutex::new(String::new())));
//!
//! binder.attach(&label);
//! binder.dispatch(|label| *label.0.lock() = "loaded".into());
//! queue.process_pending();
//! assert_eq!(*label.0.lock(), "loaded");
//!
//! binder.detach();
//! binder.dispatch(|label| *label.0.lock() = "stale".into());
//! queue.process_pending();
//! assert_eq!(*label.0.lock(), "loaded");
//! ```

use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::dispatch::{Dispatcher, Invocation};
use crate::error::BinderError;
use crate::logging::targets;

/// Holds at most one weakly-referenced view.
///
/// Clones share the same slot, so a clone handed to background work observes
/// a later `detach` on the original.
pub struct ViewBinder<V: ?Sized> {
    slot: Arc<RwLock<Option<Weak<V>>>>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl<V: ?Sized> Clone for ViewBinder<V> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl<V: ?Sized + Send + Sync + 'static> ViewBinder<V> {
    /// Create a detached binder that dispatches through `dispatcher`.
    pub fn new(dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            slot: Arc::new(RwLock::new(None)),
            dispatcher,
        }
    }

    /// Attach `view`, replacing any previously attached view.
    pub fn attach(&self, view: &Arc<V>) {
        *self.slot.write() = Some(Arc::downgrade(view));
        tracing::trace!(target: targets::BINDER, "view attached");
    }

    /// Detach the current view. Calling this when already detached is a no-op.
    pub fn detach(&self) {
        if self.slot.write().take().is_some() {
            tracing::trace!(target: targets::BINDER, "view detached");
        }
    }

    /// Whether a live view is attached.
    ///
    /// A view whose last strong reference was dropped counts as detached.
    pub fn is_attached(&self) -> bool {
        self.view().is_some()
    }

    /// The attached view, if it is still alive.
    pub fn view(&self) -> Option<Arc<V>> {
        self.slot.read().as_ref().and_then(Weak::upgrade)
    }

    /// The attached view, or [`BinderError::NotAttached`].
    pub fn check_attached(&self) -> Result<Arc<V>, BinderError> {
        self.view().ok_or(BinderError::NotAttached)
    }

    /// The dispatcher this binder posts to.
    pub fn dispatcher(&self) -> &Arc<dyn Dispatcher> {
        &self.dispatcher
    }

    /// Run `action` against the view on the UI thread.
    ///
    /// Attachment is checked now and again on the UI thread right before
    /// `action` runs; if the view was detached or dropped in between, the
    /// action is silently discarded. Returns `false` if the action was
    /// dropped immediately, either because nothing is attached or because
    /// the UI queue has closed.
    pub fn dispatch<F>(&self, action: F) -> bool
    where
        F: FnOnce(&V) + Send + 'static,
    {
        if !self.is_attached() {
            tracing::trace!(target: targets::BINDER, "no view attached, dropping dispatch");
            return false;
        }

        let slot = self.slot.clone();
        let invocation = Invocation::new(move || {
            let view = slot.read().as_ref().and_then(Weak::upgrade);
            match view {
                Some(view) => action(view.as_ref()),
                None => {
                    tracing::trace!(target: targets::BINDER, "view detached before dispatch ran");
                }
            }
        });

        self.dispatcher.post(invocation).is_ok()
    }
}

impl<V: ?Sized + Send + Sync + 'static> std::fmt::Debug for ViewBinder<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewBinder")
            .field("attached", &self.is_attached())
            .finish()
    }
}
