//! Marshalling work onto the UI thread.
//!
//! The UI thread owns every view surface. Background code never touches a
//! view directly; it wraps the update in an [`Invocation`] and posts it to a
//! [`Dispatcher`], which runs it on the UI thread later.
//!
//! [`EventQueue`] is the provided dispatcher. It is created on (and owned by)
//! the UI thread, which pumps it from its event loop. Any number of
//! [`DispatchHandle`]s may post to it from other threads:
//!
//! ```
//! use horizon_panels_core::{Dispatcher, EventQueue, Invocation};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let queue = EventQueue::new();
//! let handle = queue.handle();
//! let hits = Arc::new(AtomicUsize::new(0));
//!
//! let worker_hits = hits.clone();
//! std::thread::spawn(move || {
//!     handle
//!         .post(Invocation::new(move || {
//!             worker_hits.fetch_add(1, Ordering::SeqCst);
//!         }))
//!         .unwrap();
//! })
//! .join()
//! .unwrap();
//!
//! assert_eq!(queue.process_pending(), 1);
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, unbounded};

use crate::error::DispatchError;
use crate::logging::targets;
use crate::thread_check::ThreadAffinity;

/// Counter for unique invocation IDs.
static NEXT_INVOCATION_ID: AtomicU64 = AtomicU64::new(1);

/// A type-erased unit of work destined for the UI thread.
pub struct Invocation {
    id: u64,
    invoke: Box<dyn FnOnce() + Send>,
}

impl Invocation {
    /// Wrap a closure for deferred execution.
    pub fn new<F>(invoke: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            id: NEXT_INVOCATION_ID.fetch_add(1, Ordering::Relaxed),
            invoke: Box::new(invoke),
        }
    }

    /// Unique, monotonically increasing id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Run the invocation on the current thread.
    pub fn execute(self) {
        (self.invoke)();
    }
}

impl std::fmt::Debug for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation").field("id", &self.id).finish()
    }
}

/// A single-threaded execution context that accepts work from any thread.
pub trait Dispatcher: Send + Sync {
    /// Queue `invocation` to run on the dispatch thread.
    ///
    /// Invocations posted from one thread run in the order they were posted.
    fn post(&self, invocation: Invocation) -> Result<(), DispatchError>;

    /// Returns `true` when called from the dispatch thread itself.
    fn is_dispatch_thread(&self) -> bool;
}

/// Cloneable, thread-safe sender half of an [`EventQueue`].
#[derive(Clone)]
pub struct DispatchHandle {
    sender: Sender<Invocation>,
    affinity: ThreadAffinity,
}

impl Dispatcher for DispatchHandle {
    fn post(&self, invocation: Invocation) -> Result<(), DispatchError> {
        let id = invocation.id();
        self.sender.send(invocation).map_err(|_| {
            tracing::trace!(target: targets::DISPATCH, id, "event queue closed, dropping invocation");
            DispatchError::Closed
        })
    }

    fn is_dispatch_thread(&self) -> bool {
        self.affinity.is_same_thread()
    }
}

impl std::fmt::Debug for DispatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchHandle")
            .field("pending", &self.sender.len())
            .finish()
    }
}

/// The UI thread's inbox of posted invocations.
///
/// Created on the UI thread, which then pumps it with
/// [`process_pending`](Self::process_pending) (or one of the blocking
/// variants) from its event loop. Invocations run in FIFO order. Dropping the
/// queue closes it; later posts fail with [`DispatchError::Closed`].
pub struct EventQueue {
    sender: Sender<Invocation>,
    receiver: Receiver<Invocation>,
    affinity: ThreadAffinity,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    /// Create a queue bound to the current thread.
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            affinity: ThreadAffinity::current(),
        }
    }

    /// A handle that posts into this queue.
    pub fn handle(&self) -> DispatchHandle {
        DispatchHandle {
            sender: self.sender.clone(),
            affinity: self.affinity,
        }
    }

    /// Shared dispatcher suitable for binders and runners.
    pub fn dispatcher(&self) -> Arc<dyn Dispatcher> {
        Arc::new(self.handle())
    }

    /// Number of invocations waiting to run.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Run everything queued right now, including anything those invocations
    /// post in turn. Returns the number of invocations run.
    pub fn process_pending(&self) -> usize {
        self.affinity
            .debug_assert_same_thread_with_msg("EventQueue pumped from a non-UI thread");
        let mut count = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(invocation) => {
                    self.run(invocation);
                    count += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        count
    }

    /// Block up to `timeout` for the first invocation, then drain the queue.
    pub fn process_for(&self, timeout: Duration) -> usize {
        self.affinity
            .debug_assert_same_thread_with_msg("EventQueue pumped from a non-UI thread");
        match self.receiver.recv_timeout(timeout) {
            Ok(invocation) => {
                self.run(invocation);
                1 + self.process_pending()
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }

    /// Pump until `condition` holds or `timeout` elapses.
    ///
    /// Returns whether the condition was met.
    pub fn run_until<F>(&self, mut condition: F, timeout: Duration) -> bool
    where
        F: FnMut() -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            self.process_pending();
            if condition() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let slice = (deadline - now).min(Duration::from_millis(10));
            self.process_for(slice);
        }
    }

    fn run(&self, invocation: Invocation) {
        tracing::trace!(target: targets::DISPATCH, id = invocation.id(), "running invocation");
        invocation.execute();
    }
}

impl Dispatcher for EventQueue {
    fn post(&self, invocation: Invocation) -> Result<(), DispatchError> {
        self.sender
            .send(invocation)
            .map_err(|_| DispatchError::Closed)
    }

    fn is_dispatch_thread(&self) -> bool {
        self.affinity.is_same_thread()
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("pending", &self.pending())
            .finish()
    }
}
