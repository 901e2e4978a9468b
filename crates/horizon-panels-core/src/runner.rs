//! Background tasks bound to a view surface.
//!
//! [`TaskRunner`] is what a controller uses to run blocking work without
//! freezing the UI:
//!
//! 1. If no view is attached, `submit` does nothing.
//! 2. Otherwise the surface's [`BusyState`] is entered on the calling thread
//!    and the work is handed to the [`WorkerPool`].
//! 3. On the worker, the work either succeeds (it published its own results
//!    through [`TaskContext::dispatch`]), is cancelled (the cancellation
//!    callback runs), or fails (the message is shown on the surface).
//! 4. Whatever happens, including the job being evicted or discarded at
//!    shutdown before it ever ran, the busy state is exited exactly once.
//!
//! The surface's busy indicator follows the counter: every idle/busy
//! transition posts a `set_busy` to the UI thread, which reads the counter
//! when it runs instead of trusting the value at posting time.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Weak};
use std::time::Duration;

use crate::binder::ViewBinder;
use crate::busy::{BusyGuard, BusyState};
use crate::error::{CancelReason, Cancelled, TaskError};
use crate::logging::{PerfSpan, targets};
use crate::signal::ConnectionId;
use crate::surface::ViewSurface;
use crate::threadpool::{CancellationToken, Job, JobHandle, WorkerPool};

/// Callback invoked when a task is cancelled.
pub type CancelCallback = Box<dyn FnOnce(Cancelled) + Send>;

/// What background work sees while it runs.
pub struct TaskContext<V: ?Sized> {
    token: CancellationToken,
    binder: ViewBinder<V>,
}

impl<V: ?Sized + Send + Sync + 'static> TaskContext<V> {
    /// The task's cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// `Err` once the task has been cancelled.
    pub fn check_cancelled(&self) -> Result<(), Cancelled> {
        self.token.check()
    }

    /// Interruptible sleep.
    pub fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        self.token.sleep(duration)
    }

    /// Publish a result to the view on the UI thread.
    ///
    /// Dropped silently if the view has been detached by then.
    pub fn dispatch<F>(&self, action: F) -> bool
    where
        F: FnOnce(&V) + Send + 'static,
    {
        self.binder.dispatch(action)
    }

    /// The binder the task was submitted through.
    pub fn binder(&self) -> &ViewBinder<V> {
        &self.binder
    }
}

/// Submits work for one view surface.
pub struct TaskRunner<V: ?Sized + ViewSurface + 'static> {
    pool: Arc<WorkerPool>,
    binder: ViewBinder<V>,
    busy: Arc<BusyState>,
    busy_connection: ConnectionId,
}

impl<V: ?Sized + ViewSurface + 'static> TaskRunner<V> {
    /// Create a runner with its own busy state.
    pub fn new(pool: Arc<WorkerPool>, binder: ViewBinder<V>) -> Self {
        Self::with_busy_state(pool, binder, Arc::new(BusyState::new()))
    }

    /// Create a runner that shares `busy` with other runners for the same
    /// surface.
    pub fn with_busy_state(
        pool: Arc<WorkerPool>,
        binder: ViewBinder<V>,
        busy: Arc<BusyState>,
    ) -> Self {
        let sync_binder = binder.clone();
        let weak_busy: Weak<BusyState> = Arc::downgrade(&busy);
        let busy_connection = busy.busy_changed().connect(move |_| {
            let weak_busy = weak_busy.clone();
            sync_binder.dispatch(move |view| {
                if let Some(busy) = weak_busy.upgrade() {
                    view.set_busy(busy.is_busy());
                }
            });
        });

        Self {
            pool,
            binder,
            busy,
            busy_connection,
        }
    }

    /// The surface's busy counter.
    pub fn busy_state(&self) -> &Arc<BusyState> {
        &self.busy
    }

    /// The binder results are dispatched through.
    pub fn binder(&self) -> &ViewBinder<V> {
        &self.binder
    }

    /// Run `work` in the background.
    ///
    /// Returns `None` without doing anything if no view is attached, or if
    /// the pool has shut down (the work is treated as cancelled).
    pub fn submit<W>(&self, work: W) -> Option<JobHandle>
    where
        W: FnOnce(&TaskContext<V>) -> Result<(), TaskError> + Send + 'static,
    {
        self.submit_inner(Box::new(work), None)
    }

    /// Like [`submit`](Self::submit), with a callback for the cancelled path.
    ///
    /// `on_cancelled` runs on the thread that resolved the task: the worker
    /// if the work returned a cancellation, otherwise the thread that evicted
    /// or discarded the job.
    pub fn submit_with_cancel<W, C>(&self, work: W, on_cancelled: C) -> Option<JobHandle>
    where
        W: FnOnce(&TaskContext<V>) -> Result<(), TaskError> + Send + 'static,
        C: FnOnce(Cancelled) + Send + 'static,
    {
        self.submit_inner(Box::new(work), Some(Box::new(on_cancelled)))
    }

    fn submit_inner(
        &self,
        work: Box<dyn FnOnce(&TaskContext<V>) -> Result<(), TaskError> + Send>,
        on_cancelled: Option<CancelCallback>,
    ) -> Option<JobHandle> {
        if !self.binder.is_attached() {
            tracing::debug!(target: targets::TASK, "no view attached, task not submitted");
            return None;
        }

        let job = TaskJob {
            work,
            on_cancelled,
            binder: self.binder.clone(),
            busy: self.busy.enter(),
        };

        match self.pool.submit(Box::new(job)) {
            Ok(handle) => {
                tracing::trace!(target: targets::TASK, task_id = handle.id(), "task submitted");
                Some(handle)
            }
            Err(err) => {
                tracing::debug!(target: targets::TASK, error = %err, "task refused by pool");
                None
            }
        }
    }
}

impl<V: ?Sized + ViewSurface + 'static> Drop for TaskRunner<V> {
    fn drop(&mut self) {
        self.busy.busy_changed().disconnect(self.busy_connection);
    }
}

/// The pool job wrapping one submission. Holding the guard ties the busy
/// count to the job's lifetime, so it is released exactly once whether the
/// job runs, is discarded, or is dropped.
struct TaskJob<V: ?Sized> {
    work: Box<dyn FnOnce(&TaskContext<V>) -> Result<(), TaskError> + Send>,
    on_cancelled: Option<CancelCallback>,
    binder: ViewBinder<V>,
    busy: BusyGuard,
}

impl<V: ?Sized + ViewSurface + 'static> TaskJob<V> {
    fn cancelled(on_cancelled: Option<CancelCallback>, cancelled: Cancelled) {
        tracing::debug!(target: targets::TASK, reason = %cancelled.reason, "task cancelled");
        if let Some(callback) = on_cancelled {
            callback(cancelled);
        }
    }

    fn failed(binder: &ViewBinder<V>, error: &TaskError) {
        tracing::warn!(target: targets::TASK, error = %error.chain(), "task failed");
        let message = error.to_string();
        binder.dispatch(move |view| view.show_error(&message));
    }
}

impl<V: ?Sized + ViewSurface + 'static> Job for TaskJob<V> {
    fn run(self: Box<Self>, token: &CancellationToken) {
        let TaskJob {
            work,
            on_cancelled,
            binder,
            busy,
        } = *self;

        let context = TaskContext {
            token: token.clone(),
            binder: binder.clone(),
        };

        let outcome = {
            let _span = PerfSpan::new("task");
            catch_unwind(AssertUnwindSafe(|| work(&context)))
        };

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(TaskError::Cancelled(cancelled))) => Self::cancelled(on_cancelled, cancelled),
            Ok(Err(error)) => Self::failed(&binder, &error),
            Err(payload) => {
                let detail = panic_message(payload.as_ref());
                tracing::error!(target: targets::TASK, panic = %detail, "task panicked");
                Self::failed(&binder, &TaskError::failed(format!("task panicked: {detail}")));
            }
        }
        drop(busy);
    }

    fn discard(self: Box<Self>, reason: CancelReason) {
        let TaskJob {
            on_cancelled, busy, ..
        } = *self;
        Self::cancelled(on_cancelled, Cancelled::new(reason));
        drop(busy);
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
