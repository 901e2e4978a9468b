//! Core systems for Horizon Panels.
//!
//! This crate provides the concurrency substrate the panel toolkit is built
//! on:
//!
//! - **Signal/Slot System**: type-safe change notification
//! - **UI Dispatch**: an [`EventQueue`] owned by the UI thread, fed from any thread
//! - **Worker Pool**: a bounded, drop-oldest pool with cooperative cancellation
//! - **Busy State**: a reentrant counter behind a surface's busy indicator
//! - **View Binding**: a weak, swappable controller-to-view link
//! - **Task Runner**: background work that reports back to its view
//!
//! # Task Example
//!
//! ```
//! use horizon_panels_core::{
//!     EventQueue, PoolConfig, TaskError, TaskRunner, ViewBinder, ViewSurface, WorkerPool,
//! };
//! use parking_lot::Mutex;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[derive(Default)]
//! struct UserList {
//!     names: Mutex<Vec<String>>,
//! }
//!
//! impl ViewSurface for UserList {
//!     fn set_busy(&self, _busy: bool) {}
//!     fn show_error(&self, message: &str) {
//!         eprintln!("{message}");
//!     }
//! }
//!
//! let queue = EventQueue::new();
//! let pool = Arc::new(WorkerPool::new(PoolConfig::default()).unwrap());
//! let view = Arc::new(UserList::default());
//!
//! let binder = ViewBinder::new(queue.dispatcher());
//! binder.attach(&view);
//! let runner = TaskRunner::new(pool.clone(), binder);
//!
//! runner.submit(|ctx| {
//!     ctx.check_cancelled()?;
//!     let names = vec!["ada".to_string(), "grace".to_string()];
//!     ctx.dispatch(move |view: &UserList| *view.names.lock() = names);
//!     Ok::<(), TaskError>(())
//! });
//!
//! assert!(queue.run_until(|| view.names.lock().len() == 2, Duration::from_secs(5)));
//! pool.shutdown();
//! ```

pub mod binder;
pub mod busy;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod runner;
pub mod signal;
pub mod surface;
pub mod thread_check;
pub mod threadpool;

pub use binder::ViewBinder;
pub use busy::{BusyGuard, BusyState};
pub use dispatch::{DispatchHandle, Dispatcher, EventQueue, Invocation};
pub use error::{BinderError, CancelReason, Cancelled, DispatchError, PoolError, TaskError};
pub use logging::PerfSpan;
pub use runner::{CancelCallback, TaskContext, TaskRunner};
pub use signal::{ConnectionId, Signal};
pub use surface::ViewSurface;
pub use thread_check::ThreadAffinity;
pub use threadpool::{CancellationToken, Job, JobHandle, PoolConfig, WorkerPool};
