//! Bounded worker pool for background task execution.
//!
//! The pool hands work directly to worker threads. It starts with
//! `core_threads` threads and grows up to `max_threads` while every thread is
//! busy. Once saturated, at most `queue_capacity` submissions wait for a free
//! thread; a newer submission displaces the oldest waiting one, which is
//! discarded through its cancellation path. The most recent user action is
//! assumed to matter more than a stale queued one.
//!
//! Threads above `core_threads` retire after sitting idle for `keep_alive`.
//!
//! # Cancellation
//!
//! Every accepted job gets a [`CancellationToken`]. Work observes
//! interruption by checking the token, or by blocking through
//! [`CancellationToken::sleep`], which wakes as soon as the token is
//! cancelled. Shutdown cancels the tokens of in-flight jobs.
//!
//! # Example
//!
//! ```
//! use horizon_panels_core::threadpool::{PoolConfig, WorkerPool};
//! use std::sync::mpsc;
//!
//! let pool = WorkerPool::new(PoolConfig::default()).unwrap();
//! let (tx, rx) = mpsc::channel();
//!
//! pool.execute(move |token| {
//!     if token.check().is_ok() {
//!         tx.send(42).unwrap();
//!     }
//! })
//! .unwrap();
//!
//! assert_eq!(rx.recv().unwrap(), 42);
//! assert!(pool.shutdown());
//! ```

use std::collections::{HashMap, VecDeque};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use serde::Deserialize;

use crate::error::{CancelReason, Cancelled, PoolError};
use crate::logging::targets;

/// Global worker pool instance.
static GLOBAL_POOL: OnceLock<Arc<WorkerPool>> = OnceLock::new();

/// Counter for unique job IDs.
static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(1);

// ============================================================================
// Cancellation
// ============================================================================

/// A cancellation token for cooperative task cancellation.
///
/// Clones share state. The first cancellation reason recorded wins.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    inner: Arc<CancellationState>,
}

#[derive(Debug)]
struct CancellationState {
    cancelled: AtomicBool,
    reason: Mutex<Option<CancelReason>>,
    condvar: Condvar,
}

impl CancellationToken {
    /// Create a new, uncancelled token.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CancellationState {
                cancelled: AtomicBool::new(false),
                reason: Mutex::new(None),
                condvar: Condvar::new(),
            }),
        }
    }

    /// Check if cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Request cancellation with [`CancelReason::Requested`].
    pub fn cancel(&self) {
        self.cancel_with(CancelReason::Requested);
    }

    /// Request cancellation, recording `reason` if none was recorded yet.
    ///
    /// Wakes any thread blocked in [`sleep`](Self::sleep).
    pub fn cancel_with(&self, reason: CancelReason) {
        let mut slot = self.inner.reason.lock();
        if slot.is_none() {
            *slot = Some(reason);
            self.inner.cancelled.store(true, Ordering::Release);
            self.inner.condvar.notify_all();
        }
    }

    /// The recorded cancellation reason, if cancelled.
    pub fn reason(&self) -> Option<CancelReason> {
        *self.inner.reason.lock()
    }

    /// `Err` once cancelled, for use with `?` inside work.
    pub fn check(&self) -> Result<(), Cancelled> {
        match self.reason() {
            Some(reason) => Err(Cancelled::new(reason)),
            None => Ok(()),
        }
    }

    /// Block for `duration`, returning early with `Err` if cancelled.
    pub fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        let deadline = Instant::now() + duration;
        let mut reason = self.inner.reason.lock();
        while reason.is_none() {
            if self
                .inner
                .condvar
                .wait_until(&mut reason, deadline)
                .timed_out()
            {
                break;
            }
        }
        match *reason {
            Some(reason) => Err(Cancelled::new(reason)),
            None => Ok(()),
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Configuration
// ============================================================================

fn default_core_threads() -> usize {
    1
}

fn default_max_threads() -> usize {
    10
}

fn default_keep_alive_ms() -> u64 {
    30_000
}

fn default_queue_capacity() -> usize {
    1
}

fn default_thread_name() -> String {
    "panel-worker".to_string()
}

fn default_shutdown_timeout_ms() -> u64 {
    5_000
}

/// Configuration for a [`WorkerPool`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Threads kept alive even when idle.
    pub core_threads: usize,
    /// Upper bound on worker threads.
    pub max_threads: usize,
    /// How long a thread above `core_threads` may idle before exiting.
    pub keep_alive_ms: u64,
    /// Submissions allowed to wait once every thread is busy (minimum 1).
    pub queue_capacity: usize,
    /// Prefix for worker thread names.
    pub thread_name: String,
    /// Stack size for worker threads in bytes. `None` uses the default.
    pub stack_size: Option<usize>,
    /// Upper bound on how long `shutdown` waits for workers to exit.
    pub shutdown_timeout_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            core_threads: default_core_threads(),
            max_threads: default_max_threads(),
            keep_alive_ms: default_keep_alive_ms(),
            queue_capacity: default_queue_capacity(),
            thread_name: default_thread_name(),
            stack_size: None,
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
        }
    }
}

impl PoolConfig {
    /// Configuration with a fixed thread count.
    pub fn with_threads(threads: usize) -> Self {
        let threads = threads.max(1);
        Self {
            core_threads: threads,
            max_threads: threads,
            ..Default::default()
        }
    }

    /// Set the thread name prefix.
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Set the thread bounds.
    pub fn threads(mut self, core: usize, max: usize) -> Self {
        self.core_threads = core;
        self.max_threads = max;
        self
    }

    /// Set the hand-off buffer size.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the idle timeout for extra threads.
    pub fn keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive_ms = keep_alive.as_millis() as u64;
        self
    }

    /// Set the bounded shutdown wait.
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the worker stack size.
    pub fn stack_size(mut self, size: usize) -> Self {
        self.stack_size = Some(size);
        self
    }

    /// Idle timeout as a `Duration`.
    pub fn keep_alive_duration(&self) -> Duration {
        Duration::from_millis(self.keep_alive_ms)
    }

    /// Shutdown wait as a `Duration`.
    pub fn shutdown_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// Clamp inconsistent values: at least one thread, `core <= max`, and a
    /// buffer of at least one.
    fn normalized(mut self) -> Self {
        self.max_threads = self.max_threads.max(1);
        self.core_threads = self.core_threads.min(self.max_threads);
        self.queue_capacity = self.queue_capacity.max(1);
        self
    }
}

// ============================================================================
// Jobs
// ============================================================================

/// A unit of work accepted by the pool.
///
/// Exactly one of `run` or `discard` is called for every accepted job.
pub trait Job: Send + 'static {
    /// Run on a worker thread.
    fn run(self: Box<Self>, token: &CancellationToken);

    /// The job will never run: it was evicted or the pool shut down first.
    ///
    /// Called on whichever thread resolved the job.
    fn discard(self: Box<Self>, reason: CancelReason);
}

struct FnJob<F>(F);

impl<F> Job for FnJob<F>
where
    F: FnOnce(&CancellationToken) + Send + 'static,
{
    fn run(self: Box<Self>, token: &CancellationToken) {
        (self.0)(token)
    }

    fn discard(self: Box<Self>, reason: CancelReason) {
        tracing::debug!(target: targets::POOL, %reason, "closure job discarded");
    }
}

/// Handle to an accepted job.
#[derive(Debug, Clone)]
pub struct JobHandle {
    id: u64,
    token: CancellationToken,
}

impl JobHandle {
    /// Unique job ID.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Request cancellation. A job that has not started yet still runs, but
    /// sees a cancelled token.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// The job's cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

struct QueuedJob {
    id: u64,
    token: CancellationToken,
    job: Box<dyn Job>,
}

// ============================================================================
// Pool
// ============================================================================

struct PoolState {
    queue: VecDeque<QueuedJob>,
    threads: usize,
    /// Spawned threads that have not yet looked at the queue.
    starting: usize,
    idle: usize,
    running: HashMap<u64, CancellationToken>,
    shutdown: bool,
}

impl PoolState {
    fn reserve_thread(&mut self) {
        self.threads += 1;
        self.starting += 1;
    }

    fn release_thread(&mut self) {
        self.threads -= 1;
        self.starting -= 1;
    }
}

struct Shared {
    config: PoolConfig,
    state: Mutex<PoolState>,
    /// Signalled when work arrives or the pool shuts down.
    available: Condvar,
    /// Signalled when a worker thread exits.
    exited: Condvar,
    next_thread: AtomicU64,
}

/// A bounded pool of worker threads. See the [module docs](self).
pub struct WorkerPool {
    shared: Arc<Shared>,
}

impl WorkerPool {
    /// The process-wide pool, created with default configuration on first use.
    pub fn global() -> Arc<WorkerPool> {
        GLOBAL_POOL
            .get_or_init(|| Arc::new(WorkerPool::from_config(PoolConfig::default())))
            .clone()
    }

    /// Initialize the global pool with a custom configuration.
    ///
    /// Must be called before the first use of [`global`](Self::global).
    pub fn init_global(config: PoolConfig) -> Result<Arc<WorkerPool>, PoolError> {
        let pool = Arc::new(WorkerPool::new(config)?);
        GLOBAL_POOL
            .set(pool.clone())
            .map_err(|_| PoolError::GlobalAlreadyInitialized)?;
        Ok(pool)
    }

    /// Create a pool and start its core threads.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let pool = Self::from_config(config);
        let core = pool.shared.config.core_threads;
        for _ in 0..core {
            pool.shared.state.lock().reserve_thread();
            if let Err(err) = spawn_worker(&pool.shared) {
                pool.shared.state.lock().release_thread();
                pool.shutdown_now();
                return Err(err);
            }
        }
        Ok(pool)
    }

    /// Create a pool whose threads start lazily on first submission.
    fn from_config(config: PoolConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config: config.normalized(),
                state: Mutex::new(PoolState {
                    queue: VecDeque::new(),
                    threads: 0,
                    starting: 0,
                    idle: 0,
                    running: HashMap::new(),
                    shutdown: false,
                }),
                available: Condvar::new(),
                exited: Condvar::new(),
                next_thread: AtomicU64::new(0),
            }),
        }
    }

    /// The effective configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.shared.config
    }

    /// Submit a job.
    ///
    /// If the pool has shut down, the job is discarded with
    /// [`CancelReason::Shutdown`] and `Err(PoolError::ShutDown)` is returned.
    pub fn submit(&self, job: Box<dyn Job>) -> Result<JobHandle, PoolError> {
        let id = NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();

        let mut state = self.shared.state.lock();
        if state.shutdown {
            drop(state);
            tracing::debug!(target: targets::POOL, job_id = id, "submission after shutdown");
            job.discard(CancelReason::Shutdown);
            return Err(PoolError::ShutDown);
        }

        state.queue.push_back(QueuedJob {
            id,
            token: token.clone(),
            job,
        });

        let unclaimed = state
            .queue
            .len()
            .saturating_sub(state.idle + state.starting);
        let mut spawn = false;
        let mut evicted = None;
        if state.idle > 0 {
            self.shared.available.notify_one();
        }
        if unclaimed > 0 {
            if state.threads < self.shared.config.max_threads {
                state.reserve_thread();
                spawn = true;
            } else if unclaimed > self.shared.config.queue_capacity {
                evicted = state.queue.pop_front();
            }
        }
        drop(state);

        if let Some(old) = evicted {
            tracing::debug!(target: targets::POOL, evicted = old.id, by = id, "pool saturated, dropping oldest pending job");
            old.token.cancel_with(CancelReason::Evicted);
            old.job.discard(CancelReason::Evicted);
        }

        if spawn && let Err(err) = spawn_worker(&self.shared) {
            tracing::error!(target: targets::POOL, error = %err, "failed to grow worker pool");
            let mut state = self.shared.state.lock();
            state.release_thread();
            if state.threads == 0 {
                let orphaned: Vec<QueuedJob> = state.queue.drain(..).collect();
                drop(state);
                for queued in orphaned {
                    queued.job.discard(CancelReason::Shutdown);
                }
                return Err(err);
            }
        }

        tracing::trace!(target: targets::POOL, job_id = id, "job submitted");
        Ok(JobHandle { id, token })
    }

    /// Submit a closure that receives the job's cancellation token.
    pub fn execute<F>(&self, f: F) -> Result<JobHandle, PoolError>
    where
        F: FnOnce(&CancellationToken) + Send + 'static,
    {
        self.submit(Box::new(FnJob(f)))
    }

    /// Live worker threads.
    pub fn thread_count(&self) -> usize {
        self.shared.state.lock().threads
    }

    /// Worker threads waiting for work.
    pub fn idle_count(&self) -> usize {
        self.shared.state.lock().idle
    }

    /// Jobs waiting for a thread.
    pub fn pending_count(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    /// Jobs currently running.
    pub fn active_count(&self) -> usize {
        self.shared.state.lock().running.len()
    }

    /// Whether shutdown has begun.
    pub fn is_shut_down(&self) -> bool {
        self.shared.state.lock().shutdown
    }

    /// Shut down gracefully.
    ///
    /// Stops accepting work, discards pending jobs, cancels in-flight jobs,
    /// then waits up to `shutdown_timeout` for worker threads to exit.
    /// Returns `true` if every worker exited in time.
    pub fn shutdown(&self) -> bool {
        self.shutdown_now();

        let deadline = Instant::now() + self.shared.config.shutdown_timeout_duration();
        let mut state = self.shared.state.lock();
        while state.threads > 0 {
            if self
                .shared
                .exited
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                break;
            }
        }
        let remaining = state.threads;
        drop(state);

        if remaining > 0 {
            tracing::warn!(target: targets::POOL, remaining, "worker threads still running after shutdown timeout");
            false
        } else {
            tracing::debug!(target: targets::POOL, "worker pool shut down");
            true
        }
    }

    /// Begin shutdown without waiting for workers.
    fn shutdown_now(&self) {
        let (pending, running) = {
            let mut state = self.shared.state.lock();
            if state.shutdown {
                return;
            }
            state.shutdown = true;
            let pending: Vec<QueuedJob> = state.queue.drain(..).collect();
            let running: Vec<CancellationToken> = state.running.values().cloned().collect();
            (pending, running)
        };
        self.shared.available.notify_all();

        tracing::debug!(
            target: targets::POOL,
            pending = pending.len(),
            running = running.len(),
            "shutting down worker pool"
        );
        for token in running {
            token.cancel_with(CancelReason::Shutdown);
        }
        for queued in pending {
            queued.token.cancel_with(CancelReason::Shutdown);
            queued.job.discard(CancelReason::Shutdown);
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown_now();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("WorkerPool")
            .field("threads", &state.threads)
            .field("idle", &state.idle)
            .field("pending", &state.queue.len())
            .field("running", &state.running.len())
            .field("shutdown", &state.shutdown)
            .finish()
    }
}

static_assertions::assert_impl_all!(WorkerPool: Send, Sync);
static_assertions::assert_impl_all!(CancellationToken: Send, Sync);

/// Start one worker thread. The caller has already counted it in `threads`.
fn spawn_worker(shared: &Arc<Shared>) -> Result<(), PoolError> {
    let index = shared.next_thread.fetch_add(1, Ordering::Relaxed);
    let mut builder =
        thread::Builder::new().name(format!("{}-{}", shared.config.thread_name, index));
    if let Some(stack_size) = shared.config.stack_size {
        builder = builder.stack_size(stack_size);
    }
    let thread_shared = shared.clone();
    builder.spawn(move || worker_loop(thread_shared))?;
    Ok(())
}

fn worker_loop(shared: Arc<Shared>) {
    let keep_alive = shared.config.keep_alive_duration();
    tracing::trace!(target: targets::POOL, "worker started");
    let mut first_pass = true;

    loop {
        let mut state = shared.state.lock();
        if first_pass {
            state.starting -= 1;
            first_pass = false;
        }
        let next = loop {
            if let Some(job) = state.queue.pop_front() {
                break Some(job);
            }
            if state.shutdown {
                break None;
            }
            state.idle += 1;
            let timed_out = if state.threads > shared.config.core_threads {
                shared.available.wait_for(&mut state, keep_alive).timed_out()
            } else {
                shared.available.wait(&mut state);
                false
            };
            state.idle -= 1;
            if timed_out && state.queue.is_empty() && state.threads > shared.config.core_threads {
                break None;
            }
        };

        let Some(QueuedJob { id, token, job }) = next else {
            state.threads -= 1;
            drop(state);
            shared.exited.notify_all();
            tracing::trace!(target: targets::POOL, "worker exiting");
            return;
        };

        state.running.insert(id, token.clone());
        drop(state);

        if catch_unwind(AssertUnwindSafe(|| job.run(&token))).is_err() {
            tracing::error!(target: targets::POOL, job_id = id, "job panicked on worker thread");
        }

        shared.state.lock().running.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;

    struct Probe {
        ran: Arc<AtomicUsize>,
        discarded: Arc<Mutex<Vec<CancelReason>>>,
        gate: Option<mpsc::Receiver<()>>,
    }

    impl Job for Probe {
        fn run(self: Box<Self>, token: &CancellationToken) {
            if let Some(gate) = &self.gate {
                while gate.recv_timeout(Duration::from_millis(5)).is_err() {
                    if token.is_cancelled() {
                        break;
                    }
                }
            }
            self.ran.fetch_add(1, Ordering::SeqCst);
        }

        fn discard(self: Box<Self>, reason: CancelReason) {
            self.discarded.lock().push(reason);
        }
    }

    fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        false
    }

    #[test]
    fn test_token_first_reason_wins() {
        let token = CancellationToken::new();
        assert!(token.check().is_ok());

        token.cancel_with(CancelReason::Shutdown);
        token.cancel();

        assert!(token.is_cancelled());
        assert_eq!(token.reason(), Some(CancelReason::Shutdown));
        assert_eq!(token.check(), Err(Cancelled::new(CancelReason::Shutdown)));
    }

    #[test]
    fn test_token_sleep_is_interrupted() {
        let token = CancellationToken::new();
        let remote = token.clone();
        let started = Instant::now();

        let sleeper = thread::spawn(move || remote.sleep(Duration::from_secs(30)));
        thread::sleep(Duration::from_millis(20));
        token.cancel();

        let result = sleeper.join().unwrap();
        assert_eq!(result, Err(Cancelled::new(CancelReason::Requested)));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_token_sleep_completes() {
        let token = CancellationToken::new();
        assert!(token.sleep(Duration::from_millis(5)).is_ok());
    }

    #[test]
    fn test_config_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.core_threads, 1);
        assert_eq!(config.max_threads, 10);
        assert_eq!(config.keep_alive_duration(), Duration::from_secs(30));
        assert_eq!(config.queue_capacity, 1);
    }

    #[test]
    fn test_config_normalized() {
        let config = PoolConfig::default().threads(4, 2).queue_capacity(0).normalized();
        assert_eq!(config.core_threads, 2);
        assert_eq!(config.max_threads, 2);
        assert_eq!(config.queue_capacity, 1);
    }

    #[test]
    fn test_config_from_toml() {
        let config: PoolConfig = toml::from_str(
            r#"
            max_threads = 4
            thread_name = "loader"
            "#,
        )
        .unwrap();
        assert_eq!(config.core_threads, 1);
        assert_eq!(config.max_threads, 4);
        assert_eq!(config.thread_name, "loader");
    }

    #[test]
    fn test_execute_runs_job() {
        let pool = WorkerPool::new(PoolConfig::with_threads(2)).unwrap();
        let (tx, rx) = mpsc::channel();
        pool.execute(move |_| tx.send(42).unwrap()).unwrap();
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 42);
        assert!(pool.shutdown());
    }

    #[test]
    fn test_grows_to_max_then_evicts_oldest() {
        let pool = WorkerPool::new(PoolConfig::default().threads(1, 1).queue_capacity(1)).unwrap();
        let ran = Arc::new(AtomicUsize::new(0));
        let discarded = Arc::new(Mutex::new(Vec::new()));
        let (release, gate) = mpsc::channel();

        pool.submit(Box::new(Probe {
            ran: ran.clone(),
            discarded: discarded.clone(),
            gate: Some(gate),
        }))
        .unwrap();
        assert!(wait_for(|| pool.active_count() == 1));

        // Fills the single hand-off slot.
        pool.submit(Box::new(Probe {
            ran: ran.clone(),
            discarded: discarded.clone(),
            gate: None,
        }))
        .unwrap();
        // Displaces the waiting submission.
        pool.submit(Box::new(Probe {
            ran: ran.clone(),
            discarded: discarded.clone(),
            gate: None,
        }))
        .unwrap();

        assert_eq!(*discarded.lock(), vec![CancelReason::Evicted]);
        assert_eq!(pool.pending_count(), 1);

        release.send(()).unwrap();
        assert!(wait_for(|| ran.load(Ordering::SeqCst) == 2));
        assert!(pool.shutdown());
    }

    #[test]
    fn test_extra_threads_started_when_busy() {
        let pool = WorkerPool::new(PoolConfig::default().threads(1, 3)).unwrap();
        let ran = Arc::new(AtomicUsize::new(0));
        let discarded = Arc::new(Mutex::new(Vec::new()));
        let mut releases = Vec::new();

        for _ in 0..3 {
            let (release, gate) = mpsc::channel();
            releases.push(release);
            pool.submit(Box::new(Probe {
                ran: ran.clone(),
                discarded: discarded.clone(),
                gate: Some(gate),
            }))
            .unwrap();
        }

        assert!(wait_for(|| pool.active_count() == 3));
        assert_eq!(pool.thread_count(), 3);
        assert!(discarded.lock().is_empty());

        for release in releases {
            release.send(()).unwrap();
        }
        assert!(wait_for(|| ran.load(Ordering::SeqCst) == 3));
        assert!(pool.shutdown());
    }

    #[test]
    fn test_extra_threads_retire_after_keep_alive() {
        let pool = WorkerPool::new(
            PoolConfig::default()
                .threads(1, 2)
                .keep_alive(Duration::from_millis(20)),
        )
        .unwrap();
        let (release, gate) = mpsc::channel();
        let ran = Arc::new(AtomicUsize::new(0));
        let discarded = Arc::new(Mutex::new(Vec::new()));

        pool.submit(Box::new(Probe {
            ran: ran.clone(),
            discarded: discarded.clone(),
            gate: Some(gate),
        }))
        .unwrap();
        assert!(wait_for(|| pool.active_count() == 1));
        pool.execute(|_| {}).unwrap();
        assert_eq!(pool.thread_count(), 2);

        release.send(()).unwrap();
        assert!(wait_for(|| pool.thread_count() == 1));
        assert!(pool.shutdown());
    }

    #[test]
    fn test_shutdown_interrupts_and_discards() {
        let pool = WorkerPool::new(PoolConfig::default().threads(1, 1)).unwrap();
        let (tx, rx) = mpsc::channel();
        let discarded = Arc::new(Mutex::new(Vec::new()));

        pool.execute(move |token| {
            let outcome = token.sleep(Duration::from_secs(60));
            tx.send(outcome).unwrap();
        })
        .unwrap();
        assert!(wait_for(|| pool.active_count() == 1));

        pool.submit(Box::new(Probe {
            ran: Arc::new(AtomicUsize::new(0)),
            discarded: discarded.clone(),
            gate: None,
        }))
        .unwrap();

        assert!(pool.shutdown());
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            Err(Cancelled::new(CancelReason::Shutdown))
        );
        assert_eq!(*discarded.lock(), vec![CancelReason::Shutdown]);
        assert_eq!(pool.thread_count(), 0);
    }

    #[test]
    fn test_submit_after_shutdown_discards() {
        let pool = WorkerPool::new(PoolConfig::default()).unwrap();
        assert!(pool.shutdown());

        let discarded = Arc::new(Mutex::new(Vec::new()));
        let result = pool.submit(Box::new(Probe {
            ran: Arc::new(AtomicUsize::new(0)),
            discarded: discarded.clone(),
            gate: None,
        }));

        assert!(matches!(result, Err(PoolError::ShutDown)));
        assert_eq!(*discarded.lock(), vec![CancelReason::Shutdown]);
    }

    #[test]
    fn test_panicking_job_keeps_worker() {
        let pool = WorkerPool::new(PoolConfig::with_threads(1)).unwrap();
        pool.execute(|_| panic!("boom")).unwrap();

        let (tx, rx) = mpsc::channel();
        pool.execute(move |_| tx.send(()).unwrap()).unwrap();
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        assert_eq!(pool.thread_count(), 1);
        assert!(pool.shutdown());
    }

    #[test]
    fn test_job_handle_cancel() {
        let pool = WorkerPool::new(PoolConfig::with_threads(1)).unwrap();
        let (tx, rx) = mpsc::channel();
        let handle = pool
            .execute(move |token| tx.send(token.sleep(Duration::from_secs(60))).unwrap())
            .unwrap();

        assert!(wait_for(|| pool.active_count() == 1));
        handle.cancel();
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            Err(Cancelled::new(CancelReason::Requested))
        );
        assert!(pool.shutdown());
    }
}
