//! Integration tests for task submission against a live UI queue.

use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use horizon_panels_core::{
    BusyState, CancelReason, EventQueue, PoolConfig, TaskError, TaskRunner, ViewBinder,
    ViewSurface, WorkerPool,
};
use parking_lot::Mutex;

const WAIT: Duration = Duration::from_secs(5);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
struct Surface {
    busy_updates: Mutex<Vec<bool>>,
    errors: Mutex<Vec<String>>,
    rows: Mutex<Vec<String>>,
}

impl Surface {
    fn shows_busy(&self) -> bool {
        self.busy_updates.lock().last().copied().unwrap_or(false)
    }
}

impl ViewSurface for Surface {
    fn set_busy(&self, busy: bool) {
        self.busy_updates.lock().push(busy);
    }

    fn show_error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }
}

struct Harness {
    queue: EventQueue,
    pool: Arc<WorkerPool>,
    surface: Arc<Surface>,
    runner: TaskRunner<Surface>,
}

impl Harness {
    fn new(config: PoolConfig) -> Self {
        init_tracing();
        let queue = EventQueue::new();
        let pool = Arc::new(WorkerPool::new(config).unwrap());
        let surface = Arc::new(Surface::default());
        let binder = ViewBinder::new(queue.dispatcher());
        binder.attach(&surface);
        let runner = TaskRunner::new(pool.clone(), binder);
        Self {
            queue,
            pool,
            surface,
            runner,
        }
    }
}

#[test]
fn test_overlapping_tasks_keep_surface_busy_until_last_finishes() {
    let h = Harness::new(PoolConfig::default().threads(2, 2));
    let (release_first, first_gate) = mpsc::channel::<()>();
    let (release_second, second_gate) = mpsc::channel::<()>();
    let (done_tx, done_rx) = mpsc::channel::<u8>();

    let done = done_tx.clone();
    h.runner
        .submit(move |_| {
            first_gate.recv().map_err(TaskError::from_error)?;
            done.send(1).unwrap();
            Ok(())
        })
        .unwrap();
    let done = done_tx;
    h.runner
        .submit(move |_| {
            second_gate.recv().map_err(TaskError::from_error)?;
            done.send(2).unwrap();
            Ok(())
        })
        .unwrap();

    assert_eq!(h.runner.busy_state().count(), 2);
    h.queue.process_pending();
    assert!(h.surface.shows_busy());

    release_first.send(()).unwrap();
    assert_eq!(done_rx.recv_timeout(WAIT).unwrap(), 1);
    assert!(h.queue.run_until(|| h.runner.busy_state().count() == 1, WAIT));
    h.queue.process_pending();
    assert!(h.runner.busy_state().is_busy());
    assert!(h.surface.shows_busy());

    release_second.send(()).unwrap();
    assert_eq!(done_rx.recv_timeout(WAIT).unwrap(), 2);
    assert!(h.queue.run_until(|| !h.runner.busy_state().is_busy(), WAIT));
    h.queue.process_pending();
    assert!(!h.surface.shows_busy());
    assert!(h.pool.shutdown());
}

#[test]
fn test_failing_task_shows_error_and_restores_counter() {
    let h = Harness::new(PoolConfig::default());
    let before = h.runner.busy_state().count();

    #[derive(Debug, thiserror::Error)]
    #[error("database unreachable")]
    struct Unreachable;

    h.runner
        .submit(|_| Err(TaskError::with_source("could not load rows", Unreachable)))
        .unwrap();

    assert!(h.queue.run_until(|| !h.surface.errors.lock().is_empty(), WAIT));
    assert!(h.queue.run_until(|| h.runner.busy_state().count() == before, WAIT));
    assert_eq!(*h.surface.errors.lock(), vec!["could not load rows"]);
    assert!(h.pool.shutdown());
}

#[test]
fn test_detach_before_completion_drops_dispatched_update() {
    let h = Harness::new(PoolConfig::default());
    let (release, gate) = mpsc::channel::<()>();
    let (finished_tx, finished_rx) = mpsc::channel::<bool>();

    h.runner
        .submit(move |ctx| {
            gate.recv().map_err(TaskError::from_error)?;
            let scheduled = ctx.dispatch(|view| view.rows.lock().push("late".into()));
            finished_tx.send(scheduled).unwrap();
            Ok(())
        })
        .unwrap();

    h.runner.binder().detach();
    release.send(()).unwrap();

    assert!(!finished_rx.recv_timeout(WAIT).unwrap());
    assert!(h.queue.run_until(|| !h.runner.busy_state().is_busy(), WAIT));
    h.queue.process_pending();
    assert!(h.surface.rows.lock().is_empty());
    assert!(h.pool.shutdown());
}

#[test]
fn test_result_is_applied_on_ui_thread() {
    let h = Harness::new(PoolConfig::default());
    let ui_thread = std::thread::current().id();
    let applied_on = Arc::new(Mutex::new(None));

    let slot = applied_on.clone();
    h.runner
        .submit(move |ctx| {
            let rows = vec!["alpha".to_string(), "beta".to_string()];
            ctx.dispatch(move |view| {
                *slot.lock() = Some(std::thread::current().id());
                *view.rows.lock() = rows;
            });
            Ok(())
        })
        .unwrap();

    assert!(h.queue.run_until(|| h.surface.rows.lock().len() == 2, WAIT));
    assert_eq!(*applied_on.lock(), Some(ui_thread));
    assert!(h.pool.shutdown());
}

#[test]
fn test_evicted_task_takes_cancel_path() {
    let h = Harness::new(PoolConfig::default().threads(1, 1).queue_capacity(1));
    let (release, gate) = mpsc::channel::<()>();
    let (started_tx, started_rx) = mpsc::channel::<()>();
    let cancelled = Arc::new(Mutex::new(Vec::new()));

    h.runner
        .submit(move |_| {
            started_tx.send(()).unwrap();
            gate.recv().map_err(TaskError::from_error)?;
            Ok(())
        })
        .unwrap();
    started_rx.recv_timeout(WAIT).unwrap();

    for label in ["stale", "fresh"] {
        let sink = cancelled.clone();
        h.runner
            .submit_with_cancel(|_| Ok(()), move |c| sink.lock().push((label, c.reason)))
            .unwrap();
    }

    assert_eq!(*cancelled.lock(), vec![("stale", CancelReason::Evicted)]);
    assert_eq!(h.runner.busy_state().count(), 2);

    release.send(()).unwrap();
    assert!(h.queue.run_until(|| !h.runner.busy_state().is_busy(), WAIT));
    assert!(h.pool.shutdown());
}

#[test]
fn test_runners_can_share_one_busy_state() {
    init_tracing();
    let queue = EventQueue::new();
    let pool = Arc::new(WorkerPool::new(PoolConfig::default()).unwrap());
    let surface = Arc::new(Surface::default());
    let busy = Arc::new(BusyState::new());

    let binder = ViewBinder::new(queue.dispatcher());
    binder.attach(&surface);
    let loader = TaskRunner::with_busy_state(pool.clone(), binder.clone(), busy.clone());
    let saver = TaskRunner::with_busy_state(pool.clone(), binder, busy.clone());

    let (release, gate) = mpsc::channel::<()>();
    loader
        .submit(move |_| {
            gate.recv().map_err(TaskError::from_error)?;
            Ok(())
        })
        .unwrap();
    saver.submit(|_| Ok(())).unwrap();

    assert!(busy.count() >= 1);
    release.send(()).unwrap();
    assert!(queue.run_until(|| !busy.is_busy(), WAIT));
    queue.process_pending();
    assert!(!surface.shows_busy());
    assert!(pool.shutdown());
}
