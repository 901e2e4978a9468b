//! End-to-end behaviour of tabular models and task-driven panels.

use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use horizon_panels::panel::BoxError;
use horizon_panels::prelude::*;
use parking_lot::Mutex;

const WAIT: Duration = Duration::from_secs(5);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, PartialEq)]
struct Setting {
    name: String,
    value: String,
}

fn setting(name: &str, value: &str) -> Setting {
    Setting {
        name: name.into(),
        value: value.into(),
    }
}

fn settings_model(rows: Vec<Setting>) -> TabularModel<Setting> {
    TabularModel::with_rows(
        vec![
            ColumnBinding::text("Name", |s: &Setting| s.name.clone()),
            ColumnBinding::text("Value", |s: &Setting| s.value.clone()).setter(|s, value| {
                s.value = value
                    .into_text()
                    .ok_or_else(|| EditError::new("value must be text"))?;
                Ok(())
            }),
        ],
        rows,
    )
}

fn record(model: &TabularModel<Setting>) -> Arc<Mutex<Vec<TableChange>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    model.changed().connect(move |change| sink.lock().push(*change));
    log
}

#[test]
fn test_editing_one_cell_leaves_other_rows_alone() {
    let model = settings_model(vec![
        setting("host", "a"),
        setting("port", "b"),
        setting("user", "c"),
    ]);
    let value_column = 1;

    assert_eq!(model.set_value_at(1, value_column, "X"), Ok(true));

    assert_eq!(model.value_at(1, value_column).unwrap().as_text(), Some("X"));
    assert_eq!(model.value_at(0, value_column).unwrap().as_text(), Some("a"));
    assert_eq!(model.value_at(2, value_column).unwrap().as_text(), Some("c"));
}

#[test]
fn test_bulk_removal_emits_single_data_changed() {
    let rows = (0..100).map(|i| setting(&format!("key{i}"), &i.to_string())).collect();
    let model = settings_model(rows);
    let log = record(&model);

    let removed = model.remove_where(|s| s.value.parse::<u32>().is_ok_and(|n| n % 10 == 0));

    assert_eq!(removed, 10);
    assert_eq!(model.row_count(), 90);
    assert_eq!(*log.lock(), vec![TableChange::DataChanged]);
}

#[test]
fn test_add_then_remove_last_restores_table() {
    let model = settings_model(vec![setting("a", "1"), setting("b", "2")]);
    let before: Vec<Setting> = model.rows().clone();

    let index = model.add_row(setting("tmp", "x"));
    assert_eq!(index, model.row_count() - 1);
    let removed = model.remove_row(index).unwrap();

    assert_eq!(removed, setting("tmp", "x"));
    assert_eq!(*model.rows(), before);
}

#[test]
fn test_getter_is_stable_between_notifications() {
    let model = settings_model(vec![setting("a", "1"), setting("b", "2")]);
    for row in 0..model.row_count() {
        for column in 0..model.column_count() {
            assert_eq!(model.value_at(row, column), model.value_at(row, column));
        }
    }
}

#[test]
fn test_editability_matches_editor_presence() {
    let model = settings_model(vec![setting("a", "1")]);
    for column in 0..model.column_count() {
        assert_eq!(
            model.is_editable(0, column).unwrap(),
            model.editor(column).unwrap().is_some()
        );
    }
}

// ----------------------------------------------------------------------------
// Panels backed by background tasks
// ----------------------------------------------------------------------------

/// Rows come from a channel so the test decides when a load completes.
type Source = Arc<Mutex<mpsc::Receiver<Vec<Setting>>>>;

struct SettingsView {
    model: TabularModel<Setting>,
    busy: Mutex<Vec<bool>>,
    errors: Mutex<Vec<String>>,
}

impl ViewSurface for SettingsView {
    fn set_busy(&self, busy: bool) {
        self.busy.lock().push(busy);
    }

    fn show_error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }
}

struct SettingsPanel {
    view: Arc<SettingsView>,
    runner: TaskRunner<SettingsView>,
    source: Source,
}

impl Panel for SettingsPanel {
    fn init_view(&mut self, _ctx: &PanelContext, _item: &MenuItem) -> Result<(), BoxError> {
        self.runner.binder().attach(&self.view);
        Ok(())
    }

    fn init_data(&mut self, _ctx: &PanelContext, _item: &MenuItem) -> Result<(), BoxError> {
        let source = self.source.clone();
        self.runner.submit(move |ctx| {
            let rows = source
                .lock()
                .recv_timeout(WAIT)
                .map_err(|err| TaskError::with_source("could not load settings", err))?;
            ctx.check_cancelled()?;
            ctx.dispatch(move |view| view.model.replace_all(rows));
            Ok(())
        });
        Ok(())
    }

    fn detach(&mut self) {
        self.runner.binder().detach();
    }
}

struct Blank;

impl Panel for Blank {
    fn detach(&mut self) {}
}

struct App {
    queue: EventQueue,
    pool: Arc<WorkerPool>,
    host: PanelHost,
    views: Arc<Mutex<Vec<Arc<SettingsView>>>>,
    feed: mpsc::Sender<Vec<Setting>>,
}

fn app() -> App {
    init_tracing();
    let queue = EventQueue::new();
    let pool = Arc::new(WorkerPool::new(PoolConfig::default().threads(1, 2)).unwrap());
    let ctx = PanelContext::new(Theme::default(), pool.clone(), queue.dispatcher());

    let (feed, rx) = mpsc::channel();
    let source: Source = Arc::new(Mutex::new(rx));
    let views = Arc::new(Mutex::new(Vec::new()));

    let mut registry = PanelRegistry::new();
    let created = views.clone();
    registry
        .register("settings", move |ctx: &PanelContext, _item: &MenuItem| {
            let view = Arc::new(SettingsView {
                model: settings_model(Vec::new()),
                busy: Mutex::new(Vec::new()),
                errors: Mutex::new(Vec::new()),
            });
            created.lock().push(view.clone());
            Ok(Box::new(SettingsPanel {
                runner: ctx.runner(ctx.binder()),
                view,
                source: source.clone(),
            }) as Box<dyn Panel>)
        })
        .unwrap();
    registry
        .register("blank", |_: &PanelContext, _: &MenuItem| {
            Ok(Box::new(Blank) as Box<dyn Panel>)
        })
        .unwrap();

    let mut settings = UiSettings::default();
    settings.menu.items = vec![
        MenuItem::new("Settings", "settings"),
        MenuItem::new("Blank", "blank"),
    ];

    let host = PanelHost::new(registry, ctx, &settings);
    App {
        queue,
        pool,
        host,
        views,
        feed,
    }
}

#[test]
fn test_panel_loads_rows_through_task_runner() {
    let mut app = app();
    app.host.switch_to_default().unwrap();
    let view = app.views.lock()[0].clone();

    app.feed
        .send(vec![setting("host", "db1"), setting("port", "5432")])
        .unwrap();

    assert!(app.queue.run_until(|| view.model.row_count() == 2, WAIT));
    assert_eq!(view.model.value_at(0, 1).unwrap().as_text(), Some("db1"));
    assert!(app.queue.run_until(|| view.busy.lock().last() == Some(&false), WAIT));
    assert!(view.errors.lock().is_empty());
    assert!(app.pool.shutdown());
}

#[test]
fn test_switching_away_drops_late_results() {
    let mut app = app();
    app.host.switch_to("settings").unwrap();
    let view = app.views.lock()[0].clone();

    app.host.switch_to("blank").unwrap();
    app.feed.send(vec![setting("late", "1")]).unwrap();

    assert!(app.pool.shutdown());
    app.queue.process_pending();
    assert_eq!(view.model.row_count(), 0);
    assert_eq!(app.host.active_key(), Some("blank"));
}
