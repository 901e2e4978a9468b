//! Menu-driven panels.
//!
//! An application registers one factory per panel key in a
//! [`PanelRegistry`], describes its menu in [`UiSettings`], and lets a
//! [`PanelHost`] build and swap panels as menu items are chosen.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use horizon_panels::panel::{
//!     BoxError, MenuItem, Panel, PanelContext, PanelHost, PanelRegistry, UiSettings,
//! };
//! use horizon_panels::Theme;
//! use horizon_panels_core::{EventQueue, PoolConfig, WorkerPool};
//!
//! struct Welcome {
//!     greeting: String,
//! }
//!
//! impl Panel for Welcome {
//!     fn init_data(&mut self, _ctx: &PanelContext, item: &MenuItem) -> Result<(), BoxError> {
//!         self.greeting = item.param::<String>("greeting").unwrap_or_default();
//!         Ok(())
//!     }
//!
//!     fn detach(&mut self) {}
//! }
//!
//! let mut registry = PanelRegistry::new();
//! registry
//!     .register("welcome", |_ctx, _item| {
//!         Ok(Box::new(Welcome { greeting: String::new() }) as Box<dyn Panel>)
//!     })
//!     .unwrap();
//!
//! let mut settings = UiSettings::default();
//! settings
//!     .menu
//!     .items
//!     .push(MenuItem::new("Welcome", "welcome").with_param("greeting", "hello"));
//!
//! let queue = EventQueue::new();
//! let pool = Arc::new(WorkerPool::new(PoolConfig::default()).unwrap());
//! let ctx = PanelContext::new(Theme::default(), pool.clone(), queue.dispatcher());
//!
//! let mut host = PanelHost::new(registry, ctx, &settings);
//! host.switch_to_default().unwrap();
//! assert_eq!(host.active_key(), Some("welcome"));
//! pool.shutdown();
//! ```

mod host;
mod registry;
mod settings;

use std::sync::Arc;

use horizon_panels_core::{Dispatcher, TaskRunner, ViewBinder, ViewSurface, WorkerPool};

use crate::theme::Theme;

pub use host::PanelHost;
pub use registry::{PanelFactory, PanelRegistry};
pub use settings::{FontConfig, MenuConfig, MenuItem, UiConfig, UiSettings};

/// Boxed error returned by panel lifecycle hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while building or switching panels.
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    /// No factory is registered under this key.
    #[error("no panel registered for key '{0}'")]
    UnknownPanel(String),

    /// A factory is already registered under this key.
    #[error("a panel is already registered for key '{0}'")]
    DuplicatePanel(String),

    /// The menu has no item with this key.
    #[error("menu has no item '{0}'")]
    UnknownMenuItem(String),

    /// The menu has no items at all.
    #[error("menu is empty")]
    EmptyMenu,

    /// A panel's `init_view` or `init_data` failed.
    #[error("failed to initialize panel '{key}': {source}")]
    Init {
        key: String,
        #[source]
        source: BoxError,
    },
}

/// What every panel receives from its host.
#[derive(Clone)]
pub struct PanelContext {
    theme: Theme,
    pool: Arc<WorkerPool>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl PanelContext {
    pub fn new(theme: Theme, pool: Arc<WorkerPool>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            theme,
            pool,
            dispatcher,
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// The UI thread's dispatcher.
    pub fn dispatcher(&self) -> &Arc<dyn Dispatcher> {
        &self.dispatcher
    }

    /// A new, detached binder that dispatches to the UI thread.
    pub fn binder<V: ?Sized + Send + Sync + 'static>(&self) -> ViewBinder<V> {
        ViewBinder::new(self.dispatcher.clone())
    }

    /// A task runner for `binder` on the shared pool.
    pub fn runner<V: ?Sized + ViewSurface + 'static>(&self, binder: ViewBinder<V>) -> TaskRunner<V> {
        TaskRunner::new(self.pool.clone(), binder)
    }
}

impl std::fmt::Debug for PanelContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelContext")
            .field("theme", &self.theme)
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

/// A screen shown in the host's content area.
///
/// The host calls `init_view` then `init_data` right after the factory
/// builds the panel, and `mounted` once it is on screen. `detach` is called
/// when the panel is replaced; implementations release their controller's
/// view binding there so late task results are dropped.
pub trait Panel {
    /// Build the panel's widgets.
    fn init_view(&mut self, _ctx: &PanelContext, _item: &MenuItem) -> Result<(), BoxError> {
        Ok(())
    }

    /// Wire events and start loading data.
    fn init_data(&mut self, _ctx: &PanelContext, _item: &MenuItem) -> Result<(), BoxError> {
        Ok(())
    }

    /// The panel became visible.
    fn mounted(&mut self) {}

    /// The panel is being removed.
    fn detach(&mut self);
}
