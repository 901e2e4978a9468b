//! Prelude module for Horizon Panels.
//!
//! ```
//! use horizon_panels::prelude::*;
//! ```
//!
//! This provides access to:
//! - Tabular models (`TabularModel`, `ColumnBinding`, `CellValue`)
//! - Panels and settings (`Panel`, `PanelHost`, `PanelRegistry`, `UiSettings`)
//! - Background tasks (`TaskRunner`, `ViewBinder`, `BusyState`, `WorkerPool`)

// ============================================================================
// Tabular Models
// ============================================================================

pub use crate::model::{
    Alignment, CellDelegate, CellValue, ColumnBinding, EditError, ModelError, RowEdit,
    TableChange, TabularModel, ValueKind,
};

// ============================================================================
// Panels, Settings and Theme
// ============================================================================

pub use crate::panel::{
    MenuItem, Panel, PanelContext, PanelError, PanelHost, PanelRegistry, UiConfig, UiSettings,
};
pub use crate::theme::{Color, Theme};

// ============================================================================
// Tasks and Threading
// ============================================================================

pub use horizon_panels_core::{
    BusyState, CancelReason, Cancelled, CancellationToken, EventQueue, PoolConfig, Signal,
    TaskContext, TaskError, TaskRunner, ViewBinder, ViewSurface, WorkerPool,
};
