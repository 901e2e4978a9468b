//! Horizon Panels: menu-driven desktop panels over a small concurrency core.
//!
//! This crate provides the pieces an application assembles its screens from:
//!
//! - **Tabular models**: [`model::TabularModel`] over declarative [`model::ColumnBinding`]s
//! - **Panels**: a key-to-factory [`panel::PanelRegistry`] and a [`panel::PanelHost`]
//!   that swaps panels as menu items are chosen
//! - **Settings and theme**: [`panel::UiSettings`] and [`Theme`], deserializable
//!   from whatever configuration format the host uses
//!
//! Background work, busy indicators and view binding come from
//! [`horizon_panels_core`], whose public items are re-exported at the root.
//!
//! # Quick Start
//!
//! ```
//! use horizon_panels::prelude::*;
//!
//! struct Job {
//!     name: String,
//!     retries: i64,
//! }
//!
//! let model = TabularModel::with_rows(
//!     vec![
//!         ColumnBinding::text("Job", |j: &Job| j.name.clone()).align_start(),
//!         ColumnBinding::number("Retries", |j: &Job| j.retries).setter(|j, value| {
//!             j.retries = value.as_int().ok_or_else(|| EditError::new("not a number"))?;
//!             Ok(())
//!         }),
//!     ],
//!     vec![Job { name: "backup".into(), retries: 0 }],
//! );
//!
//! model.commit_edit(0, 1, "3").unwrap();
//! assert_eq!(model.value_at(0, 1).unwrap(), CellValue::Int(3));
//! ```

pub mod model;
pub mod panel;
pub mod prelude;
pub mod theme;

pub use horizon_panels_core::*;
pub use theme::{Color, Theme, ThemeError};

/// Log targets used by this crate.
pub(crate) mod targets {
    pub const MODEL: &str = "horizon_panels::model";
    pub const PANEL: &str = "horizon_panels::panel";
}
