//! Table models built from declarative column bindings.
//!
//! # Core Types
//!
//! - [`ColumnBinding`]: title, width, alignment, getter and optional setter for one column
//! - [`TabularModel`]: owns the rows and answers shape, value and editability queries
//! - [`CellValue`] / [`ValueKind`]: what getters return and what each column declares
//! - [`TableChange`]: the notification emitted after every mutation
//!
//! Views connect to [`TabularModel::changed`] and re-query the model when it
//! fires. Single-row operations report precise ranges; bulk operations
//! report [`TableChange::DataChanged`].

mod change;
mod column;
mod error;
mod layout;
mod tabular;
mod value;

pub use change::TableChange;
pub use column::{
    Alignment, CellDelegate, CellEditor, CellRenderer, ColumnBinding, Getter, RowEdit, Setter,
};
pub use error::{EditError, ModelError, Result};
pub use layout::distribute_widths;
pub use tabular::TabularModel;
pub use value::{CellValue, ValueKind};
