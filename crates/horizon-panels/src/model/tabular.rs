//! Generic row-per-item table model.

use std::cell::Cell;

use horizon_panels_core::{Signal, ThreadAffinity};
use parking_lot::RwLock;

use super::change::TableChange;
use super::column::{Alignment, CellEditor, CellRenderer, ColumnBinding, RowEdit};
use super::error::{ModelError, Result};
use super::layout::distribute_widths;
use super::value::{CellValue, ValueKind};
use crate::targets;

/// A table over a `Vec<T>` whose columns are described by [`ColumnBinding`]s.
///
/// The model owns its rows. Every mutating call emits exactly one
/// [`TableChange`] on [`changed`](Self::changed) after the rows have been
/// updated and the internal lock released, so a listener may read the model
/// from inside its slot.
///
/// Rows are meant to be mutated from the thread that created the model
/// (normally the UI thread); debug builds assert this. Background tasks
/// should hand their results to the UI thread and apply them there.
///
/// # Example
///
/// ```
/// use horizon_panels::model::{ColumnBinding, TableChange, TabularModel};
///
/// struct Service {
///     name: String,
///     healthy: bool,
/// }
///
/// let model = TabularModel::new(vec![
///     ColumnBinding::text("Service", |s: &Service| s.name.clone()),
///     ColumnBinding::boolean("Healthy", |s: &Service| s.healthy),
/// ]);
///
/// model.changed().connect(|change| {
///     assert_eq!(*change, TableChange::RowsInserted { first: 0, last: 0 });
/// });
/// model.add_row(Service { name: "api".into(), healthy: true });
///
/// assert_eq!(model.row_count(), 1);
/// assert_eq!(model.value_at(0, 0).unwrap().as_text(), Some("api"));
/// ```
pub struct TabularModel<T> {
    rows: RwLock<Vec<T>>,
    columns: Vec<ColumnBinding<T>>,
    changed: Signal<TableChange>,
    affinity: ThreadAffinity,
}

impl<T: Send + Sync + 'static> TabularModel<T> {
    /// Create an empty model.
    pub fn new(columns: Vec<ColumnBinding<T>>) -> Self {
        Self::with_rows(columns, Vec::new())
    }

    /// Create a model with initial rows. No notification is emitted.
    pub fn with_rows(columns: Vec<ColumnBinding<T>>, rows: Vec<T>) -> Self {
        Self {
            rows: RwLock::new(rows),
            columns,
            changed: Signal::new(),
            affinity: ThreadAffinity::current(),
        }
    }

    /// Change notifications.
    pub fn changed(&self) -> &Signal<TableChange> {
        &self.changed
    }

    pub fn row_count(&self) -> usize {
        self.rows.read().len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    pub fn columns(&self) -> &[ColumnBinding<T>] {
        &self.columns
    }

    /// The binding for `column`.
    pub fn column(&self, column: usize) -> Result<&ColumnBinding<T>> {
        self.columns.get(column).ok_or(ModelError::ColumnOutOfRange {
            column,
            column_count: self.columns.len(),
        })
    }

    pub fn column_title(&self, column: usize) -> Result<&str> {
        Ok(self.column(column)?.title())
    }

    pub fn column_kind(&self, column: usize) -> Result<ValueKind> {
        Ok(self.column(column)?.kind())
    }

    pub fn column_alignment(&self, column: usize) -> Result<Alignment> {
        Ok(self.column(column)?.alignment())
    }

    pub fn column_width(&self, column: usize) -> Result<Option<u32>> {
        Ok(self.column(column)?.fixed_width())
    }

    /// Whether `(row, column)` accepts edits.
    ///
    /// Editability is a property of the column; the row index is still
    /// validated.
    pub fn is_editable(&self, row: usize, column: usize) -> Result<bool> {
        let binding = self.column(column)?;
        self.check_row(row)?;
        Ok(binding.is_editable())
    }

    /// Read a cell through its column's getter.
    pub fn value_at(&self, row: usize, column: usize) -> Result<CellValue> {
        let binding = self.column(column)?;
        let rows = self.rows.read();
        let item = rows.get(row).ok_or(ModelError::RowOutOfRange {
            row,
            row_count: rows.len(),
        })?;
        Ok(binding.value(item, row))
    }

    /// The cell as display text, formatted by the column's renderer.
    pub fn display_text(&self, row: usize, column: usize) -> Result<String> {
        let value = self.value_at(row, column)?;
        Ok(self.renderer(column)?.format(&value, row, column))
    }

    /// Write a cell through its column's setter.
    ///
    /// Returns `Ok(false)` without touching anything when the column has no
    /// setter. Otherwise the setter runs and one notification follows: a
    /// cell update, or [`TableChange::DataChanged`] if the setter went through
    /// [`RowEdit::rows`], [`RowEdit::replace`] or [`RowEdit::remove`]. A setter error is returned after that notification,
    /// since the setter may have modified the row before failing.
    pub fn set_value_at(
        &self,
        row: usize,
        column: usize,
        value: impl Into<CellValue>,
    ) -> Result<bool> {
        let binding = self.column(column)?;
        let Some(setter) = binding.setter_fn() else {
            self.check_row(row)?;
            tracing::trace!(target: targets::MODEL, row, column, "edit ignored, column is read-only");
            return Ok(false);
        };
        self.affinity.debug_assert_same_thread();

        let restructured = Cell::new(false);
        let (outcome, shape_changed) = {
            let mut rows = self.rows.write();
            let row_count = rows.len();
            if row >= row_count {
                return Err(ModelError::RowOutOfRange { row, row_count });
            }
            let edit = RowEdit::new(&mut rows, row, column, &restructured);
            let outcome = setter(edit, value.into());
            (outcome, restructured.get() || rows.len() != row_count)
        };

        if shape_changed {
            self.changed.emit(TableChange::DataChanged);
        } else {
            self.changed.emit(TableChange::cell(row, column));
        }
        outcome
            .map(|()| true)
            .map_err(|source| ModelError::edit(row, column, source))
    }

    /// Parse `input` with the column's editor, then apply it.
    ///
    /// Returns `Ok(false)` for read-only columns.
    pub fn commit_edit(&self, row: usize, column: usize, input: &str) -> Result<bool> {
        let editor = self.editor(column)?;
        self.check_row(row)?;
        let Some(editor) = editor else {
            return Ok(false);
        };
        let value = editor
            .parse(input, row, column)
            .map_err(|source| ModelError::edit(row, column, source))?;
        self.set_value_at(row, column, value)
    }

    /// Append a row and return its index.
    pub fn add_row(&self, item: T) -> usize {
        self.affinity.debug_assert_same_thread();
        let index = {
            let mut rows = self.rows.write();
            rows.push(item);
            rows.len() - 1
        };
        self.changed.emit(TableChange::RowsInserted {
            first: index,
            last: index,
        });
        index
    }

    /// Insert a row at `index`. `index == row_count()` appends.
    pub fn insert_row(&self, index: usize, item: T) -> Result<()> {
        self.affinity.debug_assert_same_thread();
        {
            let mut rows = self.rows.write();
            if index > rows.len() {
                return Err(ModelError::RowOutOfRange {
                    row: index,
                    row_count: rows.len(),
                });
            }
            rows.insert(index, item);
        }
        self.changed.emit(TableChange::RowsInserted {
            first: index,
            last: index,
        });
        Ok(())
    }

    /// Remove and return the row at `index`.
    pub fn remove_row(&self, index: usize) -> Result<T> {
        self.affinity.debug_assert_same_thread();
        let removed = {
            let mut rows = self.rows.write();
            if index >= rows.len() {
                return Err(ModelError::RowOutOfRange {
                    row: index,
                    row_count: rows.len(),
                });
            }
            rows.remove(index)
        };
        self.changed.emit(TableChange::RowsRemoved {
            first: index,
            last: index,
        });
        Ok(removed)
    }

    /// Remove every row matching `predicate`, returning how many went.
    ///
    /// Emits a single [`TableChange::DataChanged`] however many rows were
    /// removed.
    pub fn remove_where<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        self.affinity.debug_assert_same_thread();
        let removed = {
            let mut rows = self.rows.write();
            let before = rows.len();
            rows.retain(|item| !predicate(item));
            before - rows.len()
        };
        tracing::debug!(target: targets::MODEL, removed, "bulk removal");
        self.changed.emit(TableChange::DataChanged);
        removed
    }

    /// Replace every row.
    pub fn replace_all<I>(&self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.affinity.debug_assert_same_thread();
        *self.rows.write() = items.into_iter().collect();
        self.changed.emit(TableChange::DataChanged);
    }

    /// Append many rows with one notification.
    pub fn extend_rows<I>(&self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.affinity.debug_assert_same_thread();
        self.rows.write().extend(items);
        self.changed.emit(TableChange::DataChanged);
    }

    pub fn clear(&self) {
        self.affinity.debug_assert_same_thread();
        self.rows.write().clear();
        self.changed.emit(TableChange::DataChanged);
    }

    /// Read access to all rows.
    ///
    /// The model is locked for reading while the guard lives; drop it before
    /// mutating.
    pub fn rows(&self) -> impl std::ops::Deref<Target = Vec<T>> + '_ {
        self.rows.read()
    }

    /// Run `f` against one row.
    pub fn with_row<F, R>(&self, row: usize, f: F) -> Result<R>
    where
        F: FnOnce(&T) -> R,
    {
        let rows = self.rows.read();
        let item = rows.get(row).ok_or(ModelError::RowOutOfRange {
            row,
            row_count: rows.len(),
        })?;
        Ok(f(item))
    }

    /// Mutate one row in place; reports every column of the row as updated.
    pub fn modify_row<F, R>(&self, row: usize, f: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        self.affinity.debug_assert_same_thread();
        let result = {
            let mut rows = self.rows.write();
            let row_count = rows.len();
            let item = rows
                .get_mut(row)
                .ok_or(ModelError::RowOutOfRange { row, row_count })?;
            f(item)
        };
        self.changed.emit(TableChange::CellsUpdated {
            row,
            first_column: 0,
            last_column: self.columns.len().saturating_sub(1),
        });
        Ok(result)
    }

    pub fn renderer(&self, column: usize) -> Result<CellRenderer> {
        Ok(self.column(column)?.renderer())
    }

    /// The column's editor, `None` for read-only columns.
    pub fn editor(&self, column: usize) -> Result<Option<CellEditor>> {
        Ok(self.column(column)?.editor())
    }

    /// Resolved pixel widths for all columns given the table's width.
    pub fn column_widths(&self, total: u32) -> Vec<u32> {
        let widths: Vec<Option<u32>> = self.columns.iter().map(|c| c.fixed_width()).collect();
        distribute_widths(&widths, total)
    }

    fn check_row(&self, row: usize) -> Result<()> {
        let row_count = self.rows.read().len();
        if row < row_count {
            Ok(())
        } else {
            Err(ModelError::RowOutOfRange { row, row_count })
        }
    }
}

impl<T> std::fmt::Debug for TabularModel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabularModel")
            .field("rows", &self.rows.read().len())
            .field("columns", &self.columns)
            .finish()
    }
}

static_assertions::assert_impl_all!(TabularModel<String>: Send, Sync);
