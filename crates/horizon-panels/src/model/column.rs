//! Declarative column descriptions for [`TabularModel`](super::TabularModel).
//!
//! A [`ColumnBinding`] pairs a title and presentation hints with a getter
//! that reads a cell out of a row item, and optionally a setter that writes
//! one back. The column's [`ValueKind`] is declared when the binding is
//! built, so rendering never depends on the data currently in the table.
//!
//! # Example
//!
//! ```
//! use horizon_panels::model::{CellValue, ColumnBinding, EditError};
//!
//! struct Host {
//!     name: String,
//!     port: u16,
//! }
//!
//! let name = ColumnBinding::text("Name", |h: &Host| h.name.clone()).width(160);
//! let port = ColumnBinding::number("Port", |h: &Host| h.port as i64)
//!     .align_end()
//!     .setter(|h: &mut Host, value: CellValue| {
//!         let port = value
//!             .as_int()
//!             .and_then(|n| u16::try_from(n).ok())
//!             .ok_or_else(|| EditError::new("port must be 0-65535"))?;
//!         h.port = port;
//!         Ok(())
//!     });
//!
//! assert!(!name.is_editable());
//! assert!(port.is_editable());
//! ```

use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

use super::error::EditError;
use super::value::{CellValue, ValueKind};

/// Reads a cell from a row item and its index.
pub type Getter<T> = Arc<dyn Fn(&T, usize) -> CellValue + Send + Sync>;

/// Writes a cell. Receives the whole row collection through [`RowEdit`].
pub type Setter<T> = Arc<dyn Fn(RowEdit<'_, T>, CellValue) -> Result<(), EditError> + Send + Sync>;

/// Horizontal alignment of a column's cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alignment {
    /// Leading edge.
    Start,
    /// Centered.
    #[default]
    Center,
    /// Trailing edge.
    End,
}

/// Mutable access to the row being edited and the collection around it.
///
/// Setters that only touch the item use [`item`](Self::item). Setters that
/// change the table's structure (deleting the row, inserting a neighbour)
/// go through [`rows`](Self::rows), [`replace`](Self::replace) or
/// [`remove`](Self::remove). Any of those marks the edit as structural and
/// the model reports it as a full data change instead of a single cell.
pub struct RowEdit<'a, T> {
    rows: &'a mut Vec<T>,
    row: usize,
    column: usize,
    restructured: &'a Cell<bool>,
}

impl<'a, T> RowEdit<'a, T> {
    pub(crate) fn new(
        rows: &'a mut Vec<T>,
        row: usize,
        column: usize,
        restructured: &'a Cell<bool>,
    ) -> Self {
        Self {
            rows,
            row,
            column,
            restructured,
        }
    }

    /// Index of the row being edited.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Index of the column being edited.
    pub fn column(&self) -> usize {
        self.column
    }

    /// The row item.
    ///
    /// # Panics
    ///
    /// Panics if the collection was shrunk through [`rows`](Self::rows) so
    /// that the edited row no longer exists.
    pub fn item(&mut self) -> &mut T {
        &mut self.rows[self.row]
    }

    /// The whole row collection. Marks the edit as structural.
    pub fn rows(&mut self) -> &mut Vec<T> {
        self.restructured.set(true);
        self.rows
    }

    /// Replace the row item, returning the old one.
    ///
    /// # Panics
    ///
    /// Panics if the edited row no longer exists, as for [`item`](Self::item).
    pub fn replace(&mut self, item: T) -> T {
        self.restructured.set(true);
        std::mem::replace(&mut self.rows[self.row], item)
    }

    /// Remove the row being edited.
    pub fn remove(self) -> T {
        self.restructured.set(true);
        self.rows.remove(self.row)
    }
}

/// Custom presentation for a column's cells.
///
/// `format` is the rendering half and `parse` the editing half. Both have
/// defaults, so a delegate only needs to override what it changes.
pub trait CellDelegate: Send + Sync {
    /// Text shown for a cell.
    fn format(&self, value: &CellValue, _row: usize, _column: usize) -> String {
        value.to_string()
    }

    /// Turn editor input into a cell value.
    fn parse(&self, input: &str, _row: usize, _column: usize) -> Result<CellValue, EditError> {
        Ok(CellValue::Text(input.to_string()))
    }
}

/// How a column's cells are rendered.
#[derive(Clone)]
pub enum CellRenderer {
    /// Built-in rendering for the column's kind.
    Default(ValueKind),
    /// A custom delegate.
    Delegate(Arc<dyn CellDelegate>),
}

impl CellRenderer {
    /// Format a value for display.
    pub fn format(&self, value: &CellValue, row: usize, column: usize) -> String {
        match self {
            CellRenderer::Default(_) => value.to_string(),
            CellRenderer::Delegate(delegate) => delegate.format(value, row, column),
        }
    }

    /// Returns `true` if a custom delegate renders the column.
    pub fn is_custom(&self) -> bool {
        matches!(self, CellRenderer::Delegate(_))
    }
}

impl fmt::Debug for CellRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellRenderer::Default(kind) => f.debug_tuple("Default").field(kind).finish(),
            CellRenderer::Delegate(_) => f.write_str("Delegate(..)"),
        }
    }
}

/// How a column's cells are edited.
#[derive(Clone)]
pub enum CellEditor {
    /// Built-in text input parsed according to the column's kind.
    Default(ValueKind),
    /// A custom delegate.
    Delegate(Arc<dyn CellDelegate>),
}

impl CellEditor {
    /// Parse editor input into a value.
    pub fn parse(&self, input: &str, row: usize, column: usize) -> Result<CellValue, EditError> {
        match self {
            CellEditor::Default(kind) => kind.parse_input(input),
            CellEditor::Delegate(delegate) => delegate.parse(input, row, column),
        }
    }
}

impl fmt::Debug for CellEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellEditor::Default(kind) => f.debug_tuple("Default").field(kind).finish(),
            CellEditor::Delegate(_) => f.write_str("Delegate(..)"),
        }
    }
}

/// One column of a tabular model over row type `T`.
pub struct ColumnBinding<T> {
    title: String,
    kind: ValueKind,
    width: Option<u32>,
    alignment: Alignment,
    getter: Getter<T>,
    setter: Option<Setter<T>>,
    delegate: Option<Arc<dyn CellDelegate>>,
}

impl<T: 'static> ColumnBinding<T> {
    /// Create a column whose getter sees the row item and its index.
    pub fn new<V, F>(title: impl Into<String>, kind: ValueKind, getter: F) -> Self
    where
        V: Into<CellValue>,
        F: Fn(&T, usize) -> V + Send + Sync + 'static,
    {
        Self {
            title: title.into(),
            kind,
            width: None,
            alignment: Alignment::default(),
            getter: Arc::new(move |item, row| getter(item, row).into()),
            setter: None,
            delegate: None,
        }
    }

    /// Create a column whose getter only needs the row item.
    pub fn from_item<V, F>(title: impl Into<String>, kind: ValueKind, getter: F) -> Self
    where
        V: Into<CellValue>,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        Self::new(title, kind, move |item: &T, _row: usize| getter(item))
    }

    /// A text column.
    pub fn text<V, F>(title: impl Into<String>, getter: F) -> Self
    where
        V: Into<CellValue>,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        Self::from_item(title, ValueKind::Text, getter)
    }

    /// A numeric column.
    pub fn number<V, F>(title: impl Into<String>, getter: F) -> Self
    where
        V: Into<CellValue>,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        Self::from_item(title, ValueKind::Number, getter)
    }

    /// A boolean column.
    pub fn boolean<V, F>(title: impl Into<String>, getter: F) -> Self
    where
        V: Into<CellValue>,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        Self::from_item(title, ValueKind::Boolean, getter)
    }

    /// A column of application-defined values rendered by `delegate`.
    pub fn custom<V, F>(title: impl Into<String>, getter: F, delegate: Arc<dyn CellDelegate>) -> Self
    where
        V: Into<CellValue>,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        Self::from_item(title, ValueKind::Custom, getter).delegate(delegate)
    }

    /// Fixed width in pixels. Columns without one share the leftover space.
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn align_start(self) -> Self {
        self.align(Alignment::Start)
    }

    pub fn align_end(self) -> Self {
        self.align(Alignment::End)
    }

    /// Make the column editable with a setter that only touches the row item.
    pub fn setter<F>(self, setter: F) -> Self
    where
        F: Fn(&mut T, CellValue) -> Result<(), EditError> + Send + Sync + 'static,
    {
        self.edit_with(move |mut edit: RowEdit<'_, T>, value| setter(edit.item(), value))
    }

    /// Make the column editable with a setter that may restructure the rows.
    pub fn edit_with<F>(mut self, setter: F) -> Self
    where
        F: Fn(RowEdit<'_, T>, CellValue) -> Result<(), EditError> + Send + Sync + 'static,
    {
        self.setter = Some(Arc::new(setter));
        self
    }

    /// Render, and edit if the column has a setter, through `delegate`.
    pub fn delegate(mut self, delegate: Arc<dyn CellDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }
}

impl<T> ColumnBinding<T> {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// The fixed width, or `None` for an auto-sized column.
    pub fn fixed_width(&self) -> Option<u32> {
        self.width
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// A column is editable exactly when it has a setter.
    pub fn is_editable(&self) -> bool {
        self.setter.is_some()
    }

    /// Read the cell for `item` at `row`.
    pub fn value(&self, item: &T, row: usize) -> CellValue {
        (self.getter)(item, row)
    }

    pub(crate) fn setter_fn(&self) -> Option<&Setter<T>> {
        self.setter.as_ref()
    }

    pub fn renderer(&self) -> CellRenderer {
        match &self.delegate {
            Some(delegate) => CellRenderer::Delegate(delegate.clone()),
            None => CellRenderer::Default(self.kind),
        }
    }

    /// The editor, present only when the column has a setter.
    pub fn editor(&self) -> Option<CellEditor> {
        self.setter.as_ref()?;
        Some(match &self.delegate {
            Some(delegate) => CellEditor::Delegate(delegate.clone()),
            None => CellEditor::Default(self.kind),
        })
    }
}

impl<T> fmt::Debug for ColumnBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnBinding")
            .field("title", &self.title)
            .field("kind", &self.kind)
            .field("width", &self.width)
            .field("alignment", &self.alignment)
            .field("editable", &self.setter.is_some())
            .field("delegate", &self.delegate.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Task {
        title: String,
        done: bool,
    }

    fn task(title: &str) -> Task {
        Task {
            title: title.into(),
            done: false,
        }
    }

    struct Stars;

    impl CellDelegate for Stars {
        fn format(&self, value: &CellValue, _row: usize, _column: usize) -> String {
            "*".repeat(value.as_int().unwrap_or(0) as usize)
        }

        fn parse(&self, input: &str, _row: usize, _column: usize) -> Result<CellValue, EditError> {
            Ok(CellValue::Int(input.chars().filter(|c| *c == '*').count() as i64))
        }
    }

    #[test]
    fn test_defaults() {
        let column = ColumnBinding::text("Title", |t: &Task| t.title.clone());
        assert_eq!(column.title(), "Title");
        assert_eq!(column.kind(), ValueKind::Text);
        assert_eq!(column.fixed_width(), None);
        assert_eq!(column.alignment(), Alignment::Center);
        assert!(!column.is_editable());
        assert!(column.editor().is_none());
        assert!(!column.renderer().is_custom());
    }

    #[test]
    fn test_indexed_getter() {
        let column = ColumnBinding::new("#", ValueKind::Number, |_: &Task, row| row as i64 + 1);
        assert_eq!(column.value(&task("a"), 4), CellValue::Int(5));
    }

    #[test]
    fn test_builder_hints() {
        let column = ColumnBinding::boolean("Done", |t: &Task| t.done)
            .width(40)
            .align_start();
        assert_eq!(column.fixed_width(), Some(40));
        assert_eq!(column.alignment(), Alignment::Start);
        assert_eq!(column.align_end().alignment(), Alignment::End);
    }

    #[test]
    fn test_setter_enables_editor() {
        let column = ColumnBinding::boolean("Done", |t: &Task| t.done).setter(|t, value| {
            t.done = value.as_bool().ok_or_else(|| EditError::new("not a flag"))?;
            Ok(())
        });
        assert!(column.is_editable());

        let editor = column.editor().unwrap();
        assert!(matches!(editor, CellEditor::Default(ValueKind::Boolean)));
        assert_eq!(editor.parse("true", 0, 0), Ok(CellValue::Bool(true)));

        let mut rows = vec![task("a")];
        let setter = column.setter_fn().unwrap();
        let restructured = Cell::new(false);
        setter(RowEdit::new(&mut rows, 0, 0, &restructured), CellValue::Bool(true)).unwrap();
        assert!(rows[0].done);
        assert!(!restructured.get());
    }

    #[test]
    fn test_edit_with_can_remove_row() {
        let column = ColumnBinding::text("Title", |t: &Task| t.title.clone()).edit_with(
            |edit: RowEdit<'_, Task>, value| {
                if value.is_none() {
                    edit.remove();
                }
                Ok(())
            },
        );

        let mut rows = vec![task("a"), task("b")];
        let setter = column.setter_fn().unwrap();
        let restructured = Cell::new(false);
        setter(RowEdit::new(&mut rows, 0, 0, &restructured), CellValue::None).unwrap();
        assert!(restructured.get());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "b");
    }

    #[test]
    fn test_replace_marks_edit_structural() {
        let mut rows = vec![task("a"), task("b")];
        let restructured = Cell::new(false);
        let mut edit = RowEdit::new(&mut rows, 1, 0, &restructured);
        let old = edit.replace(task("c"));
        assert_eq!(old.title, "b");
        assert!(restructured.get());
        assert_eq!(rows[1].title, "c");
    }

    #[test]
    #[should_panic]
    fn test_item_after_truncate_panics() {
        let mut rows = vec![task("a"), task("b")];
        let restructured = Cell::new(false);
        let mut edit = RowEdit::new(&mut rows, 1, 0, &restructured);
        edit.rows().truncate(1);
        edit.item();
    }

    #[test]
    fn test_delegate_drives_renderer_and_editor() {
        let column = ColumnBinding::custom("Rating", |_: &Task| 3, Arc::new(Stars))
            .setter(|_, _| Ok(()));
        let renderer = column.renderer();
        assert!(renderer.is_custom());
        assert_eq!(renderer.format(&CellValue::Int(3), 0, 0), "***");
        assert_eq!(
            column.editor().unwrap().parse("**", 0, 0),
            Ok(CellValue::Int(2))
        );
    }

    #[test]
    fn test_delegate_without_setter_is_read_only() {
        let column = ColumnBinding::custom("Rating", |_: &Task| 3, Arc::new(Stars));
        assert!(column.renderer().is_custom());
        assert!(column.editor().is_none());
    }
}
