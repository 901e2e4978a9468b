/// A change notification emitted by [`TabularModel`](super::TabularModel).
///
/// Ranges are inclusive. Bulk operations report [`TableChange::DataChanged`]
/// instead of one event per row; listeners should treat it as "reload
/// everything".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableChange {
    /// Rows `first..=last` were inserted.
    RowsInserted { first: usize, last: usize },
    /// Rows `first..=last` were removed.
    RowsRemoved { first: usize, last: usize },
    /// Cells in `row` between the two columns changed value.
    CellsUpdated {
        row: usize,
        first_column: usize,
        last_column: usize,
    },
    /// Shape or content changed arbitrarily.
    DataChanged,
}

impl TableChange {
    /// A change covering a single cell.
    pub fn cell(row: usize, column: usize) -> Self {
        TableChange::CellsUpdated {
            row,
            first_column: column,
            last_column: column,
        }
    }

    /// Returns `true` if the row count may have changed.
    pub fn affects_shape(&self) -> bool {
        !matches!(self, TableChange::CellsUpdated { .. })
    }
}
