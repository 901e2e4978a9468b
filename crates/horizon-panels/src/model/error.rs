//! Error types for tabular models.

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// A setter or editor rejected a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct EditError {
    message: String,
}

impl EditError {
    /// Create an edit error with a user-facing message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The value did not have the kind the column expects.
    pub fn kind_mismatch(expected: impl std::fmt::Display, got: impl std::fmt::Display) -> Self {
        Self::new(format!("expected {expected}, got {got}"))
    }

    /// The message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors that can occur in tabular model operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Row index outside `0..row_count`.
    #[error("row {row} out of range (row count {row_count})")]
    RowOutOfRange { row: usize, row_count: usize },

    /// Column index outside `0..column_count`.
    #[error("column {column} out of range (column count {column_count})")]
    ColumnOutOfRange { column: usize, column_count: usize },

    /// A column's setter or editor failed.
    #[error("cannot edit cell ({row}, {column}): {source}")]
    Edit {
        row: usize,
        column: usize,
        #[source]
        source: EditError,
    },
}

impl ModelError {
    /// Create an edit error for a cell.
    pub fn edit(row: usize, column: usize, source: EditError) -> Self {
        Self::Edit {
            row,
            column,
            source,
        }
    }
}
