//! Table construction errors

/// Errors raised when a table is built from invalid column definitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// Two columns share the same record key.
    #[error("Duplicate column key '{key}'")]
    DuplicateColumn { key: String },

    /// A column was declared with an empty key.
    #[error("Column key must not be empty")]
    EmptyKey,
}

impl TableError {
    /// Creates a new duplicate column error.
    pub fn duplicate(key: impl Into<String>) -> Self {
        Self::DuplicateColumn { key: key.into() }
    }
}
