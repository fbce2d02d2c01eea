//! Table configuration error types

/// Errors found while building or validating a [`TableConfig`](crate::config::TableConfig).
///
/// These are fatal: a table with an invalid config is never constructed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The table itself has no id.
    #[error("Table id is empty")]
    MissingTableId,

    /// A column, filter or action has an empty id.
    #[error("{kind} at position {index} has an empty id")]
    MissingId { kind: &'static str, index: usize },

    /// Two entries of the same kind share an id.
    #[error("Duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    /// The default sort names a column that does not exist.
    #[error("Default sort column '{0}' does not exist")]
    UnknownSortColumn(String),

    /// The default sort names a column that is not sortable.
    #[error("Default sort column '{0}' is not sortable")]
    UnsortableColumn(String),

    /// Pagination settings cannot produce pages.
    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),

    /// The config JSON could not be parsed (includes unsupported `type` values).
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
