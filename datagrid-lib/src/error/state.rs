//! UI state mutation errors

/// Errors returned when a UI state mutation names something the config does
/// not declare. The state is left unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StateError {
    /// No filter with this id is configured.
    #[error("Unknown filter '{0}'")]
    UnknownFilter(String),

    /// The filter value kind does not fit the filter type.
    #[error("Filter '{filter}' expects a {expected} value, got {actual}")]
    FilterTypeMismatch {
        filter: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// No column with this id is configured.
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    /// The column exists but is not sortable.
    #[error("Column '{0}' is not sortable")]
    NotSortable(String),

    /// Sorting is disabled for this table.
    #[error("Sorting is disabled")]
    SortingDisabled,

    /// No row with this identity is in the dataset.
    #[error("Unknown row '{0}'")]
    UnknownRow(String),
}
