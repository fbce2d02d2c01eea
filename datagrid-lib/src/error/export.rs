//! Export error types

/// Errors during export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Export is disabled for this table.
    #[error("Export is disabled")]
    Disabled,

    /// The format is not listed in the table's export formats.
    #[error("Format '{0}' is not enabled for this table")]
    FormatNotEnabled(String),

    /// The format is known but has no serializer.
    #[error("Format '{0}' is not supported")]
    UnsupportedFormat(String),

    /// No exportable columns.
    #[error("No exportable columns")]
    NoColumns,

    /// CSV writing failed.
    #[error("CSV encoding error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding failed.
    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),
}
