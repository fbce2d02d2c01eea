//! Data source error types

/// Errors while fetching the raw dataset.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The collaborator could not produce rows.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// The payload was not a JSON array of objects.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Reading the payload failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
