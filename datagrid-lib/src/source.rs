//! Data source collaborators.
//!
//! The engine never fetches on its own; a [`DataSource`] supplies the raw
//! dataset whenever the host asks for a refresh.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::SourceError;
use crate::model::Row;

/// Supplies the raw rows of a table.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetches the full current dataset.
    async fn fetch(&self) -> Result<Vec<Row>, SourceError>;
}

/// Decodes a JSON array of objects into rows.
///
/// # Example
///
/// ```
/// use datagrid_lib::source::decode_rows;
///
/// let rows = decode_rows(br#"[{"_id": "a", "revenue": 5}, {"_id": "b"}]"#).unwrap();
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[0].id().unwrap().as_str(), "a");
/// ```
pub fn decode_rows(bytes: &[u8]) -> Result<Vec<Row>, SourceError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// In-memory rows that the host can replace, e.g. after a mutation.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    rows: Arc<RwLock<Vec<Row>>>,
}

impl StaticSource {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(rows)),
        }
    }

    /// Replaces the rows returned by the next fetch.
    pub async fn replace(&self, rows: Vec<Row>) {
        *self.rows.write().await = rows;
    }

    /// Edits the rows returned by the next fetch.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Vec<Row>),
    {
        f(&mut *self.rows.write().await);
    }
}

#[async_trait]
impl DataSource for StaticSource {
    async fn fetch(&self) -> Result<Vec<Row>, SourceError> {
        Ok(self.rows.read().await.clone())
    }
}

/// Reads a JSON array of rows from a file on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DataSource for JsonFileSource {
    async fn fetch(&self) -> Result<Vec<Row>, SourceError> {
        let bytes = tokio::fs::read(&self.path).await?;
        let rows = decode_rows(&bytes)?;
        log::debug!("read {} rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }
}
