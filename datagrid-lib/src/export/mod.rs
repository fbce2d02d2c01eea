//! Client-side export of rows to files.
//!
//! Serializers are pluggable per [`ExportFormat`]; CSV and JSON are built in.
//! Export never touches table state.

mod csv;
mod json;

pub use self::csv::CsvSerializer;
pub use self::json::JsonSerializer;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

use crate::config::ColumnDef;
use crate::config::TableConfig;
use crate::error::ExportError;
use crate::model::Row;

/// A file format a table may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    /// Spreadsheet; needs a serializer registered by the host.
    Xlsx,
}

impl ExportFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
            ExportFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "xlsx" => Ok(ExportFormat::Xlsx),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Turns rows into file bytes, one column per entry of `columns`.
pub trait RowSerializer: Send + Sync {
    fn serialize(&self, columns: &[&ColumnDef], rows: &[&Row]) -> Result<Vec<u8>, ExportError>;
}

/// A finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// `{table id}_{YYYY-MM-DD}.{ext}`
    pub file_name: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
    pub row_count: usize,
}

impl ExportFile {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Export file name for a table and date.
pub fn file_name(table_id: &str, date: NaiveDate, format: ExportFormat) -> String {
    format!("{}_{}.{}", table_id, date.format("%Y-%m-%d"), format.extension())
}

/// Serializes rows with the built-in serializers.
///
/// `actions` columns are skipped.
///
/// # Example
///
/// ```
/// use datagrid_lib::config::ColumnDef;
/// use datagrid_lib::export::{export_rows, ExportFormat};
/// use datagrid_lib::model::Row;
///
/// let columns = vec![ColumnDef::text("name", "name"), ColumnDef::text("qty", "qty")];
/// let a = Row::new().set("name", "A").set("qty", 1);
/// let b = Row::new().set("name", "B").set("qty", 2);
///
/// let bytes = export_rows(&[&a, &b], &columns, ExportFormat::Csv).unwrap();
/// assert_eq!(bytes, b"name,qty\nA,1\nB,2");
/// ```
pub fn export_rows(rows: &[&Row], columns: &[ColumnDef], format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    Exporter::default().export_rows(rows, columns, format)
}

/// Serializer registry.
#[derive(Clone)]
pub struct Exporter {
    serializers: HashMap<ExportFormat, Arc<dyn RowSerializer>>,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::empty()
            .with_serializer(ExportFormat::Csv, CsvSerializer)
            .with_serializer(ExportFormat::Json, JsonSerializer::default())
    }
}

impl Exporter {
    /// A registry with no serializers.
    pub fn empty() -> Self {
        Self {
            serializers: HashMap::new(),
        }
    }

    /// Registers (or replaces) the serializer for a format.
    pub fn with_serializer(mut self, format: ExportFormat, serializer: impl RowSerializer + 'static) -> Self {
        self.serializers.insert(format, Arc::new(serializer));
        self
    }

    /// Returns `true` if the format has a serializer.
    pub fn supports(&self, format: ExportFormat) -> bool {
        self.serializers.contains_key(&format)
    }

    /// Serializes rows; `actions` columns are skipped.
    pub fn export_rows(&self, rows: &[&Row], columns: &[ColumnDef], format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        let columns: Vec<&ColumnDef> = columns.iter().filter(|c| c.column_type.is_data()).collect();
        if columns.is_empty() {
            return Err(ExportError::NoColumns);
        }
        let serializer = self
            .serializers
            .get(&format)
            .ok_or_else(|| ExportError::UnsupportedFormat(format.to_string()))?;
        serializer.serialize(&columns, rows)
    }

    /// Exports rows of a table, checking the table's export settings.
    pub fn export(
        &self,
        config: &TableConfig,
        rows: &[&Row],
        format: ExportFormat,
        date: NaiveDate,
    ) -> Result<ExportFile, ExportError> {
        if !config.export.enabled {
            return Err(ExportError::Disabled);
        }
        if !config.export.formats.contains(&format) {
            return Err(ExportError::FormatNotEnabled(format.to_string()));
        }

        let bytes = self.export_rows(rows, &config.columns, format)?;
        log::debug!(
            "table '{}': exported {} rows as {} ({} bytes)",
            config.id,
            rows.len(),
            format,
            bytes.len()
        );

        Ok(ExportFile {
            file_name: file_name(&config.id, date, format),
            format,
            bytes,
            row_count: rows.len(),
        })
    }
}
