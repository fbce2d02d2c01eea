//! JSON serializer.

use serde_json::Map;
use serde_json::Value as JsonValue;

use super::RowSerializer;
use crate::config::ColumnDef;
use crate::error::ExportError;
use crate::model::Row;

/// JSON array export: one object per row, keyed by column id, holding the
/// same rendered text the CSV form uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer {
    pretty: bool,
}

impl JsonSerializer {
    /// Indented output.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl RowSerializer for JsonSerializer {
    fn serialize(&self, columns: &[&ColumnDef], rows: &[&Row]) -> Result<Vec<u8>, ExportError> {
        let objects: Vec<JsonValue> = rows
            .iter()
            .map(|row| {
                let object: Map<String, JsonValue> = columns
                    .iter()
                    .map(|c| (c.id.clone(), JsonValue::String(c.render(row))))
                    .collect();
                JsonValue::Object(object)
            })
            .collect();

        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&objects)?
        } else {
            serde_json::to_vec(&objects)?
        };
        Ok(bytes)
    }
}
