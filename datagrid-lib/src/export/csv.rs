//! CSV serializer.

use super::RowSerializer;
use crate::config::ColumnDef;
use crate::error::ExportError;
use crate::model::Row;

/// Comma-separated export.
///
/// The header row holds the column labels; each following line holds the
/// rendered cell text. Fields are never quoted: a value containing a comma or
/// a newline will break its line. Lines end in `\n` and there is no trailing
/// newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSerializer;

impl RowSerializer for CsvSerializer {
    fn serialize(&self, columns: &[&ColumnDef], rows: &[&Row]) -> Result<Vec<u8>, ExportError> {
        let mut wtr = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Never)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        wtr.write_record(columns.iter().map(|c| c.label.as_str()))?;
        for row in rows {
            wtr.write_record(columns.iter().map(|c| c.render(row)))?;
        }

        let mut bytes = wtr
            .into_inner()
            .map_err(|e| ExportError::Csv(e.into_error().into()))?;
        if bytes.last() == Some(&b'\n') {
            bytes.pop();
        }
        Ok(bytes)
    }
}
