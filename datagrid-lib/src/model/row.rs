//! Dynamic table row

use std::collections::HashMap;
use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::Value;
use crate::error::AccessorError;

/// Field holding the preferred row identity.
pub const PRIMARY_ID_FIELD: &str = "_id";

/// Field holding the fallback row identity.
pub const FALLBACK_ID_FIELD: &str = "id";

/// Stable identity of a row (`_id`, falling back to `id`).
///
/// Selection, audit events and row-level dispatch are keyed by this value,
/// never by position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    /// Creates a row id from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string form of the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            other => Some(Self(other.to_display())),
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RowId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// An opaque record: a mapping of field name to [`Value`].
///
/// Rows are never edited by the engine; every derived value goes through an
/// accessor. The builder-style setters exist for hosts and tests assembling
/// rows by hand.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::Row;
///
/// let row = Row::new()
///     .set("id", 7)
///     .set("name", "Leaf Co");
///
/// assert_eq!(row.id().unwrap().as_str(), "7");
/// assert_eq!(row.get_str("name").unwrap(), Some("Leaf Co"));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub(crate) fields: HashMap<String, Value>,
}

impl Row {
    /// Creates a new empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the row identity: `_id` when present and non-null, else `id`.
    pub fn id(&self) -> Option<RowId> {
        self.fields
            .get(PRIMARY_ID_FIELD)
            .and_then(RowId::from_value)
            .or_else(|| self.fields.get(FALLBACK_ID_FIELD).and_then(RowId::from_value))
    }

    // =========================================================================
    // Raw field access
    // =========================================================================

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Resolves a dotted path (`"owner.name"`) through nested rows.
    ///
    /// A field whose literal name contains dots wins over path traversal.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.fields.get(path) {
            return Some(value);
        }
        let (head, rest) = path.split_once('.')?;
        match self.fields.get(head)? {
            Value::Row(nested) => nested.get_path(rest),
            _ => None,
        }
    }

    /// Returns `true` if the row contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Inserts a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    // =========================================================================
    // Typed getters
    //
    // Return Err if field is missing or wrong type.
    // Return Ok(None) only if the field exists and is Value::Null.
    // =========================================================================

    /// Gets a string field value.
    pub fn get_str(&self, field: &str) -> Result<Option<&str>, AccessorError> {
        match self.get_path(field) {
            None => Err(AccessorError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(AccessorError::type_mismatch(
                field,
                "string",
                other.type_name(),
            )),
        }
    }

    /// Gets a boolean field value.
    pub fn get_bool(&self, field: &str) -> Result<Option<bool>, AccessorError> {
        match self.get_path(field) {
            None => Err(AccessorError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(AccessorError::type_mismatch(field, "bool", other.type_name())),
        }
    }

    /// Gets a numeric field value as `f64` (any integer, float or decimal).
    pub fn get_f64(&self, field: &str) -> Result<Option<f64>, AccessorError> {
        match self.get_path(field) {
            None => Err(AccessorError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(
                v @ (Value::Int(_) | Value::Long(_) | Value::Float(_) | Value::Decimal(_)),
            ) => Ok(v.as_f64()),
            Some(other) => Err(AccessorError::type_mismatch(
                field,
                "number",
                other.type_name(),
            )),
        }
    }

    /// Gets a date field value (`DateTime` or a parseable date string).
    pub fn get_datetime(&self, field: &str) -> Result<Option<DateTime<Utc>>, AccessorError> {
        match self.get_path(field) {
            None => Err(AccessorError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(v) => v
                .as_datetime()
                .map(Some)
                .ok_or_else(|| AccessorError::type_mismatch(field, "datetime", v.type_name())),
        }
    }
}
