//! Column definitions and accessors.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use crate::error::AccessorError;
use crate::model::Row;
use crate::model::Value;

/// Signature of a derivation accessor.
pub type DeriveFn = Arc<dyn Fn(&Row) -> Result<Value, AccessorError> + Send + Sync>;

/// Extracts a display/sort/filter value from a row.
///
/// All resolution goes through [`Accessor::resolve`], which maps missing
/// fields, `Null` and derivation errors to `None`.
#[derive(Clone)]
pub enum Accessor {
    /// A field name or dotted path.
    Field(String),
    /// A pure derivation over the whole row.
    Derive(DeriveFn),
}

impl Accessor {
    /// Creates a field accessor.
    pub fn field(path: impl Into<String>) -> Self {
        Accessor::Field(path.into())
    }

    /// Creates a derivation accessor.
    pub fn derive<F>(f: F) -> Self
    where
        F: Fn(&Row) -> Result<Value, AccessorError> + Send + Sync + 'static,
    {
        Accessor::Derive(Arc::new(f))
    }

    /// Resolves the accessor against a row. `None` means "no value".
    pub fn resolve<'r>(&self, row: &'r Row) -> Option<Cow<'r, Value>> {
        let value = match self {
            Accessor::Field(path) => Cow::Borrowed(row.get_path(path)?),
            Accessor::Derive(f) => match f(row) {
                Ok(value) => Cow::Owned(value),
                Err(err) => {
                    log::trace!("accessor resolved to no value: {}", err);
                    return None;
                }
            },
        };
        (!value.is_null()).then_some(value)
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Field(path) => f.debug_tuple("Field").field(path).finish(),
            Accessor::Derive(_) => f.write_str("Derive(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for Accessor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Accessor::Field)
    }
}

/// How a column's values are presented.
///
/// Every variant maps to exactly one formatter in [`ColumnType::formatter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnType {
    #[default]
    Text,
    Badge,
    Date,
    Image,
    /// Row action buttons; carries no data.
    Actions,
}

impl ColumnType {
    /// Returns the formatter that turns a resolved value into cell text.
    pub fn formatter(self) -> fn(&Value) -> String {
        match self {
            ColumnType::Text | ColumnType::Badge | ColumnType::Image => format_text,
            ColumnType::Date => format_date,
            ColumnType::Actions => format_empty,
        }
    }

    /// Returns `false` for columns that hold no row data.
    pub fn is_data(self) -> bool {
        !matches!(self, ColumnType::Actions)
    }

    /// Returns the config name of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Badge => "badge",
            ColumnType::Date => "date",
            ColumnType::Image => "image",
            ColumnType::Actions => "actions",
        }
    }
}

fn format_text(value: &Value) -> String {
    value.to_display()
}

fn format_date(value: &Value) -> String {
    match value.as_datetime() {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => value.to_display(),
    }
}

fn format_empty(_: &Value) -> String {
    String::new()
}

/// A table column.
///
/// When no accessor is given the column reads the field named by its id.
///
/// # Example
///
/// ```
/// use datagrid_lib::config::ColumnDef;
/// use datagrid_lib::model::{Row, Value};
///
/// let name = ColumnDef::text("name", "Name").sortable();
/// let total = ColumnDef::text("total", "Total").derive(|row| {
///     let qty = row.get_f64("qty")?.unwrap_or(0.0);
///     let price = row.get_f64("price")?.unwrap_or(0.0);
///     Ok(Value::from(qty * price))
/// });
///
/// let row = Row::new().set("name", "A").set("qty", 2).set("price", 1.5);
/// assert_eq!(name.render(&row), "A");
/// assert_eq!(total.render(&row), "3");
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    /// Unique column id.
    pub id: String,
    /// Header label.
    #[serde(default)]
    pub label: String,
    /// Presentation type.
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
    /// Whether the column can be sorted on.
    #[serde(default)]
    pub sortable: bool,
    /// Whether the column offers a filter.
    #[serde(default)]
    pub filterable: bool,
    /// Value accessor; defaults to the field named by `id`.
    #[serde(default)]
    pub accessor: Option<Accessor>,
}

impl ColumnDef {
    /// Creates a column of the given type.
    pub fn new(id: impl Into<String>, label: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            column_type,
            sortable: false,
            filterable: false,
            accessor: None,
        }
    }

    /// Creates a text column.
    pub fn text(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, ColumnType::Text)
    }

    /// Creates a badge column.
    pub fn badge(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, ColumnType::Badge)
    }

    /// Creates a date column.
    pub fn date(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, ColumnType::Date)
    }

    /// Creates an image column.
    pub fn image(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, ColumnType::Image)
    }

    /// Creates the row actions column.
    pub fn actions(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, ColumnType::Actions)
    }

    /// Marks the column as sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Marks the column as filterable.
    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    /// Reads the value from a field path instead of the column id.
    pub fn field(mut self, path: impl Into<String>) -> Self {
        self.accessor = Some(Accessor::field(path));
        self
    }

    /// Derives the value from the whole row.
    pub fn derive<F>(mut self, f: F) -> Self
    where
        F: Fn(&Row) -> Result<Value, AccessorError> + Send + Sync + 'static,
    {
        self.accessor = Some(Accessor::derive(f));
        self
    }

    /// Resolves this column's value for a row.
    pub fn resolve<'r>(&self, row: &'r Row) -> Option<Cow<'r, Value>> {
        match &self.accessor {
            Some(accessor) => accessor.resolve(row),
            None => row.get_path(&self.id).filter(|v| !v.is_null()).map(Cow::Borrowed),
        }
    }

    /// Renders this column's cell text for a row; empty when there is no value.
    pub fn render(&self, row: &Row) -> String {
        if !self.column_type.is_data() {
            return String::new();
        }
        self.resolve(row)
            .map(|value| (self.column_type.formatter())(&value))
            .unwrap_or_default()
    }
}
