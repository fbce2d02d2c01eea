//! Filter definitions.

use std::borrow::Cow;

use serde::Deserialize;
use serde::Serialize;

use super::Accessor;
use crate::model::Row;
use crate::model::Value;

/// The predicate family a filter applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterType {
    /// Case-insensitive substring match.
    Text,
    /// Resolved value must be at least the given number.
    Number,
    /// Equality with one of a fixed set of options.
    Select,
    /// Resolved date within an inclusive range.
    DateRange,
    /// Equality with a boolean.
    Boolean,
}

impl FilterType {
    /// Returns the config name of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterType::Text => "text",
            FilterType::Number => "number",
            FilterType::Select => "select",
            FilterType::DateRange => "date-range",
            FilterType::Boolean => "boolean",
        }
    }
}

/// One choice of a select filter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// A filter control bound to an accessor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDef {
    /// Unique filter id, also the key in the UI filter values.
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Choices offered by a select filter.
    #[serde(default)]
    pub options: Vec<SelectOption>,
    /// Value accessor; defaults to the field named by `id`.
    #[serde(default)]
    pub accessor: Option<Accessor>,
}

impl FilterDef {
    /// Creates a filter of the given type.
    pub fn new(id: impl Into<String>, label: impl Into<String>, filter_type: FilterType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            filter_type,
            placeholder: None,
            options: Vec::new(),
            accessor: None,
        }
    }

    /// Sets the placeholder text.
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Adds a select option.
    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push(SelectOption {
            value: value.into(),
            label: label.into(),
        });
        self
    }

    /// Sets the accessor.
    pub fn accessor(mut self, accessor: Accessor) -> Self {
        self.accessor = Some(accessor);
        self
    }

    /// Resolves this filter's value for a row.
    pub fn resolve<'r>(&self, row: &'r Row) -> Option<Cow<'r, Value>> {
        match &self.accessor {
            Some(accessor) => accessor.resolve(row),
            None => row.get_path(&self.id).filter(|v| !v.is_null()).map(Cow::Borrowed),
        }
    }
}
