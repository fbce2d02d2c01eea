//! JSON (de)serialization for rows.
//!
//! ## Read Format (Deserialization)
//!
//! A row is a JSON object. Field values are inferred:
//! - integers become `Int` when they fit in 32 bits, `Long` otherwise
//! - fractional numbers become `Float`
//! - strings parse as UUID, then RFC 3339 timestamp, else stay `String`
//! - arrays become `List`, objects become nested `Row`
//!
//! ## Write Format (Serialization)
//!
//! Rows serialize back to a JSON object; `Null` fields are kept.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::MapAccess;
use serde::de::Visitor;
use serde::ser::SerializeMap;
use uuid::Uuid;

use super::Row;
use super::Value;

impl Serialize for Row {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RowVisitor)
    }
}

struct RowVisitor;

impl<'de> Visitor<'de> for RowVisitor {
    type Value = Row;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON object representing a row")
    }

    fn visit_map<M>(self, mut map: M) -> Result<Row, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut fields = HashMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(key) = map.next_key::<String>()? {
            let value: serde_json::Value = map.next_value()?;
            fields.insert(key, json_value_to_value(value));
        }
        Ok(Row { fields })
    }
}

/// Converts a serde_json::Value to our Value enum.
pub(crate) fn json_value_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                match i32::try_from(i) {
                    Ok(small) => Value::Int(small),
                    Err(_) => Value::Long(i),
                }
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        serde_json::Value::String(s) => {
            if let Ok(uuid) = Uuid::parse_str(&s) {
                Value::Guid(uuid)
            } else if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&s) {
                Value::DateTime(dt.with_timezone(&chrono::Utc))
            } else {
                Value::String(s)
            }
        }
        serde_json::Value::Array(items) => {
            Value::List(items.into_iter().map(json_value_to_value).collect())
        }
        serde_json::Value::Object(obj) => {
            let fields = obj
                .into_iter()
                .map(|(k, v)| (k, json_value_to_value(v)))
                .collect();
            Value::Row(Box::new(Row { fields }))
        }
    }
}
