//! Sort direction, sort spec and the stable sort stage.

use std::cmp::Ordering;
use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::config::ColumnDef;
use crate::model::Row;
use crate::model::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl Direction {
    /// Applies the direction to an ascending ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }

    /// The opposite direction.
    pub fn toggle(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => f.write_str("asc"),
            Direction::Desc => f.write_str("desc"),
        }
    }
}

/// The active sort: one column and a direction.
///
/// # Example
///
/// ```
/// use datagrid_lib::view::{Direction, SortSpec};
///
/// let sort = SortSpec::desc("revenue");
/// assert_eq!(sort.direction, Direction::Desc);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    #[serde(default)]
    pub direction: Direction,
}

impl SortSpec {
    pub fn new(column: impl Into<String>, direction: Direction) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    /// Ascending sort on a column.
    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, Direction::Asc)
    }

    /// Descending sort on a column.
    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, Direction::Desc)
    }
}

// =============================================================================
// Sort keys
// =============================================================================

/// Totally ordered key extracted from a resolved value.
///
/// Keys of different kinds order by kind: booleans, numbers, times, text.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SortKey {
    Bool(bool),
    Number(f64),
    Time(DateTime<Utc>),
    Text(String),
}

impl SortKey {
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        let key = match value {
            Value::Null => return None,
            Value::Bool(b) => SortKey::Bool(*b),
            Value::Int(_) | Value::Long(_) | Value::Float(_) | Value::Decimal(_) => {
                SortKey::Number(value.as_f64()?)
            }
            Value::DateTime(dt) => SortKey::Time(*dt),
            other => SortKey::Text(other.to_display().to_lowercase()),
        };
        Some(key)
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Bool(_) => 0,
            SortKey::Number(_) => 1,
            SortKey::Time(_) => 2,
            SortKey::Text(_) => 3,
        }
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Time(a), SortKey::Time(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Compares two optional keys; a missing key sorts last in both directions.
fn compare_keys(a: Option<&SortKey>, b: Option<&SortKey>, direction: Direction) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => direction.apply(a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable-sorts row indices by a column's resolved values.
pub(crate) fn sort_rows(order: &mut Vec<usize>, rows: &[Row], column: &ColumnDef, direction: Direction) {
    let mut keyed: Vec<(usize, Option<SortKey>)> = order
        .iter()
        .map(|&i| (i, column.resolve(&rows[i]).and_then(|v| SortKey::from_value(&v))))
        .collect();

    keyed.sort_by(|(_, a), (_, b)| compare_keys(a.as_ref(), b.as_ref(), direction));

    *order = keyed.into_iter().map(|(i, _)| i).collect();
}
