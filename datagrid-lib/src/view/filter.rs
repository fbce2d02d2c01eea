//! Filter values and their predicates.

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveTime;
use chrono::Utc;

use crate::config::FilterDef;
use crate::config::FilterType;
use crate::error::StateError;
use crate::model::Value;
use crate::model::parse_datetime;

/// Inclusive date range; either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Range between two instants.
    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Range covering whole days: from the start of `from` to the end of `to`.
    pub fn days(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self {
            from: from.map(|d| d.and_time(NaiveTime::MIN).and_utc()),
            to: to.map(end_of_day),
        }
    }

    /// Parses `from..to`. Either side may be empty; date-only bounds cover
    /// whole days, RFC 3339 bounds are exact.
    ///
    /// # Example
    ///
    /// ```
    /// use datagrid_lib::view::DateRange;
    ///
    /// let range = DateRange::parse("2024-01-01..2024-01-31").unwrap();
    /// assert!(range.from.is_some() && range.to.is_some());
    ///
    /// let open = DateRange::parse("..2024-01-31").unwrap();
    /// assert!(open.from.is_none());
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let (from, to) = s.split_once("..")?;
        Some(Self {
            from: parse_bound(from, false)?,
            to: parse_bound(to, true)?,
        })
    }

    /// Returns `true` when neither bound is set.
    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Returns `true` if the instant falls inside the range.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| at >= from) && self.to.is_none_or(|to| at <= to)
    }
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
        .and_utc()
}

/// `Some(None)` for an empty bound, `None` for an unparseable one.
fn parse_bound(s: &str, end: bool) -> Option<Option<DateTime<Utc>>> {
    let s = s.trim();
    if s.is_empty() {
        return Some(None);
    }
    if end && let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Some(end_of_day(date)));
    }
    parse_datetime(s).map(Some)
}

/// The current value of one filter control.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Substring, for `text` filters.
    Text(String),
    /// Minimum, for `number` filters.
    Number(f64),
    /// Expected value, for `select` filters.
    Select(Value),
    /// Range, for `date-range` filters.
    DateRange(DateRange),
    /// Expected flag, for `boolean` filters.
    Bool(bool),
}

impl FilterValue {
    /// Creates a text value.
    pub fn text(s: impl Into<String>) -> Self {
        FilterValue::Text(s.into())
    }

    /// Creates a select value.
    pub fn select(value: impl Into<Value>) -> Self {
        FilterValue::Select(value.into())
    }

    /// Returns `true` for values that do not constrain anything.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(s) => s.trim().is_empty(),
            FilterValue::Number(n) => n.is_nan(),
            FilterValue::Select(v) => v.to_display().is_empty(),
            FilterValue::DateRange(range) => range.is_open(),
            FilterValue::Bool(_) => false,
        }
    }

    /// Returns the filter type name this value belongs to.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FilterValue::Text(_) => FilterType::Text.as_str(),
            FilterValue::Number(_) => FilterType::Number.as_str(),
            FilterValue::Select(_) => FilterType::Select.as_str(),
            FilterValue::DateRange(_) => FilterType::DateRange.as_str(),
            FilterValue::Bool(_) => FilterType::Boolean.as_str(),
        }
    }

    fn fits(&self, filter_type: FilterType) -> bool {
        matches!(
            (self, filter_type),
            (FilterValue::Text(_), FilterType::Text)
                | (FilterValue::Number(_), FilterType::Number)
                | (FilterValue::Select(_), FilterType::Select)
                | (FilterValue::DateRange(_), FilterType::DateRange)
                | (FilterValue::Bool(_), FilterType::Boolean)
        )
    }

    /// Converts the value to the kind the filter expects.
    ///
    /// Text input is parsed for non-text filters (`"5"`, `"true"`,
    /// `"2024-01-01..2024-02-01"`); any other mismatch is an error.
    pub fn coerce(self, filter: &FilterDef) -> Result<Self, StateError> {
        if self.fits(filter.filter_type) {
            return Ok(self);
        }

        let mismatch = |actual: &'static str| StateError::FilterTypeMismatch {
            filter: filter.id.clone(),
            expected: filter.filter_type.as_str(),
            actual,
        };

        let input = match self {
            FilterValue::Text(input) => input,
            other => return Err(mismatch(other.kind_name())),
        };
        let trimmed = input.trim();

        let coerced = match filter.filter_type {
            FilterType::Text => Some(FilterValue::Text(input.clone())),
            FilterType::Select => Some(FilterValue::Select(Value::String(input.clone()))),
            FilterType::Number if trimmed.is_empty() => Some(FilterValue::Number(f64::NAN)),
            FilterType::Number => trimmed.parse::<f64>().ok().map(FilterValue::Number),
            FilterType::DateRange if trimmed.is_empty() => Some(FilterValue::DateRange(DateRange::default())),
            FilterType::DateRange => DateRange::parse(trimmed).map(FilterValue::DateRange),
            FilterType::Boolean => Value::String(input.clone()).as_bool().map(FilterValue::Bool),
        };
        coerced.ok_or_else(|| mismatch("text"))
    }

    /// Evaluates the predicate against a resolved value.
    ///
    /// A row with no value never matches a non-empty filter.
    pub fn matches(&self, value: Option<&Value>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match self {
            FilterValue::Text(needle) => value
                .to_display()
                .to_lowercase()
                .contains(&needle.trim().to_lowercase()),
            FilterValue::Number(min) => value.as_f64().is_some_and(|n| n >= *min),
            FilterValue::Select(expected) => value.loosely_eq(expected),
            FilterValue::DateRange(range) => value.as_datetime().is_some_and(|at| range.contains(at)),
            FilterValue::Bool(expected) => value.as_bool() == Some(*expected),
        }
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        FilterValue::Number(n)
    }
}

impl From<DateRange> for FilterValue {
    fn from(range: DateRange) -> Self {
        FilterValue::DateRange(range)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_text_is_case_insensitive_substring() {
        let value = Value::from("Leaf Co");
        assert!(FilterValue::text("leaf").matches(Some(&value)));
        assert!(FilterValue::text("F C").matches(Some(&value)));
        assert!(!FilterValue::text("oak").matches(Some(&value)));
        assert!(!FilterValue::text("leaf").matches(None));
    }

    #[test]
    fn test_number_is_minimum() {
        assert!(FilterValue::Number(5.0).matches(Some(&Value::from(5))));
        assert!(FilterValue::Number(5.0).matches(Some(&Value::from("7.5"))));
        assert!(!FilterValue::Number(5.0).matches(Some(&Value::from(4))));
        assert!(!FilterValue::Number(5.0).matches(Some(&Value::from("n/a"))));
    }

    #[test]
    fn test_select_compares_loosely() {
        assert!(FilterValue::select("1").matches(Some(&Value::from(1))));
        assert!(FilterValue::select("active").matches(Some(&Value::from("active"))));
        assert!(!FilterValue::select("active").matches(Some(&Value::from("Active"))));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let range = DateRange::parse("2024-01-01..2024-01-31").unwrap();
        let last_evening = Utc.with_ymd_and_hms(2024, 1, 31, 22, 0, 0).unwrap();
        let next_day = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let first = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        assert!(range.contains(first));
        assert!(range.contains(last_evening));
        assert!(!range.contains(next_day));

        let filter = FilterValue::DateRange(range);
        assert!(filter.matches(Some(&Value::from("2024-01-15"))));
        assert!(!filter.matches(Some(&Value::from("not a date"))));
    }

    #[test]
    fn test_date_range_parse_rejects_garbage() {
        assert!(DateRange::parse("2024-01-01").is_none());
        assert!(DateRange::parse("yesterday..today").is_none());
        assert!(DateRange::parse("..").unwrap().is_open());
    }

    #[test]
    fn test_empty_values() {
        assert!(FilterValue::text("  ").is_empty());
        assert!(FilterValue::select("").is_empty());
        assert!(FilterValue::DateRange(DateRange::default()).is_empty());
        assert!(!FilterValue::Bool(false).is_empty());
    }

    #[test]
    fn test_coerce_text_input() {
        let number = FilterDef::new("qty", "Qty", FilterType::Number);
        assert_eq!(FilterValue::text("3").coerce(&number).unwrap(), FilterValue::Number(3.0));
        assert!(FilterValue::text("").coerce(&number).unwrap().is_empty());
        assert!(matches!(
            FilterValue::text("three").coerce(&number),
            Err(StateError::FilterTypeMismatch { expected: "number", .. })
        ));

        let flag = FilterDef::new("active", "Active", FilterType::Boolean);
        assert_eq!(FilterValue::text("TRUE").coerce(&flag).unwrap(), FilterValue::Bool(true));
        assert!(matches!(
            FilterValue::Number(1.0).coerce(&flag),
            Err(StateError::FilterTypeMismatch { actual: "number", .. })
        ));
    }
}
