//! Free-text search stage.

use std::borrow::Cow;

use crate::config::ColumnDef;
use crate::config::TableConfig;
use crate::model::Row;
use crate::model::Value;

/// One place search looks in: a configured column, or a raw field path.
#[derive(Debug, Clone, Copy)]
pub(crate) enum SearchTarget<'c> {
    Column(&'c ColumnDef),
    Path(&'c str),
}

impl<'c> SearchTarget<'c> {
    fn resolve<'r>(&self, row: &'r Row) -> Option<Cow<'r, Value>> {
        match self {
            SearchTarget::Column(column) => column.resolve(row),
            SearchTarget::Path(path) => row.get_path(path).filter(|v| !v.is_null()).map(Cow::Borrowed),
        }
    }
}

/// The targets named by `searchFields`, or every data column when empty.
pub(crate) fn search_targets(config: &TableConfig) -> Vec<SearchTarget<'_>> {
    if config.search.search_fields.is_empty() {
        return config.data_columns().map(SearchTarget::Column).collect();
    }
    config
        .search
        .search_fields
        .iter()
        .map(|field| match config.column_by_id(field) {
            Some(column) if column.column_type.is_data() => SearchTarget::Column(column),
            _ => SearchTarget::Path(field),
        })
        .collect()
}

/// Returns `true` if any target's display form contains `needle`.
///
/// `needle` must already be lowercase.
pub(crate) fn row_matches(row: &Row, targets: &[SearchTarget<'_>], needle: &str) -> bool {
    targets.iter().any(|target| {
        target
            .resolve(row)
            .is_some_and(|value| value.to_display().to_lowercase().contains(needle))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;

    #[test]
    fn test_only_named_fields_are_searched() {
        let config = TableConfig::new("t")
            .column(ColumnDef::text("name", "Name"))
            .column(ColumnDef::text("city", "City"))
            .with_search(SearchConfig::default().with_fields(["name"]));
        let targets = search_targets(&config);

        let row = Row::new().set("name", "Other").set("city", "Leafville");
        assert!(!row_matches(&row, &targets, "leaf"));
        assert!(row_matches(&Row::new().set("name", "Leaf Co"), &targets, "leaf"));
    }

    #[test]
    fn test_empty_fields_search_data_columns() {
        let config = TableConfig::new("t")
            .column(ColumnDef::text("name", "Name"))
            .column(ColumnDef::actions("id", ""));
        let targets = search_targets(&config);
        assert_eq!(targets.len(), 1);

        // the id is only reachable through the actions column
        assert!(!row_matches(&Row::new().set("id", "abc").set("name", "x"), &targets, "abc"));
    }

    #[test]
    fn test_field_path_target() {
        let config = TableConfig::new("t")
            .column(ColumnDef::text("name", "Name"))
            .with_search(SearchConfig::default().with_fields(["owner.email"]));
        let targets = search_targets(&config);

        let row = Row::new().set("owner", Row::new().set("email", "ada@example.com"));
        assert!(row_matches(&row, &targets, "example"));
    }
}
