//! The view pipeline.
//!
//! [`compute_view`] turns the raw rows, the config and the UI state into the
//! render-ready page. Stages run in a fixed order: search, filters, sort,
//! permission gate, paginate. Every stage is pure; rows are never copied or
//! edited, only referenced.
//!
//! # Example
//!
//! ```
//! use datagrid_lib::config::{ColumnDef, TableConfig, Roles};
//! use datagrid_lib::model::Row;
//! use datagrid_lib::state::UiState;
//! use datagrid_lib::view::{compute_view, SortSpec};
//!
//! let config = TableConfig::new("accounts")
//!     .column(ColumnDef::text("name", "Name").sortable());
//! let rows = vec![
//!     Row::new().set("id", 1).set("name", "Other"),
//!     Row::new().set("id", 2).set("name", "Leaf Co"),
//! ];
//! let state = UiState::from_config(&config).with_sort(SortSpec::asc("name"));
//!
//! let view = compute_view(&rows, &config, &state, &Roles::none());
//! assert_eq!(view.total_filtered, 2);
//! assert_eq!(view.rows[0].row.get_str("name").unwrap(), Some("Leaf Co"));
//! ```

mod filter;
mod page;
mod permission;
mod search;
mod sort;

pub use filter::*;
pub use page::*;
pub use permission::*;
pub use sort::Direction;
pub use sort::SortSpec;

use crate::config::ActionDef;
use crate::config::Roles;
use crate::config::TableConfig;
use crate::model::Row;
use crate::model::RowId;
use crate::state::UiState;

/// Row positions surviving search, filters and sort, plus the page window.
///
/// This is what the controller caches between mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Derived {
    /// Indices into the raw rows, in display order.
    pub(crate) order: Vec<usize>,
    pub(crate) window: PageWindow,
}

impl Derived {
    /// Indices of the rows on the current page.
    pub(crate) fn page(&self) -> &[usize] {
        &self.order[self.window.start..self.window.end]
    }

    /// Identities of every filtered row that has one.
    pub(crate) fn filtered_ids(&self, rows: &[Row]) -> Vec<RowId> {
        self.order.iter().filter_map(|&i| rows[i].id()).collect()
    }
}

/// Runs search, filter, sort and pagination.
pub(crate) fn derive(rows: &[Row], config: &TableConfig, state: &UiState) -> Derived {
    let mut order: Vec<usize> = (0..rows.len()).collect();

    let term = state.search_term.trim();
    if config.search.enabled && !term.is_empty() {
        let needle = term.to_lowercase();
        let targets = search::search_targets(config);
        order.retain(|&i| search::row_matches(&rows[i], &targets, &needle));
    }

    for (id, value) in state.filter_values.iter().filter(|(_, v)| !v.is_empty()) {
        let Some(def) = config.filter_by_id(id) else {
            log::trace!("table '{}': ignoring value for unknown filter '{}'", config.id, id);
            continue;
        };
        order.retain(|&i| value.matches(def.resolve(&rows[i]).as_deref()));
    }

    if config.sorting.enabled
        && let Some(spec) = &state.sort
        && let Some(column) = config.column_by_id(&spec.column)
    {
        sort::sort_rows(&mut order, rows, column, spec.direction);
    }

    let window = PageWindow::compute(order.len(), state.page_size(config), state.current_page);

    log::trace!(
        "table '{}': {} of {} rows, page {}/{}",
        config.id,
        order.len(),
        rows.len(),
        window.current_page,
        window.total_pages
    );

    Derived { order, window }
}

/// One row on the current page.
#[derive(Debug, Clone)]
pub struct ViewRow<'a> {
    pub row: &'a Row,
    /// `None` for rows without `_id`/`id`; such rows cannot be selected.
    pub id: Option<RowId>,
    /// Row actions the caller may invoke, in config order.
    pub actions: Vec<&'a ActionDef>,
}

/// The derived, render-ready view.
#[derive(Debug, Clone)]
pub struct View<'a> {
    /// Rows on the current page.
    pub rows: Vec<ViewRow<'a>>,
    /// Every row after search, filters and sort (all pages).
    pub filtered: Vec<&'a Row>,
    pub total_filtered: usize,
    /// At least 1.
    pub total_pages: usize,
    /// The effective (clamped) page.
    pub current_page: usize,
    /// Bulk actions the caller may invoke.
    pub bulk_actions: Vec<&'a ActionDef>,
}

impl<'a> View<'a> {
    pub(crate) fn assemble(rows: &'a [Row], config: &'a TableConfig, derived: &Derived, roles: &Roles) -> Self {
        let row_actions = allowed_actions(&config.actions, &config.permissions, roles);

        let page = derived
            .page()
            .iter()
            .map(|&i| ViewRow {
                row: &rows[i],
                id: rows[i].id(),
                actions: row_actions.clone(),
            })
            .collect();

        Self {
            rows: page,
            filtered: derived.order.iter().map(|&i| &rows[i]).collect(),
            total_filtered: derived.order.len(),
            total_pages: derived.window.total_pages,
            current_page: derived.window.current_page,
            bulk_actions: allowed_actions(&config.bulk_actions, &config.permissions, roles),
        }
    }

    /// The rows on the current page.
    pub fn page_rows(&self) -> Vec<&'a Row> {
        self.rows.iter().map(|r| r.row).collect()
    }

    /// Identities of the rows on the current page.
    pub fn page_ids(&self) -> Vec<RowId> {
        self.rows.iter().filter_map(|r| r.id.clone()).collect()
    }

    /// Identities of every filtered row.
    pub fn filtered_ids(&self) -> Vec<RowId> {
        self.filtered.iter().filter_map(|r| r.id()).collect()
    }
}

/// Computes the view for one state. Pure and deterministic.
pub fn compute_view<'a>(rows: &'a [Row], config: &'a TableConfig, state: &UiState, roles: &Roles) -> View<'a> {
    let derived = derive(rows, config, state);
    View::assemble(rows, config, &derived, roles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Accessor;
    use crate::config::ActionDef;
    use crate::config::Capability;
    use crate::config::ColumnDef;
    use crate::config::FilterDef;
    use crate::config::FilterType;
    use crate::config::PaginationConfig;
    use crate::config::Permissions;
    use crate::config::SearchConfig;
    use crate::error::AccessorError;
    use crate::model::Value;

    fn rows(n: usize) -> Vec<Row> {
        (1..=n)
            .map(|i| {
                Row::new()
                    .set("id", i as i64)
                    .set("name", format!("Row {}", i))
                    .set("qty", (i % 4) as i64)
            })
            .collect()
    }

    fn config() -> TableConfig {
        TableConfig::new("t")
            .column(ColumnDef::text("name", "Name").sortable())
            .column(ColumnDef::text("qty", "Qty").sortable())
            .filter(FilterDef::new("qty", "Min qty", FilterType::Number))
            .action(ActionDef::new("edit", "Edit"))
            .action(ActionDef::new("delete", "Delete").destructive())
            .bulk_action(ActionDef::new("purge", "Purge").destructive())
            .with_search(SearchConfig::default().with_fields(["name"]))
    }

    #[test]
    fn test_pages() {
        let rows = rows(12);
        let config = config();
        let state = UiState::from_config(&config);

        let first = compute_view(&rows, &config, &state, &Roles::none());
        assert_eq!(first.rows.len(), 10);
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.total_filtered, 12);

        let second = compute_view(&rows, &config, &state.clone().with_page(2), &Roles::none());
        assert_eq!(second.rows.len(), 2);
        assert_eq!(second.current_page, 2);
    }

    #[test]
    fn test_out_of_range_page_is_clamped() {
        let rows = rows(3);
        let config = config();
        let state = UiState::from_config(&config).with_page(7);
        let view = compute_view(&rows, &config, &state, &Roles::none());
        assert_eq!(view.current_page, 1);
        assert_eq!(view.rows.len(), 3);
    }

    #[test]
    fn test_search_then_filter_then_sort() {
        let rows = rows(12);
        let config = config();
        let state = UiState::from_config(&config)
            .with_search("row 1")
            .with_filter("qty", 2.0)
            .with_sort(SortSpec::desc("name"));

        // "Row 1", "Row 10", "Row 11", "Row 12" match; qty >= 2 keeps 10, 11
        let view = compute_view(&rows, &config, &state, &Roles::none());
        let names: Vec<_> = view
            .filtered
            .iter()
            .map(|r| r.get_str("name").unwrap().unwrap_or_default().to_string())
            .collect();
        assert_eq!(names, vec!["Row 11", "Row 10"]);
    }

    #[test]
    fn test_disabled_search_ignores_term() {
        let rows = rows(4);
        let config = config().with_search(SearchConfig::disabled());
        let state = UiState::from_config(&config).with_search("nothing matches this");
        assert_eq!(compute_view(&rows, &config, &state, &Roles::none()).total_filtered, 4);
    }

    #[test]
    fn test_disabled_pagination_shows_everything() {
        let rows = rows(30);
        let config = config().with_pagination(PaginationConfig::disabled());
        let view = compute_view(&rows, &config, &UiState::from_config(&config), &Roles::none());
        assert_eq!(view.rows.len(), 30);
        assert_eq!(view.total_pages, 1);
    }

    #[test]
    fn test_actions_gated_not_rows() {
        let rows = rows(2);
        let config = config().with_permissions(
            Permissions::new()
                .grant(Capability::Update, ["editor", "admin"])
                .grant(Capability::Delete, ["admin"]),
        );
        let state = UiState::from_config(&config);

        let editor = compute_view(&rows, &config, &state, &Roles::from("editor"));
        assert_eq!(editor.rows.len(), 2);
        let ids: Vec<_> = editor.rows[0].actions.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["edit"]);
        assert!(editor.bulk_actions.is_empty());

        let admin = compute_view(&rows, &config, &state, &Roles::from("admin"));
        assert_eq!(admin.rows[1].actions.len(), 2);
        assert_eq!(admin.bulk_actions.len(), 1);
    }

    #[test]
    fn test_rows_without_identity_are_shown() {
        let rows = vec![Row::new().set("name", "anonymous"), Row::new().set("_id", "x").set("id", 1)];
        let config = config();
        let view = compute_view(&rows, &config, &UiState::from_config(&config), &Roles::none());
        assert_eq!(view.rows.len(), 2);
        assert!(view.rows[0].id.is_none());
        assert_eq!(view.page_ids(), vec![RowId::from("x")]);
    }

    fn margin(row: &Row) -> Result<Value, AccessorError> {
        let revenue = row.get_f64("revenue")?.unwrap_or(0.0);
        let cost = row.get_f64("cost")?.unwrap_or(0.0);
        if cost == 0.0 {
            return Err(AccessorError::derive("no cost"));
        }
        Ok(Value::from(revenue / cost))
    }

    fn margin_table() -> (Vec<Row>, TableConfig) {
        let rows = vec![
            Row::new().set("_id", "a").set("revenue", 10).set("cost", 5),
            Row::new().set("_id", "b").set("revenue", 4).set("cost", 0),
            Row::new().set("_id", "c").set("revenue", 9).set("cost", 1),
        ];
        let config = TableConfig::new("t")
            .column(ColumnDef::text("margin", "Margin").sortable().derive(margin))
            .filter(FilterDef::new("margin", "Min margin", FilterType::Number).accessor(Accessor::derive(margin)));
        (rows, config)
    }

    #[test]
    fn test_failing_accessor_sorts_last_both_ways() {
        let (rows, config) = margin_table();

        let asc = UiState::from_config(&config).with_sort(SortSpec::asc("margin"));
        let view = compute_view(&rows, &config, &asc, &Roles::none());
        assert_eq!(view.filtered_ids(), vec![RowId::from("a"), RowId::from("c"), RowId::from("b")]);

        let desc = UiState::from_config(&config).with_sort(SortSpec::desc("margin"));
        let view = compute_view(&rows, &config, &desc, &Roles::none());
        assert_eq!(view.filtered_ids(), vec![RowId::from("c"), RowId::from("a"), RowId::from("b")]);
    }

    #[test]
    fn test_failing_accessor_fails_filter() {
        let (rows, config) = margin_table();
        let state = UiState::from_config(&config).with_filter("margin", 0.0);

        let view = compute_view(&rows, &config, &state, &Roles::none());
        assert_eq!(view.filtered_ids(), vec![RowId::from("a"), RowId::from("c")]);
        assert_eq!(view.total_filtered, 2);
    }
}
