//! Property tests for the view pipeline and selection.

use std::collections::HashSet;

use proptest::prelude::*;

use datagrid_lib::config::ColumnDef;
use datagrid_lib::config::FilterDef;
use datagrid_lib::config::FilterType;
use datagrid_lib::config::Roles;
use datagrid_lib::config::TableConfig;
use datagrid_lib::model::Row;
use datagrid_lib::model::RowId;
use datagrid_lib::model::Value;
use datagrid_lib::selection::Selection;
use datagrid_lib::state::UiState;
use datagrid_lib::view::FilterValue;
use datagrid_lib::view::SortSpec;
use datagrid_lib::view::compute_view;

// =============================================================================
// Strategies
// =============================================================================

fn revenue_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        (-1000i64..1000).prop_map(Value::from),
        (-1000.0f64..1000.0).prop_map(Value::from),
    ]
}

fn rows_strategy() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec(("[a-zA-Z ]{0,8}", revenue_strategy()), 0..40).prop_map(|cells| {
        cells
            .into_iter()
            .enumerate()
            .map(|(i, (name, revenue))| {
                Row::new()
                    .set("id", i as i64)
                    .set("name", name)
                    .set("revenue", revenue)
            })
            .collect()
    })
}

fn sort_strategy() -> impl Strategy<Value = Option<SortSpec>> {
    prop_oneof![
        Just(None),
        Just(Some(SortSpec::asc("name"))),
        Just(Some(SortSpec::desc("name"))),
        Just(Some(SortSpec::asc("revenue"))),
        Just(Some(SortSpec::desc("revenue"))),
    ]
}

fn config() -> TableConfig {
    TableConfig::new("props")
        .column(ColumnDef::text("name", "Name").sortable())
        .column(ColumnDef::text("revenue", "Revenue").sortable())
        .filter(FilterDef::new("revenue", "Min revenue", FilterType::Number))
}

fn state(search: &str, sort: Option<SortSpec>) -> UiState {
    let mut state = UiState::from_config(&config()).with_search(search);
    state.sort = sort;
    state
}

fn ids(rows: &[&Row]) -> Vec<RowId> {
    rows.iter().filter_map(|r| r.id()).collect()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn view_is_deterministic(rows in rows_strategy(), search in "[a-z]{0,2}", sort in sort_strategy()) {
        let config = config();
        let state = state(&search, sort);

        let a = compute_view(&rows, &config, &state, &Roles::none());
        let b = compute_view(&rows, &config, &state, &Roles::none());

        prop_assert_eq!(ids(&a.filtered), ids(&b.filtered));
        prop_assert_eq!(a.page_ids(), b.page_ids());
        prop_assert_eq!(a.total_pages, b.total_pages);
    }

    #[test]
    fn adding_a_filter_never_adds_rows(
        rows in rows_strategy(),
        search in "[a-z]{0,2}",
        min in -1000.0f64..1000.0,
    ) {
        let config = config();
        let base = state(&search, None);
        let narrowed = base.clone().with_filter("revenue", FilterValue::Number(min));

        let before: HashSet<RowId> = ids(&compute_view(&rows, &config, &base, &Roles::none()).filtered)
            .into_iter()
            .collect();
        let after = ids(&compute_view(&rows, &config, &narrowed, &Roles::none()).filtered);

        prop_assert!(after.len() <= before.len());
        prop_assert!(after.iter().all(|id| before.contains(id)));
    }

    #[test]
    fn sorting_sorted_rows_keeps_their_order(rows in rows_strategy(), sort in sort_strategy()) {
        let config = config();
        let state = state("", sort);

        let first = compute_view(&rows, &config, &state, &Roles::none());
        let sorted: Vec<Row> = first.filtered.iter().map(|r| (*r).clone()).collect();
        let second = compute_view(&sorted, &config, &state, &Roles::none());

        prop_assert_eq!(ids(&first.filtered), ids(&second.filtered));
    }

    #[test]
    fn pages_cover_the_filtered_rows_exactly(
        rows in rows_strategy(),
        search in "[a-z]{0,1}",
        per_page in 1usize..15,
    ) {
        let config = config();
        let mut state = state(&search, Some(SortSpec::asc("revenue")));
        state.items_per_page = per_page;

        let first = compute_view(&rows, &config, &state, &Roles::none());
        prop_assert!(first.total_pages >= 1);

        let mut collected = Vec::new();
        for page in 1..=first.total_pages {
            let view = compute_view(&rows, &config, &state.clone().with_page(page), &Roles::none());
            prop_assert_eq!(view.current_page, page);
            prop_assert!(view.rows.len() <= per_page);
            collected.extend(view.page_ids());
        }
        prop_assert_eq!(collected, ids(&first.filtered));
    }

    #[test]
    fn reconciled_selection_is_within_filtered(
        selected in prop::collection::vec(0u32..30, 0..20),
        filtered in prop::collection::vec(0u32..30, 0..20),
    ) {
        let mut selection = Selection::new();
        selection.select_all(selected.iter().map(|n| RowId::new(n.to_string())));
        let before: HashSet<RowId> = selection.iter().cloned().collect();

        let filtered: Vec<RowId> = filtered.iter().map(|n| RowId::new(n.to_string())).collect();
        let dropped = selection.reconcile(&filtered);

        let keep: HashSet<&RowId> = filtered.iter().collect();
        prop_assert!(selection.iter().all(|id| keep.contains(id)));
        prop_assert!(dropped.iter().all(|id| !keep.contains(id)));
        prop_assert_eq!(selection.len() + dropped.len(), before.len());
    }
}
