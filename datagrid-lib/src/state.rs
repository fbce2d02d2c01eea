//! Per-table UI state.

use std::collections::BTreeMap;

use crate::config::TableConfig;
use crate::error::StateError;
use crate::selection::Selection;
use crate::selection::SelectionMode;
use crate::view::Direction;
use crate::view::FilterValue;
use crate::view::SortSpec;

/// Everything the user has chosen for one table instance.
///
/// The validated mutators check ids against the config; the `with_*`
/// builders do not and exist for assembling state directly. The view
/// pipeline tolerates unknown filters and out-of-range pages either way.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UiState {
    /// Filter id to current value. Empty values are never stored.
    pub filter_values: BTreeMap<String, FilterValue>,
    pub search_term: String,
    pub sort: Option<SortSpec>,
    /// 1-based.
    pub current_page: usize,
    pub items_per_page: usize,
    pub selection: Selection,
}

impl UiState {
    /// Initial state: the config's default sort and page size, page 1.
    pub fn from_config(config: &TableConfig) -> Self {
        Self {
            filter_values: BTreeMap::new(),
            search_term: String::new(),
            sort: config
                .sorting
                .enabled
                .then(|| config.sorting.default_sort.clone())
                .flatten(),
            current_page: 1,
            items_per_page: config.pagination.items_per_page.max(1),
            selection: Selection::new(),
        }
    }

    // =========================================================================
    // Builder
    // =========================================================================

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_filter(mut self, id: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filter_values.insert(id.into(), value.into());
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.current_page = page;
        self
    }

    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection = Selection::with_mode(mode);
        self
    }

    // =========================================================================
    // Validated mutators
    // =========================================================================

    /// Sets a filter value, coercing text input to the filter's type.
    ///
    /// An empty value clears the filter. Resets to page 1.
    pub fn set_filter(&mut self, config: &TableConfig, id: &str, value: FilterValue) -> Result<(), StateError> {
        let filter = config
            .filter_by_id(id)
            .ok_or_else(|| StateError::UnknownFilter(id.to_string()))?;
        let value = value.coerce(filter)?;
        if value.is_empty() {
            self.filter_values.remove(id);
        } else {
            self.filter_values.insert(id.to_string(), value);
        }
        self.current_page = 1;
        Ok(())
    }

    /// Clears one filter. Resets to page 1.
    pub fn clear_filter(&mut self, id: &str) {
        self.filter_values.remove(id);
        self.current_page = 1;
    }

    /// Clears every filter. Resets to page 1.
    pub fn clear_filters(&mut self) {
        self.filter_values.clear();
        self.current_page = 1;
    }

    /// Sets the search term. Resets to page 1.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.current_page = 1;
    }

    /// Sets or clears the sort.
    pub fn set_sort(&mut self, config: &TableConfig, sort: Option<SortSpec>) -> Result<(), StateError> {
        if let Some(spec) = &sort {
            check_sortable(config, &spec.column)?;
        }
        self.sort = sort;
        Ok(())
    }

    /// Cycles the sort on a column: ascending, descending, none.
    ///
    /// Switching to another column starts at ascending. Returns the new sort.
    pub fn toggle_sort(&mut self, config: &TableConfig, column: &str) -> Result<Option<SortSpec>, StateError> {
        check_sortable(config, column)?;
        self.sort = match self.sort.take() {
            Some(current) if current.column == column => match current.direction {
                Direction::Asc => Some(SortSpec::desc(column)),
                Direction::Desc => None,
            },
            _ => Some(SortSpec::asc(column)),
        };
        Ok(self.sort.clone())
    }

    /// Sets the requested page; clamped on the next recompute.
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    /// Sets the page size, clamped to the nearest configured option.
    ///
    /// Resets to page 1 and returns the size applied.
    pub fn set_items_per_page(&mut self, config: &TableConfig, requested: usize) -> usize {
        self.items_per_page = config.pagination.clamp_items_per_page(requested);
        self.current_page = 1;
        self.items_per_page
    }

    /// Page size in effect, or `None` when pagination is disabled.
    pub fn page_size(&self, config: &TableConfig) -> Option<usize> {
        config.pagination.enabled.then_some(self.items_per_page.max(1))
    }
}

fn check_sortable(config: &TableConfig, column: &str) -> Result<(), StateError> {
    if !config.sorting.enabled {
        return Err(StateError::SortingDisabled);
    }
    let def = config
        .column_by_id(column)
        .ok_or_else(|| StateError::UnknownColumn(column.to_string()))?;
    if !def.sortable {
        return Err(StateError::NotSortable(column.to_string()));
    }
    Ok(())
}
