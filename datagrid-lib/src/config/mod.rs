//! Declarative table configuration.
//!
//! A [`TableConfig`] describes columns, filters, actions and the behavior of
//! every pipeline stage. It can be declared in JSON and finished in Rust:
//!
//! ```
//! use datagrid_lib::config::{handler_fn, TableConfig};
//!
//! let json = r#"{
//!     "id": "customers",
//!     "title": "Customers",
//!     "columns": [
//!         {"id": "name", "label": "Name", "sortable": true},
//!         {"id": "created", "label": "Created", "type": "date"}
//!     ],
//!     "filters": [{"id": "status", "label": "Status", "type": "select"}],
//!     "bulkActions": [{"id": "delete", "label": "Delete", "variant": "destructive"}],
//!     "pagination": {"itemsPerPage": 25},
//!     "permissions": {"read": ["viewer", "admin"], "delete": ["admin"]}
//! }"#;
//!
//! let config = TableConfig::from_json(json)
//!     .unwrap()
//!     .bind_action("delete", handler_fn(|_| async { Ok(()) }));
//! assert_eq!(config.pagination.items_per_page, 25);
//! assert!(config.find_action("delete").unwrap().has_handler());
//! ```

mod action;
mod column;
mod filter;
mod permissions;
mod settings;

pub use action::*;
pub use column::*;
pub use filter::*;
pub use permissions::*;
pub use settings::*;

use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::ConfigError;

/// The full description of one table instance.
///
/// Treated as constant for the lifetime of a
/// [`TableController`](crate::controller::TableController).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Resource the data source collaborator fetches from. Opaque here.
    #[serde(default)]
    pub api_endpoint: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
    #[serde(default)]
    pub filters: Vec<FilterDef>,
    /// Per-row actions.
    #[serde(default)]
    pub actions: Vec<ActionDef>,
    /// Actions on the selection.
    #[serde(default)]
    pub bulk_actions: Vec<ActionDef>,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub sorting: SortingConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub permissions: Permissions,
}

/// Which action list an action belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionScope {
    /// Listed in `actions`; runs against one row.
    Row,
    /// Listed in `bulkActions`; runs against the selection.
    Bulk,
}

impl ActionScope {
    /// The scope an invocation targets: `Row` with a target row, else `Bulk`.
    pub fn for_target(has_row: bool) -> Self {
        if has_row { ActionScope::Row } else { ActionScope::Bulk }
    }

    fn other(self) -> Self {
        match self {
            ActionScope::Row => ActionScope::Bulk,
            ActionScope::Bulk => ActionScope::Row,
        }
    }
}

impl TableConfig {
    /// Creates a config with default settings and nothing declared.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            description: None,
            api_endpoint: None,
            columns: Vec::new(),
            filters: Vec::new(),
            actions: Vec::new(),
            bulk_actions: Vec::new(),
            pagination: PaginationConfig::default(),
            sorting: SortingConfig::default(),
            search: SearchConfig::default(),
            export: ExportConfig::default(),
            audit: AuditConfig::default(),
            permissions: Permissions::default(),
        }
    }

    /// Parses a config from JSON and validates it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: TableConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Builder
    // =========================================================================

    /// Sets the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the API endpoint.
    pub fn api_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api_endpoint = Some(endpoint.into());
        self
    }

    /// Appends a column.
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends a filter.
    pub fn filter(mut self, filter: FilterDef) -> Self {
        self.filters.push(filter);
        self
    }

    /// Appends a row action.
    pub fn action(mut self, action: ActionDef) -> Self {
        self.actions.push(action);
        self
    }

    /// Appends a bulk action.
    pub fn bulk_action(mut self, action: ActionDef) -> Self {
        self.bulk_actions.push(action);
        self
    }

    pub fn with_pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn with_sorting(mut self, sorting: SortingConfig) -> Self {
        self.sorting = sorting;
        self
    }

    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    pub fn with_export(mut self, export: ExportConfig) -> Self {
        self.export = export;
        self
    }

    pub fn with_audit(mut self, audit: AuditConfig) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }

    /// Binds a handler to every action (row and bulk) with the given id.
    ///
    /// Unknown ids are ignored; validation is not affected by handlers.
    pub fn bind_action(mut self, id: &str, handler: impl ActionHandler + 'static) -> Self {
        let handler: Arc<dyn ActionHandler> = Arc::new(handler);
        let mut bound = false;
        for action in self
            .actions
            .iter_mut()
            .chain(self.bulk_actions.iter_mut())
            .filter(|a| a.id == id)
        {
            action.handler = Some(handler.clone());
            bound = true;
        }
        if !bound {
            log::warn!("table '{}': no action '{}' to bind a handler to", self.id, id);
        }
        self
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Finds a column by id.
    pub fn column_by_id(&self, id: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Finds a filter by id.
    pub fn filter_by_id(&self, id: &str) -> Option<&FilterDef> {
        self.filters.iter().find(|f| f.id == id)
    }

    /// Finds an action by id, row actions first.
    pub fn find_action(&self, id: &str) -> Option<&ActionDef> {
        self.find_scoped_action(id, ActionScope::Row).map(|(action, _)| action)
    }

    /// Finds an action by id in one list only.
    pub fn scoped_action(&self, id: &str, scope: ActionScope) -> Option<&ActionDef> {
        let list = match scope {
            ActionScope::Row => &self.actions,
            ActionScope::Bulk => &self.bulk_actions,
        };
        list.iter().find(|a| a.id == id)
    }

    /// Finds an action by id, looking in the `preferred` list first.
    ///
    /// A row action and a bulk action may share an id (a row `delete` next
    /// to a bulk `delete`); the caller picks one through `preferred`.
    pub fn find_scoped_action(&self, id: &str, preferred: ActionScope) -> Option<(&ActionDef, ActionScope)> {
        let other = preferred.other();
        self.scoped_action(id, preferred)
            .map(|a| (a, preferred))
            .or_else(|| self.scoped_action(id, other).map(|a| (a, other)))
    }

    /// Columns that carry row data, in definition order.
    pub fn data_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.column_type.is_data())
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Checks ids, default sort and pagination.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::MissingTableId);
        }

        check_ids("column", self.columns.iter().map(|c| c.id.as_str()))?;
        check_ids("filter", self.filters.iter().map(|f| f.id.as_str()))?;
        check_ids("action", self.actions.iter().map(|a| a.id.as_str()))?;
        check_ids("bulk action", self.bulk_actions.iter().map(|a| a.id.as_str()))?;

        if let Some(sort) = &self.sorting.default_sort {
            let column = self
                .column_by_id(&sort.column)
                .ok_or_else(|| ConfigError::UnknownSortColumn(sort.column.clone()))?;
            if !column.sortable {
                return Err(ConfigError::UnsortableColumn(sort.column.clone()));
            }
        }

        let pagination = &self.pagination;
        if pagination.items_per_page == 0 {
            return Err(ConfigError::InvalidPagination(
                "itemsPerPage must be at least 1".to_string(),
            ));
        }
        if pagination.items_per_page_options.contains(&0) {
            return Err(ConfigError::InvalidPagination(
                "itemsPerPageOptions must all be at least 1".to_string(),
            ));
        }
        if !pagination.items_per_page_options.is_empty()
            && !pagination
                .items_per_page_options
                .contains(&pagination.items_per_page)
        {
            return Err(ConfigError::InvalidPagination(format!(
                "itemsPerPage {} is not one of {:?}",
                pagination.items_per_page, pagination.items_per_page_options
            )));
        }

        Ok(())
    }
}

fn check_ids<'a>(kind: &'static str, ids: impl Iterator<Item = &'a str>) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for (index, id) in ids.enumerate() {
        if id.trim().is_empty() {
            return Err(ConfigError::MissingId { kind, index });
        }
        if !seen.insert(id) {
            return Err(ConfigError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::SortSpec;

    fn base() -> TableConfig {
        TableConfig::new("t")
            .column(ColumnDef::text("name", "Name").sortable())
            .column(ColumnDef::text("city", "City"))
    }

    #[test]
    fn test_defaults() {
        let config: TableConfig = serde_json::from_str(r#"{"id": "t"}"#).unwrap();
        assert!(config.pagination.enabled);
        assert_eq!(config.pagination.items_per_page, 10);
        assert!(config.sorting.enabled);
        assert!(config.sorting.default_sort.is_none());
        assert!(config.search.enabled);
        assert!(config.export.enabled);
        assert!(!config.audit.enabled);
        assert!(config.permissions.is_unrestricted());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_column_id() {
        let config = base().column(ColumnDef::text("name", "Again"));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateId { kind: "column", .. })
        ));
    }

    #[test]
    fn test_missing_ids() {
        assert!(matches!(
            TableConfig::new(" ").validate(),
            Err(ConfigError::MissingTableId)
        ));
        let config = base().filter(FilterDef::new("", "Nameless", FilterType::Text));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingId { kind: "filter", index: 0 })
        ));
    }

    #[test]
    fn test_default_sort_checked() {
        let config = base().with_sorting(SortingConfig::default().with_default_sort(SortSpec::asc("city")));
        assert!(matches!(config.validate(), Err(ConfigError::UnsortableColumn(_))));

        let config = base().with_sorting(SortingConfig::default().with_default_sort(SortSpec::asc("zip")));
        assert!(matches!(config.validate(), Err(ConfigError::UnknownSortColumn(_))));

        let config = base().with_sorting(SortingConfig::default().with_default_sort(SortSpec::desc("name")));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_items_per_page_must_be_an_option() {
        let config = base().with_pagination(PaginationConfig::default().with_items_per_page(7));
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPagination(_))));

        let config = base().with_pagination(PaginationConfig::default().with_items_per_page(0).with_options(vec![]));
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPagination(_))));
    }

    #[test]
    fn test_unsupported_type_is_parse_error() {
        let result = TableConfig::from_json(r#"{"id": "t", "filters": [{"id": "f", "type": "fuzzy"}]}"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_bind_action_and_scope() {
        let config = base()
            .action(ActionDef::new("edit", "Edit"))
            .bulk_action(ActionDef::new("delete", "Delete").destructive())
            .bind_action("delete", handler_fn(|_| async { Ok(()) }));

        let (action, scope) = config.find_scoped_action("delete", ActionScope::Row).unwrap();
        assert_eq!(scope, ActionScope::Bulk);
        assert!(action.has_handler());
        assert!(!config.find_action("edit").unwrap().has_handler());
        assert!(config.find_action("nope").is_none());
    }

    #[test]
    fn test_shared_id_resolves_by_preferred_scope() {
        let config = base()
            .action(ActionDef::new("delete", "Delete row"))
            .bulk_action(ActionDef::new("delete", "Delete selected"))
            .bind_action("delete", handler_fn(|_| async { Ok(()) }));
        assert!(config.validate().is_ok());

        let (row, scope) = config.find_scoped_action("delete", ActionScope::Row).unwrap();
        assert_eq!((row.label.as_str(), scope), ("Delete row", ActionScope::Row));

        let (bulk, scope) = config.find_scoped_action("delete", ActionScope::Bulk).unwrap();
        assert_eq!((bulk.label.as_str(), scope), ("Delete selected", ActionScope::Bulk));
        assert!(bulk.has_handler());
    }
}
