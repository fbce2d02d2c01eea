//! The table controller: owner of one table instance's dataset and state.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use chrono::Utc;

use crate::config::ActionScope;
use crate::config::Invocation;
use crate::config::Roles;
use crate::config::TableConfig;
use crate::dispatch;
use crate::dispatch::ActionRequest;
use crate::dispatch::AuditSink;
use crate::dispatch::Confirm;
use crate::dispatch::Dispatcher;
use crate::dispatch::Outcome;
use crate::dispatch::RefreshChannel;
use crate::dispatch::RefreshSignal;
use crate::dispatch::RefreshWatcher;
use crate::error::ConfigError;
use crate::error::DispatchError;
use crate::error::ExportError;
use crate::error::SourceError;
use crate::error::StateError;
use crate::export::ExportFile;
use crate::export::ExportFormat;
use crate::export::Exporter;
use crate::model::Row;
use crate::model::RowId;
use crate::notice::Notice;
use crate::selection::SelectionMode;
use crate::source::DataSource;
use crate::state::UiState;
use crate::view;
use crate::view::Derived;
use crate::view::FilterValue;
use crate::view::SortSpec;
use crate::view::View;

/// Builder for [`TableController`].
pub struct TableControllerBuilder {
    config: TableConfig,
    rows: Vec<Row>,
    roles: Roles,
    selection_mode: SelectionMode,
    confirm: Option<Arc<dyn Confirm>>,
    audit: Option<Arc<dyn AuditSink>>,
    exporter: Exporter,
}

impl TableControllerBuilder {
    /// Sets the initial rows.
    pub fn rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    /// Sets the caller's roles.
    pub fn roles(mut self, roles: impl Into<Roles>) -> Self {
        self.roles = roles.into();
        self
    }

    pub fn selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    /// Sets the confirmer for destructive actions. Without one, destructive
    /// actions are always declined.
    pub fn confirm(mut self, confirm: impl Confirm + 'static) -> Self {
        self.confirm = Some(Arc::new(confirm));
        self
    }

    /// Sets the audit sink. Defaults to the log.
    pub fn audit_sink(mut self, sink: impl AuditSink + 'static) -> Self {
        self.audit = Some(Arc::new(sink));
        self
    }

    /// Sets the serializer registry used by [`TableController::export`].
    pub fn exporter(mut self, exporter: Exporter) -> Self {
        self.exporter = exporter;
        self
    }

    /// Validates the config and builds the controller.
    pub fn build(self) -> Result<TableController, ConfigError> {
        self.config.validate()?;

        let refresh = RefreshChannel::new();
        let watcher = refresh.watcher();
        let mut dispatcher = Dispatcher::new(Arc::new(refresh.clone()));
        if let Some(confirm) = self.confirm {
            dispatcher = dispatcher.with_confirm(confirm);
        }
        if let Some(audit) = self.audit {
            dispatcher = dispatcher.with_audit_sink(audit);
        }

        let state = UiState::from_config(&self.config).with_selection_mode(self.selection_mode);
        let derived = view::derive(&self.rows, &self.config, &state);

        let mut controller = TableController {
            config: self.config,
            rows: self.rows,
            state,
            roles: self.roles,
            derived,
            dispatcher,
            exporter: self.exporter,
            refresh,
            watcher,
            notices: Vec::new(),
        };
        controller.recompute();

        log::debug!(
            "table '{}': created with {} rows",
            controller.config.id,
            controller.rows.len()
        );
        Ok(controller)
    }
}

/// Holds the raw dataset, the config and the UI state of one table, and
/// recomputes the derived view after every mutation.
///
/// After each recompute the current page is clamped into range and every
/// selected identity outside the filtered set is dropped.
///
/// # Example
///
/// ```
/// use datagrid_lib::config::{ColumnDef, TableConfig};
/// use datagrid_lib::controller::TableController;
/// use datagrid_lib::model::Row;
///
/// let config = TableConfig::new("customers")
///     .column(ColumnDef::text("name", "Name").sortable());
/// let rows = (1..=12)
///     .map(|i| Row::new().set("id", i).set("name", format!("Customer {}", i)))
///     .collect();
///
/// let mut table = TableController::builder(config).rows(rows).build().unwrap();
/// assert_eq!(table.total_pages(), 2);
///
/// table.set_search("customer 1");
/// assert_eq!(table.total_filtered(), 4);
/// assert_eq!(table.view().rows.len(), 4);
/// ```
pub struct TableController {
    config: TableConfig,
    rows: Vec<Row>,
    state: UiState,
    roles: Roles,
    derived: Derived,
    dispatcher: Dispatcher,
    exporter: Exporter,
    refresh: RefreshChannel,
    watcher: RefreshWatcher,
    notices: Vec<Notice>,
}

impl TableController {
    /// Starts building a controller for a config.
    pub fn builder(config: TableConfig) -> TableControllerBuilder {
        TableControllerBuilder {
            config,
            rows: Vec::new(),
            roles: Roles::none(),
            selection_mode: SelectionMode::default(),
            confirm: None,
            audit: None,
            exporter: Exporter::default(),
        }
    }

    /// Creates a controller with no rows and default collaborators.
    pub fn new(config: TableConfig) -> Result<Self, ConfigError> {
        Self::builder(config).build()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// The raw dataset.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn roles(&self) -> &Roles {
        &self.roles
    }

    /// The derived view for the current state and roles.
    pub fn view(&self) -> View<'_> {
        View::assemble(&self.rows, &self.config, &self.derived, &self.roles)
    }

    pub fn total_filtered(&self) -> usize {
        self.derived.order.len()
    }

    pub fn total_pages(&self) -> usize {
        self.derived.window.total_pages
    }

    pub fn current_page(&self) -> usize {
        self.derived.window.current_page
    }

    /// Rows after search, filters and sort, across all pages.
    pub fn filtered_rows(&self) -> Vec<&Row> {
        self.derived.order.iter().map(|&i| &self.rows[i]).collect()
    }

    /// The dispatcher, for running an [`ActionRequest`] elsewhere.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// A handle that signals this table to refresh.
    pub fn refresh_handle(&self) -> Arc<dyn RefreshSignal> {
        Arc::new(self.refresh.clone())
    }

    /// Drains the notices produced since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // =========================================================================
    // Dataset and roles
    // =========================================================================

    /// Replaces the raw dataset.
    ///
    /// Filters, search and sort are kept and re-applied; selected rows that
    /// are no longer in the filtered set are deselected.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        log::debug!("table '{}': dataset replaced ({} rows)", self.config.id, rows.len());
        self.rows = rows;
        self.recompute();
    }

    /// Changes the caller's roles. Only action visibility is affected.
    pub fn set_roles(&mut self, roles: impl Into<Roles>) {
        self.roles = roles.into();
    }

    // =========================================================================
    // UI state
    // =========================================================================

    /// Sets the search term and returns to page 1.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.state.set_search(term);
        log::debug!("table '{}': search '{}'", self.config.id, self.state.search_term);
        self.recompute();
    }

    /// Sets a filter value and returns to page 1. An empty value clears it.
    pub fn set_filter(&mut self, id: &str, value: impl Into<FilterValue>) -> Result<(), StateError> {
        self.state.set_filter(&self.config, id, value.into())?;
        log::debug!("table '{}': filter '{}' set", self.config.id, id);
        self.recompute();
        Ok(())
    }

    pub fn clear_filter(&mut self, id: &str) {
        self.state.clear_filter(id);
        self.recompute();
    }

    pub fn clear_filters(&mut self) {
        self.state.clear_filters();
        self.recompute();
    }

    /// Sets or clears the sort.
    pub fn set_sort(&mut self, sort: Option<SortSpec>) -> Result<(), StateError> {
        self.state.set_sort(&self.config, sort)?;
        log::debug!("table '{}': sort {:?}", self.config.id, self.state.sort);
        self.recompute();
        Ok(())
    }

    /// Cycles a column's sort: ascending, descending, none.
    pub fn toggle_sort(&mut self, column: &str) -> Result<Option<SortSpec>, StateError> {
        let sort = self.state.toggle_sort(&self.config, column)?;
        log::debug!("table '{}': sort {:?}", self.config.id, sort);
        self.recompute();
        Ok(sort)
    }

    /// Moves to a page, clamped into range. Returns the page shown.
    pub fn set_page(&mut self, page: usize) -> usize {
        self.state.set_page(page);
        self.recompute();
        self.current_page()
    }

    /// Moves to the next page. Returns `false` on the last page.
    pub fn next_page(&mut self) -> bool {
        if !self.derived.window.has_next() {
            return false;
        }
        self.set_page(self.current_page() + 1);
        true
    }

    /// Moves to the previous page. Returns `false` on the first page.
    pub fn prev_page(&mut self) -> bool {
        if !self.derived.window.has_prev() {
            return false;
        }
        self.set_page(self.current_page() - 1);
        true
    }

    /// Sets the page size, clamped to the nearest option, and returns to
    /// page 1. Returns the size applied.
    pub fn set_items_per_page(&mut self, requested: usize) -> usize {
        let applied = self.state.set_items_per_page(&self.config, requested);
        log::debug!("table '{}': {} rows per page", self.config.id, applied);
        self.recompute();
        applied
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Flips a row's selection. Returns `true` if it is now selected.
    ///
    /// Only rows in the filtered set can be selected.
    pub fn toggle_row(&mut self, id: &RowId) -> Result<bool, StateError> {
        if !self.filtered_id_set().contains(id) {
            return Err(StateError::UnknownRow(id.to_string()));
        }
        Ok(self.state.selection.toggle(id.clone()))
    }

    /// Selects exactly the given rows, ignoring any outside the filtered set.
    pub fn select_all<I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = RowId>,
    {
        let filtered = self.filtered_id_set();
        let ids: Vec<RowId> = ids.into_iter().filter(|id| filtered.contains(id)).collect();
        self.state.selection.select_all(ids)
    }

    /// Selects the rows on the current page.
    pub fn select_page(&mut self) -> usize {
        let ids: Vec<RowId> = self.derived.page().iter().filter_map(|&i| self.rows[i].id()).collect();
        self.state.selection.select_all(ids)
    }

    /// Selects every filtered row.
    pub fn select_all_filtered(&mut self) -> usize {
        let ids = self.derived.filtered_ids(&self.rows);
        self.state.selection.select_all(ids)
    }

    pub fn clear_selection(&mut self) {
        self.state.selection.clear();
    }

    pub fn selected_ids(&self) -> Vec<RowId> {
        self.state.selection.selected()
    }

    /// Selected rows in display order.
    pub fn selected_rows(&self) -> Vec<&Row> {
        let selection = &self.state.selection;
        self.derived
            .order
            .iter()
            .map(|&i| &self.rows[i])
            .filter(|row| row.id().is_some_and(|id| selection.is_selected(&id)))
            .collect()
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Snapshots an action and its target rows into an owned request.
    ///
    /// With `row`, the id of a filtered row, the row action of that id is
    /// used; without it the bulk action of that id runs against the current
    /// selection. Rows hidden by search or filters cannot be targeted.
    pub fn action_request(&self, action_id: &str, row: Option<&RowId>) -> Result<ActionRequest, DispatchError> {
        let (_, scope) = self
            .config
            .find_scoped_action(action_id, ActionScope::for_target(row.is_some()))
            .ok_or_else(|| DispatchError::UnknownAction(action_id.to_string()))?;

        let invocation = match scope {
            ActionScope::Row => {
                let target = row
                    .and_then(|id| {
                        self.derived
                            .order
                            .iter()
                            .map(|&i| &self.rows[i])
                            .find(|r| r.id().as_ref() == Some(id))
                    })
                    .ok_or_else(|| DispatchError::NoTarget(action_id.to_string()))?;
                Invocation::row(target.clone())
            }
            ActionScope::Bulk => Invocation::bulk(self.selected_rows().into_iter().cloned().collect()),
        };

        ActionRequest::new(&self.config, action_id, invocation, self.roles.clone())
    }

    /// Builds a request, dispatches it and applies the result.
    ///
    /// The table state is not borrowed while the handler runs; see
    /// [`TableController::action_request`] for running it elsewhere.
    pub async fn dispatch(&mut self, action_id: &str, row: Option<&RowId>) -> Result<Outcome, DispatchError> {
        let result = match self.action_request(action_id, row) {
            Ok(request) => self.dispatcher.clone().dispatch(request).await,
            Err(err) => Err(err),
        };
        self.apply_result(action_id, row, &result);
        result
    }

    /// Applies a dispatch result to the table: records its notice and, after
    /// a successful bulk action, clears the selection.
    ///
    /// `row` must be what was passed to [`TableController::action_request`].
    /// A failed bulk action leaves the selection as it was.
    pub fn apply_result(&mut self, action_id: &str, row: Option<&RowId>, result: &Result<Outcome, DispatchError>) {
        let preferred = ActionScope::for_target(row.is_some());
        let Some((action, scope)) = self.config.find_scoped_action(action_id, preferred) else {
            if let Err(err) = result {
                self.notices.push(Notice::warning(err.to_string()));
            }
            return;
        };
        self.notices.push(dispatch::notice(action, result));

        if scope == ActionScope::Bulk && matches!(result, Ok(Outcome::Succeeded)) {
            self.state.selection.clear();
        }
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    /// Returns `true` if a successful action asked for a refresh that has not
    /// been served yet.
    pub fn refresh_requested(&self) -> bool {
        self.watcher.is_pending()
    }

    /// Fetches the dataset from a source and replaces the rows.
    ///
    /// On failure the last good rows stay in place and an error notice is
    /// recorded.
    pub async fn refresh_from(&mut self, source: &dyn DataSource) -> Result<(), SourceError> {
        match source.fetch().await {
            Ok(rows) => {
                self.set_rows(rows);
                Ok(())
            }
            Err(err) => {
                log::warn!("table '{}': refresh failed: {}", self.config.id, err);
                self.notices.push(Notice::error(format!("Refresh failed: {}", err)));
                Err(err)
            }
        }
    }

    /// Serves a pending refresh request, if any. Returns `true` if rows were
    /// fetched.
    pub async fn refresh_if_requested(&mut self, source: &dyn DataSource) -> Result<bool, SourceError> {
        if !self.watcher.take_request() {
            return Ok(false);
        }
        self.refresh_from(source).await?;
        Ok(true)
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Exports the selection, or every filtered row when nothing is selected.
    ///
    /// The file is named after today's UTC date. Table state is not touched.
    pub fn export(&self, format: ExportFormat) -> Result<ExportFile, ExportError> {
        self.export_dated(format, Utc::now().date_naive())
    }

    /// Like [`TableController::export`] with an explicit file date.
    pub fn export_dated(&self, format: ExportFormat, date: NaiveDate) -> Result<ExportFile, ExportError> {
        let rows = if self.state.selection.is_empty() {
            self.filtered_rows()
        } else {
            self.selected_rows()
        };
        self.exporter.export(&self.config, &rows, format, date)
    }

    // =========================================================================
    // Recompute
    // =========================================================================

    fn filtered_id_set(&self) -> HashSet<RowId> {
        self.derived.filtered_ids(&self.rows).into_iter().collect()
    }

    fn recompute(&mut self) {
        self.derived = view::derive(&self.rows, &self.config, &self.state);
        self.state.current_page = self.derived.window.current_page;

        let filtered = self.derived.filtered_ids(&self.rows);
        let dropped = self.state.selection.reconcile(&filtered);
        if !dropped.is_empty() {
            log::debug!(
                "table '{}': {} selected rows left the filtered set",
                self.config.id,
                dropped.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ActionDef;
    use crate::config::ColumnDef;
    use crate::config::FilterDef;
    use crate::config::FilterType;
    use crate::config::handler_fn;
    use crate::dispatch::AutoConfirm;
    use crate::dispatch::NullAuditSink;
    use crate::source::StaticSource;

    fn rows(n: i64) -> Vec<Row> {
        (1..=n)
            .map(|i| {
                Row::new()
                    .set("id", i)
                    .set("name", format!("Row {}", i))
                    .set("status", if i % 2 == 0 { "even" } else { "odd" })
            })
            .collect()
    }

    fn config() -> TableConfig {
        TableConfig::new("t")
            .column(ColumnDef::text("name", "Name").sortable())
            .column(ColumnDef::badge("status", "Status"))
            .filter(FilterDef::new("status", "Status", FilterType::Select))
            .action(ActionDef::new("touch", "Touch"))
            .bulk_action(ActionDef::new("archive", "Archive"))
            .bind_action("touch", handler_fn(|_| async { Ok(()) }))
            .bind_action("archive", handler_fn(|_| async { Ok(()) }))
    }

    fn controller(n: i64) -> TableController {
        TableController::builder(config())
            .rows(rows(n))
            .confirm(AutoConfirm::accept())
            .audit_sink(NullAuditSink)
            .build()
            .unwrap()
    }

    #[test]
    fn test_invalid_config_fails_build() {
        let config = config().column(ColumnDef::text("name", "Dup"));
        assert!(TableController::new(config).is_err());
    }

    #[test]
    fn test_filter_resets_page_and_reconciles_selection() {
        let mut table = controller(25);
        table.set_page(3);
        assert_eq!(table.current_page(), 3);

        table.toggle_row(&RowId::from("1")).unwrap();
        table.toggle_row(&RowId::from("2")).unwrap();

        table.set_filter("status", "even").unwrap();
        assert_eq!(table.current_page(), 1);
        assert_eq!(table.selected_ids(), vec![RowId::from("2")]);
    }

    #[test]
    fn test_page_clamped_when_dataset_shrinks() {
        let mut table = controller(25);
        table.set_page(3);
        table.set_rows(rows(11));
        assert_eq!(table.current_page(), 2);
        assert_eq!(table.state().current_page, 2);
    }

    #[test]
    fn test_page_navigation() {
        let mut table = controller(12);
        assert!(!table.prev_page());
        assert!(table.next_page());
        assert_eq!(table.view().rows.len(), 2);
        assert!(!table.next_page());
        assert_eq!(table.set_page(99), 2);
    }

    #[test]
    fn test_toggle_unknown_row() {
        let mut table = controller(3);
        assert_eq!(
            table.toggle_row(&RowId::from("42")),
            Err(StateError::UnknownRow("42".to_string()))
        );
    }

    #[test]
    fn test_select_page_and_all() {
        let mut table = controller(12);
        assert_eq!(table.select_page(), 10);
        assert_eq!(table.select_all_filtered(), 12);
        assert_eq!(table.select_all(vec![RowId::from("1"), RowId::from("nope")]), 1);
        table.clear_selection();
        assert!(table.selected_ids().is_empty());
    }

    #[tokio::test]
    async fn test_bulk_success_clears_selection_and_requests_refresh() {
        let mut table = controller(4);
        table.select_all_filtered();

        let outcome = table.dispatch("archive", None).await;
        assert_eq!(outcome, Ok(Outcome::Succeeded));
        assert!(table.selected_ids().is_empty());
        assert!(table.refresh_requested());

        let source = StaticSource::new(rows(2));
        assert!(table.refresh_if_requested(&source).await.unwrap());
        assert_eq!(table.rows().len(), 2);
        assert!(!table.refresh_requested());

        let notices = table.take_notices();
        assert_eq!(notices.len(), 1);
    }

    #[tokio::test]
    async fn test_bulk_without_selection_has_no_target() {
        let mut table = controller(4);
        let result = table.dispatch("archive", None).await;
        assert_eq!(result, Err(DispatchError::NoTarget("archive".to_string())));
        assert!(!table.refresh_requested());
    }

    #[tokio::test]
    async fn test_row_action_needs_known_row() {
        let mut table = controller(4);
        assert!(table.dispatch("touch", Some(&RowId::from("3"))).await.is_ok());
        assert!(matches!(
            table.dispatch("touch", Some(&RowId::from("99"))).await,
            Err(DispatchError::NoTarget(_))
        ));
    }

    #[tokio::test]
    async fn test_row_action_ignores_hidden_rows() {
        let mut table = controller(4);
        table.set_filter("status", "even").unwrap();
        assert_eq!(
            table.dispatch("touch", Some(&RowId::from("1"))).await,
            Err(DispatchError::NoTarget("touch".to_string()))
        );
        assert_eq!(table.dispatch("touch", Some(&RowId::from("2"))).await, Ok(Outcome::Succeeded));
    }

    #[tokio::test]
    async fn test_row_and_bulk_action_share_an_id() {
        use std::sync::atomic::AtomicUsize;
        use std::sync::atomic::Ordering;

        let row_calls = Arc::new(AtomicUsize::new(0));
        let bulk_calls = Arc::new(AtomicUsize::new(0));
        let (r, b) = (row_calls.clone(), bulk_calls.clone());
        let config = config()
            .action(ActionDef::new("delete", "Delete").handler(handler_fn(move |_| {
                let r = r.clone();
                async move {
                    r.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })))
            .bulk_action(ActionDef::new("delete", "Delete selected").handler(handler_fn(move |_| {
                let b = b.clone();
                async move {
                    b.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })));
        let mut table = TableController::builder(config)
            .rows(rows(3))
            .confirm(AutoConfirm::accept())
            .audit_sink(NullAuditSink)
            .build()
            .unwrap();

        table.select_all_filtered();
        assert_eq!(table.dispatch("delete", None).await, Ok(Outcome::Succeeded));
        assert_eq!(bulk_calls.load(Ordering::SeqCst), 1);
        assert!(table.selected_ids().is_empty());

        assert_eq!(table.dispatch("delete", Some(&RowId::from("2"))).await, Ok(Outcome::Succeeded));
        assert_eq!(row_calls.load(Ordering::SeqCst), 1);
        assert_eq!(bulk_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_selection_survives_sort_and_paging() {
        let mut table = controller(12);
        table.toggle_row(&RowId::from("1")).unwrap();
        table.toggle_row(&RowId::from("12")).unwrap();
        let before = table.selected_ids();

        table.set_sort(Some(SortSpec::desc("name"))).unwrap();
        assert_eq!(table.selected_ids(), before);
        assert_eq!(table.set_page(2), 2);
        assert_eq!(table.selected_ids(), before);
        table.toggle_sort("name").unwrap();
        assert_eq!(table.selected_ids(), before);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_rows() {
        struct Broken;

        #[async_trait::async_trait]
        impl DataSource for Broken {
            async fn fetch(&self) -> Result<Vec<Row>, SourceError> {
                Err(SourceError::Fetch("offline".to_string()))
            }
        }

        let mut table = controller(5);
        assert!(table.refresh_from(&Broken).await.is_err());
        assert_eq!(table.rows().len(), 5);
        assert_eq!(table.take_notices().len(), 1);
    }

    #[test]
    fn test_export_prefers_selection() {
        let mut table = controller(3);
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        let all = table.export_dated(ExportFormat::Csv, date).unwrap();
        assert_eq!(all.row_count, 3);
        assert_eq!(all.file_name, "t_2024-01-02.csv");

        table.toggle_row(&RowId::from("2")).unwrap();
        let selected = table.export_dated(ExportFormat::Csv, date).unwrap();
        assert_eq!(String::from_utf8(selected.bytes).unwrap(), "Name,Status\nRow 2,even");
    }
}
