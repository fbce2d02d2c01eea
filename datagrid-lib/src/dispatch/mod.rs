//! Action dispatch.
//!
//! A dispatch runs in explicit stages: authorize, confirm (destructive
//! actions only), execute, signal refresh. Each stage is audited when the
//! table tracks actions.
//!
//! The caller snapshots everything a dispatch needs into an owned
//! [`ActionRequest`], so the [`Dispatcher`] never borrows the table state and
//! the host can keep searching, filtering and paging while an action runs.

mod audit;
mod bulk;
mod confirm;
mod refresh;

pub use audit::*;
pub use bulk::*;
pub use confirm::*;
pub use refresh::*;

use std::sync::Arc;

use chrono::Utc;

use crate::config::ActionDef;
use crate::config::ActionScope;
use crate::config::Invocation;
use crate::config::Permissions;
use crate::config::Roles;
use crate::config::TableConfig;
use crate::error::DispatchError;
use crate::model::RowId;
use crate::notice::Notice;

/// Everything one dispatch needs, detached from the table state.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub table_id: String,
    pub action: ActionDef,
    pub scope: ActionScope,
    pub invocation: Invocation,
    pub roles: Roles,
    pub permissions: Permissions,
    /// Whether audit events are emitted.
    pub audited: bool,
}

impl ActionRequest {
    /// Looks up the action and checks the target matches its scope.
    ///
    /// An invocation with a row resolves to the row action of that id, one
    /// without to the bulk action. Row actions need `invocation.row`; bulk
    /// actions need a non-empty `invocation.selected`.
    pub fn new(config: &TableConfig, action_id: &str, invocation: Invocation, roles: Roles) -> Result<Self, DispatchError> {
        let preferred = ActionScope::for_target(invocation.row.is_some());
        let (action, scope) = config
            .find_scoped_action(action_id, preferred)
            .ok_or_else(|| DispatchError::UnknownAction(action_id.to_string()))?;

        let has_target = match scope {
            ActionScope::Row => invocation.row.is_some(),
            ActionScope::Bulk => !invocation.selected.is_empty(),
        };
        if !has_target {
            return Err(DispatchError::NoTarget(action_id.to_string()));
        }

        Ok(Self {
            table_id: config.id.clone(),
            action: action.clone(),
            scope,
            invocation,
            roles,
            permissions: config.permissions.clone(),
            audited: config.audit.tracks_actions(),
        })
    }

    /// Identities of the targeted rows that have one.
    pub fn row_ids(&self) -> Vec<RowId> {
        match &self.invocation.row {
            Some(row) => row.id().into_iter().collect(),
            None => self.invocation.selected.iter().filter_map(|r| r.id()).collect(),
        }
    }
}

/// How a dispatch that did not error ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The handler ran and succeeded; a refresh was signalled.
    Succeeded,
    /// The user declined confirmation; nothing happened.
    Declined,
}

/// The notice to show for a dispatch result.
pub fn notice(action: &ActionDef, result: &Result<Outcome, DispatchError>) -> Notice {
    let label = if action.label.is_empty() {
        action.id.as_str()
    } else {
        action.label.as_str()
    };
    match result {
        Ok(Outcome::Succeeded) => Notice::success(format!("{} succeeded", label)),
        Ok(Outcome::Declined) => Notice::info(format!("{} cancelled", label)),
        Err(err) if err.is_rejected() => Notice::warning(err.to_string()),
        Err(err) => Notice::error(err.to_string()),
    }
}

/// Runs action requests.
///
/// Cheap to clone; clones share the confirmer, audit sink and refresh signal.
#[derive(Clone)]
pub struct Dispatcher {
    confirm: Arc<dyn Confirm>,
    audit: Arc<dyn AuditSink>,
    refresh: Arc<dyn RefreshSignal>,
}

impl Dispatcher {
    /// Creates a dispatcher that declines every confirmation and audits to
    /// the log.
    pub fn new(refresh: Arc<dyn RefreshSignal>) -> Self {
        Self {
            confirm: Arc::new(AutoConfirm::decline()),
            audit: Arc::new(LogAuditSink),
            refresh,
        }
    }

    pub fn with_confirm(mut self, confirm: Arc<dyn Confirm>) -> Self {
        self.confirm = confirm;
        self
    }

    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_refresh(mut self, refresh: Arc<dyn RefreshSignal>) -> Self {
        self.refresh = refresh;
        self
    }

    /// Dispatches one action.
    ///
    /// Rejections happen before any handler runs. Declining confirmation is
    /// `Ok(Outcome::Declined)` with no side effects. A failed handler leaves
    /// the dataset alone: no refresh is signalled and partial effects are not
    /// compensated.
    pub async fn dispatch(&self, request: ActionRequest) -> Result<Outcome, DispatchError> {
        let action_id = request.action.id.clone();
        let row_ids = request.row_ids();
        let audit = |phase: AuditPhase, reason: Option<String>| {
            if request.audited {
                self.audit.emit(AuditEvent {
                    table_id: request.table_id.clone(),
                    action_id: action_id.clone(),
                    row_ids: row_ids.clone(),
                    phase,
                    reason,
                    timestamp: Utc::now(),
                    roles: request.roles.clone(),
                });
            }
        };

        audit(AuditPhase::Attempted, None);

        let capability = request.action.capability();
        if !request.permissions.allows(capability, &request.roles) {
            let err = DispatchError::Unauthorized {
                action: action_id.clone(),
                capability,
            };
            log::warn!("table '{}': {}", request.table_id, err);
            audit(AuditPhase::Rejected, Some(err.to_string()));
            return Err(err);
        }

        let Some(handler) = request.action.handler.clone() else {
            let err = DispatchError::NoHandler(action_id.clone());
            log::warn!("table '{}': {}", request.table_id, err);
            audit(AuditPhase::Rejected, Some(err.to_string()));
            return Err(err);
        };

        if request.action.is_destructive() {
            let prompt = ConfirmPrompt {
                action_id: action_id.clone(),
                label: request.action.label.clone(),
                row_ids: row_ids.clone(),
            };
            if !self.confirm.confirm(&prompt).await {
                log::debug!("table '{}': '{}' declined", request.table_id, action_id);
                audit(AuditPhase::Declined, None);
                return Ok(Outcome::Declined);
            }
            audit(AuditPhase::Confirmed, None);
        }

        log::debug!(
            "table '{}': running '{}' on {} row(s)",
            request.table_id,
            action_id,
            row_ids.len()
        );

        match handler.run(request.invocation.clone()).await {
            Ok(()) => {
                log::info!("table '{}': '{}' succeeded", request.table_id, action_id);
                audit(AuditPhase::Succeeded, None);
                self.refresh.request_refresh();
                Ok(Outcome::Succeeded)
            }
            Err(handler_err) => {
                let err = DispatchError::from_handler(action_id.clone(), handler_err);
                log::warn!("table '{}': {}", request.table_id, err);
                audit(AuditPhase::Failed, Some(err.to_string()));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use tokio::sync::mpsc::UnboundedReceiver;

    use super::*;
    use crate::config::AuditConfig;
    use crate::config::Capability;
    use crate::config::handler_fn;
    use crate::error::HandlerError;
    use crate::model::Row;

    struct Harness {
        dispatcher: Dispatcher,
        refresh: RefreshChannel,
        events: UnboundedReceiver<AuditEvent>,
    }

    fn harness(confirm: AutoConfirm) -> Harness {
        let refresh = RefreshChannel::new();
        let (sink, events) = ChannelAuditSink::new();
        let dispatcher = Dispatcher::new(Arc::new(refresh.clone()))
            .with_confirm(Arc::new(confirm))
            .with_audit_sink(Arc::new(sink));
        Harness {
            dispatcher,
            refresh,
            events,
        }
    }

    fn phases(events: &mut UnboundedReceiver<AuditEvent>) -> Vec<AuditPhase> {
        let mut phases = Vec::new();
        while let Ok(event) = events.try_recv() {
            phases.push(event.phase);
        }
        phases
    }

    fn config(calls: Arc<AtomicUsize>) -> TableConfig {
        let handler = move |_: Invocation| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        };
        TableConfig::new("orders")
            .action(ActionDef::new("edit", "Edit"))
            .action(ActionDef::new("delete", "Delete").destructive())
            .bind_action("edit", handler_fn(handler.clone()))
            .bind_action("delete", handler_fn(handler))
            .with_audit(AuditConfig::tracking())
    }

    fn row() -> Invocation {
        Invocation::row(Row::new().set("id", 7))
    }

    #[tokio::test]
    async fn test_success_refreshes_and_audits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = config(calls.clone());
        let mut h = harness(AutoConfirm::accept());
        let mut watcher = h.refresh.watcher();

        let request = ActionRequest::new(&config, "edit", row(), Roles::none()).unwrap();
        assert_eq!(h.dispatcher.dispatch(request).await, Ok(Outcome::Succeeded));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(watcher.take_request());
        assert_eq!(phases(&mut h.events), vec![AuditPhase::Attempted, AuditPhase::Succeeded]);
    }

    #[tokio::test]
    async fn test_declined_confirmation_is_noop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = config(calls.clone());
        let mut h = harness(AutoConfirm::decline());
        let mut watcher = h.refresh.watcher();

        let request = ActionRequest::new(&config, "delete", row(), Roles::none()).unwrap();
        assert_eq!(h.dispatcher.dispatch(request).await, Ok(Outcome::Declined));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!watcher.take_request());
        assert_eq!(phases(&mut h.events), vec![AuditPhase::Attempted, AuditPhase::Declined]);
    }

    #[tokio::test]
    async fn test_unauthorized_never_runs_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = config(calls.clone())
            .with_permissions(Permissions::new().grant(Capability::Update, ["editor"]));
        let mut h = harness(AutoConfirm::accept());

        let request = ActionRequest::new(&config, "delete", row(), Roles::from("editor")).unwrap();
        let err = h.dispatcher.dispatch(request).await.unwrap_err();

        assert_eq!(
            err,
            DispatchError::Unauthorized {
                action: "delete".to_string(),
                capability: Capability::Delete,
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(phases(&mut h.events), vec![AuditPhase::Attempted, AuditPhase::Rejected]);
    }

    #[tokio::test]
    async fn test_failure_does_not_refresh() {
        let config = TableConfig::new("orders")
            .action(ActionDef::new("sync", "Sync"))
            .bind_action("sync", handler_fn(|_| async { Err(HandlerError::failed("upstream 500")) }))
            .with_audit(AuditConfig::tracking());
        let mut h = harness(AutoConfirm::accept());
        let mut watcher = h.refresh.watcher();

        let request = ActionRequest::new(&config, "sync", row(), Roles::none()).unwrap();
        let result = h.dispatcher.dispatch(request).await;

        assert_eq!(
            result,
            Err(DispatchError::Action {
                action: "sync".to_string(),
                message: "upstream 500".to_string(),
            })
        );
        assert!(!watcher.take_request());
        assert_eq!(phases(&mut h.events), vec![AuditPhase::Attempted, AuditPhase::Failed]);

        let action = config.find_action("sync").unwrap();
        assert_eq!(notice(action, &result).level, crate::notice::NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_untracked_audit_is_silent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = config(calls).with_audit(AuditConfig::default());
        let mut h = harness(AutoConfirm::accept());

        let request = ActionRequest::new(&config, "edit", row(), Roles::none()).unwrap();
        h.dispatcher.dispatch(request).await.unwrap();
        assert!(phases(&mut h.events).is_empty());
    }

    #[test]
    fn test_request_checks_target() {
        let config = TableConfig::new("t")
            .action(ActionDef::new("edit", "Edit"))
            .bulk_action(ActionDef::new("purge", "Purge"));

        assert!(matches!(
            ActionRequest::new(&config, "edit", Invocation::bulk(vec![]), Roles::none()),
            Err(DispatchError::NoTarget(_))
        ));
        assert!(matches!(
            ActionRequest::new(&config, "purge", Invocation::bulk(vec![]), Roles::none()),
            Err(DispatchError::NoTarget(_))
        ));
        assert!(matches!(
            ActionRequest::new(&config, "nope", row(), Roles::none()),
            Err(DispatchError::UnknownAction(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_handler_rejected() {
        let config = TableConfig::new("t").action(ActionDef::new("edit", "Edit"));
        let h = harness(AutoConfirm::accept());
        let request = ActionRequest::new(&config, "edit", row(), Roles::none()).unwrap();
        let err = h.dispatcher.dispatch(request).await.unwrap_err();
        assert!(err.is_rejected());
    }
}
