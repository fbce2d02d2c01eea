//! Audit events for action dispatch.

use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::config::Roles;
use crate::model::RowId;

/// Log target used by [`LogAuditSink`].
pub const AUDIT_TARGET: &str = "datagrid::audit";

/// Stage of a dispatch an audit event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditPhase {
    Attempted,
    /// Refused before any handler ran (authorization, missing handler).
    Rejected,
    /// The user declined confirmation.
    Declined,
    Confirmed,
    Succeeded,
    Failed,
}

impl fmt::Display for AuditPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuditPhase::Attempted => "attempted",
            AuditPhase::Rejected => "rejected",
            AuditPhase::Declined => "declined",
            AuditPhase::Confirmed => "confirmed",
            AuditPhase::Succeeded => "succeeded",
            AuditPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub table_id: String,
    pub action_id: String,
    pub row_ids: Vec<RowId>,
    pub phase: AuditPhase,
    /// Failure or rejection reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub roles: Roles,
}

/// Receives audit events.
///
/// Emission is best effort: implementations must not block and cannot fail
/// the action.
pub trait AuditSink: Send + Sync {
    fn emit(&self, event: AuditEvent);
}

/// Writes events as JSON at `info` under the `datagrid::audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAuditSink;

impl AuditSink for LogAuditSink {
    fn emit(&self, event: AuditEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => log::info!(target: AUDIT_TARGET, "{}", json),
            Err(err) => log::warn!(
                target: AUDIT_TARGET,
                "{} {} (event not encodable: {})",
                event.action_id,
                event.phase,
                err
            ),
        }
    }
}

/// Forwards events into an unbounded channel. Send failures are ignored.
#[derive(Debug, Clone)]
pub struct ChannelAuditSink {
    tx: mpsc::UnboundedSender<AuditEvent>,
}

impl ChannelAuditSink {
    /// Creates the sink and the receiving end.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AuditEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl AuditSink for ChannelAuditSink {
    fn emit(&self, event: AuditEvent) {
        if self.tx.send(event).is_err() {
            log::trace!(target: AUDIT_TARGET, "audit receiver dropped");
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn emit(&self, _event: AuditEvent) {}
}
