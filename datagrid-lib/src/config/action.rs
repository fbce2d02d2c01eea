//! Row and bulk action definitions.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use super::Capability;
use crate::error::HandlerError;
use crate::model::Row;

/// Visual/semantic variant of an action.
///
/// `Destructive` actions go through the confirmation stage before running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionVariant {
    #[default]
    Default,
    Secondary,
    Outline,
    Ghost,
    Destructive,
}

/// What a handler is invoked with.
///
/// Row actions get `row: Some(..)` and an empty `selected`; bulk actions get
/// `row: None` and the selected rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Invocation {
    pub row: Option<Row>,
    pub selected: Vec<Row>,
}

impl Invocation {
    /// Invocation for a single row.
    pub fn row(row: Row) -> Self {
        Self {
            row: Some(row),
            selected: Vec::new(),
        }
    }

    /// Invocation for a selection.
    pub fn bulk(selected: Vec<Row>) -> Self {
        Self {
            row: None,
            selected,
        }
    }

    /// Consumes the invocation and returns every targeted row.
    pub fn into_rows(self) -> Vec<Row> {
        match self.row {
            Some(row) => vec![row],
            None => self.selected,
        }
    }
}

/// The effect behind an action. Free to perform any external I/O.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Runs the action.
    async fn run(&self, invocation: Invocation) -> Result<(), HandlerError>;
}

/// Handler built from an async closure. See [`handler_fn`].
pub struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> ActionHandler for FnHandler<F>
where
    F: Fn(Invocation) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn run(&self, invocation: Invocation) -> Result<(), HandlerError> {
        (self.0)(invocation).await
    }
}

/// Wraps an async closure as an [`ActionHandler`].
///
/// # Example
///
/// ```
/// use datagrid_lib::config::{handler_fn, ActionDef};
///
/// let archive = ActionDef::new("archive", "Archive").handler(handler_fn(|invocation| async move {
///     let _rows = invocation.into_rows();
///     Ok(())
/// }));
/// assert!(archive.has_handler());
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Invocation) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    FnHandler(f)
}

/// An action offered per row (`actions`) or on the selection (`bulkActions`).
///
/// Handlers are not part of the JSON form; bind them with
/// [`ActionDef::handler`] or [`TableConfig::bind_action`](super::TableConfig::bind_action).
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDef {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub variant: ActionVariant,
    /// Capability override; see [`ActionDef::capability`].
    #[serde(default)]
    pub requires: Option<Capability>,
    #[serde(skip)]
    pub(crate) handler: Option<Arc<dyn ActionHandler>>,
}

impl ActionDef {
    /// Creates an action without a handler.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon: None,
            variant: ActionVariant::Default,
            requires: None,
            handler: None,
        }
    }

    /// Sets the icon name.
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Sets the variant.
    pub fn variant(mut self, variant: ActionVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Shorthand for `variant(ActionVariant::Destructive)`.
    pub fn destructive(self) -> Self {
        self.variant(ActionVariant::Destructive)
    }

    /// Sets the required capability.
    pub fn requires(mut self, capability: Capability) -> Self {
        self.requires = Some(capability);
        self
    }

    /// Binds the handler.
    pub fn handler(mut self, handler: impl ActionHandler + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Binds an already shared handler.
    pub fn shared_handler(mut self, handler: Arc<dyn ActionHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Returns `true` once a handler is bound.
    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Returns `true` for destructive actions.
    pub fn is_destructive(&self) -> bool {
        self.variant == ActionVariant::Destructive
    }

    /// The capability this action requires: the explicit override, else
    /// `delete` for destructive actions and `update` for the rest.
    pub fn capability(&self) -> Capability {
        self.requires.unwrap_or(if self.is_destructive() {
            Capability::Delete
        } else {
            Capability::Update
        })
    }
}

impl fmt::Debug for ActionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDef")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("icon", &self.icon)
            .field("variant", &self.variant)
            .field("requires", &self.requires)
            .field("handler", &self.handler.as_ref().map(|_| ".."))
            .finish()
    }
}
