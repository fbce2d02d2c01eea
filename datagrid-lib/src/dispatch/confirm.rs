//! Confirmation of destructive actions.

use async_trait::async_trait;

use crate::model::RowId;

/// What the user is asked to confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub action_id: String,
    pub label: String,
    /// Identities of the rows the action would touch.
    pub row_ids: Vec<RowId>,
}

impl ConfirmPrompt {
    /// A default question for the prompt, e.g. `Delete 3 rows?`.
    pub fn message(&self) -> String {
        match self.row_ids.len() {
            1 => format!("{} 1 row?", self.label),
            n => format!("{} {} rows?", self.label, n),
        }
    }
}

/// Asks the user whether a destructive action should proceed.
///
/// Returning `false` cancels the action with no side effects.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool;
}

/// Answers every prompt the same way. Useful for tests and batch tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoConfirm(bool);

impl AutoConfirm {
    /// Confirms everything.
    pub fn accept() -> Self {
        Self(true)
    }

    /// Declines everything.
    pub fn decline() -> Self {
        Self(false)
    }
}

#[async_trait]
impl Confirm for AutoConfirm {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        log::debug!("auto-answering '{}' with {}", prompt.message(), self.0);
        self.0
    }
}
