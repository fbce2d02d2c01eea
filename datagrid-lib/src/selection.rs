//! Selection tracking by row identity.
//!
//! Selection is keyed by [`RowId`], not position, so it survives sorting and
//! paging as long as the row stays in the filtered set.

use std::collections::BTreeSet;
use std::collections::HashSet;

use crate::model::RowId;

/// How many rows may be selected at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionMode {
    /// At most one row.
    Single,
    /// Any number of rows.
    #[default]
    Multi,
}

/// The set of selected row identities.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::RowId;
/// use datagrid_lib::selection::Selection;
///
/// let mut selection = Selection::new();
/// selection.toggle(RowId::from("a"));
/// selection.toggle(RowId::from("b"));
/// selection.reconcile(&[RowId::from("b"), RowId::from("c")]);
///
/// assert_eq!(selection.selected(), vec![RowId::from("b")]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    mode: SelectionMode,
    selected: BTreeSet<RowId>,
}

impl Selection {
    /// Creates an empty multi-row selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty selection with the given mode.
    pub fn with_mode(mode: SelectionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Selected ids in identity order.
    pub fn selected(&self) -> Vec<RowId> {
        self.selected.iter().cloned().collect()
    }

    /// Iterates the selected ids in identity order.
    pub fn iter(&self) -> impl Iterator<Item = &RowId> {
        self.selected.iter()
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Clears the selection and returns the ids that were deselected.
    pub fn clear(&mut self) -> Vec<RowId> {
        std::mem::take(&mut self.selected).into_iter().collect()
    }

    /// Flips one id's membership. Returns `true` if it is now selected.
    ///
    /// In single mode selecting an id deselects every other.
    pub fn toggle(&mut self, id: RowId) -> bool {
        if self.selected.remove(&id) {
            return false;
        }
        if self.mode == SelectionMode::Single {
            self.selected.clear();
        }
        self.selected.insert(id);
        true
    }

    /// Sets the selection to exactly the given ids.
    ///
    /// Single mode keeps only the first id. Returns the number selected.
    pub fn select_all<I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = RowId>,
    {
        self.selected.clear();
        let ids = ids.into_iter();
        match self.mode {
            SelectionMode::Single => self.selected.extend(ids.take(1)),
            SelectionMode::Multi => self.selected.extend(ids),
        }
        self.selected.len()
    }

    /// Drops every selected id absent from `filtered`. Never adds ids.
    ///
    /// Returns the ids that were dropped.
    pub fn reconcile<'a, I>(&mut self, filtered: I) -> Vec<RowId>
    where
        I: IntoIterator<Item = &'a RowId>,
    {
        if self.selected.is_empty() {
            return Vec::new();
        }
        let keep: HashSet<&RowId> = filtered.into_iter().collect();
        let dropped: Vec<RowId> = self
            .selected
            .iter()
            .filter(|id| !keep.contains(id))
            .cloned()
            .collect();
        for id in &dropped {
            self.selected.remove(id);
        }
        dropped
    }
}
