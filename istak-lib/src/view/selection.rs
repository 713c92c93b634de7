//! Identifier-keyed row selection
//!
//! Selection is keyed by record id, never by row position, so it stays
//! correct across sorting, filtering and paging.

use std::collections::HashSet;

use crate::model::RecordId;

/// Checkbox state for a group of rows (e.g. the header checkbox of a page).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    /// No row in the group is selected.
    Unchecked,
    /// Some rows are selected.
    Indeterminate,
    /// Every row in the group is selected.
    Checked,
}

/// ID-based selection state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    selected: HashSet<RecordId>,
}

impl Selection {
    /// Create a new empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all selected IDs (sorted for deterministic ordering).
    pub fn selected(&self) -> Vec<RecordId> {
        let mut ids: Vec<_> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Check if an ID is selected.
    pub fn is_selected(&self, id: &RecordId) -> bool {
        self.selected.contains(id)
    }

    /// Get the number of selected items.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Clear all selection.
    /// Returns the IDs that were deselected.
    pub fn clear(&mut self) -> Vec<RecordId> {
        self.selected.drain().collect()
    }

    /// Toggle selection of an ID.
    /// Returns `true` if the ID is now selected.
    pub fn toggle(&mut self, id: RecordId) -> bool {
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    /// Toggle a group of IDs (a page, or every row).
    ///
    /// If every ID in the group is already selected the group is
    /// deselected, otherwise all of it is selected. IDs outside the group
    /// are untouched.
    pub fn toggle_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a RecordId>) {
        let ids: Vec<&RecordId> = ids.into_iter().collect();
        if ids.is_empty() {
            return;
        }
        if ids.iter().all(|id| self.selected.contains(*id)) {
            for id in ids {
                self.selected.remove(id);
            }
        } else {
            self.selected.extend(ids.into_iter().cloned());
        }
    }

    /// Drops every selected ID not in `known`.
    /// Returns the IDs that were removed.
    pub fn prune<'a>(&mut self, known: impl IntoIterator<Item = &'a RecordId>) -> Vec<RecordId> {
        let known: HashSet<&RecordId> = known.into_iter().collect();
        let mut removed: Vec<_> = self
            .selected
            .iter()
            .filter(|id| !known.contains(id))
            .cloned()
            .collect();
        for id in &removed {
            self.selected.remove(id);
        }
        removed.sort();
        removed
    }

    /// Checkbox state for a group of IDs.
    pub fn check_state<'a>(&self, ids: impl IntoIterator<Item = &'a RecordId>) -> CheckState {
        let mut total = 0;
        let mut hit = 0;
        for id in ids {
            total += 1;
            if self.selected.contains(id) {
                hit += 1;
            }
        }
        match hit {
            0 => CheckState::Unchecked,
            n if n == total => CheckState::Checked,
            _ => CheckState::Indeterminate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[i64]) -> Vec<RecordId> {
        raw.iter().map(|i| RecordId::from(*i)).collect()
    }

    #[test]
    fn test_toggle() {
        let mut selection = Selection::new();
        assert!(selection.toggle(RecordId::from(5)));
        assert!(selection.is_selected(&RecordId::from(5)));
        assert!(!selection.toggle(RecordId::from(5)));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_all_page() {
        let mut selection = Selection::new();
        selection.toggle(RecordId::from(99));
        let page = ids(&[1, 2, 3]);

        selection.toggle(RecordId::from(2));
        selection.toggle_all(&page);
        assert_eq!(selection.selected(), ids(&[1, 2, 3, 99]));

        selection.toggle_all(&page);
        assert_eq!(selection.selected(), ids(&[99]));
    }

    #[test]
    fn test_prune() {
        let mut selection = Selection::new();
        for id in ids(&[1, 5, 7]) {
            selection.toggle(id);
        }
        let removed = selection.prune(&ids(&[1, 7, 8]));
        assert_eq!(removed, ids(&[5]));
        assert_eq!(selection.selected(), ids(&[1, 7]));
    }

    #[test]
    fn test_check_state() {
        let mut selection = Selection::new();
        let page = ids(&[1, 2]);
        assert_eq!(selection.check_state(&page), CheckState::Unchecked);
        selection.toggle(RecordId::from(1));
        assert_eq!(selection.check_state(&page), CheckState::Indeterminate);
        selection.toggle(RecordId::from(2));
        assert_eq!(selection.check_state(&page), CheckState::Checked);
    }
}
