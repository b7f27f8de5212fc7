//! Ordered pane list with open/close navigation.

use std::collections::HashSet;

use tracing::warn;

use crate::pane::PaneDescriptor;

/// Panes in display order, left to right.
///
/// Ids are unique. The list is only mutated through [`PaneList::open_pane`]
/// and [`PaneList::close_pane`]; every effective mutation bumps
/// [`PaneList::revision`].
#[derive(Debug)]
pub struct PaneList<V> {
    panes: Vec<PaneDescriptor<V>>,
    revision: u64,
}

impl<V> PaneList<V> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            panes: Vec::new(),
            revision: 0,
        }
    }

    /// Build a list from initial panes.
    ///
    /// Duplicate ids break the list's contract. The first occurrence is kept
    /// and each later duplicate is dropped with a warning.
    pub fn from_panes(initial: impl IntoIterator<Item = PaneDescriptor<V>>) -> Self {
        let mut seen = HashSet::new();
        let mut panes = Vec::new();
        for pane in initial {
            if seen.insert(pane.id.clone()) {
                panes.push(pane);
            } else {
                warn!("Dropping pane with duplicate id {:?}", pane.id);
            }
        }
        Self { panes, revision: 0 }
    }

    /// Open a pane.
    ///
    /// A new id is appended at the end. An id already in the list is promoted:
    /// the old entry is removed and `next` is appended, so the pane becomes
    /// the rightmost one and the length is unchanged.
    pub fn open_pane(&mut self, next: PaneDescriptor<V>) {
        if let Some(pos) = self.position(&next.id) {
            self.panes.remove(pos);
        }
        self.panes.push(next);
        self.revision += 1;
    }

    /// Close the pane with `id`, returning it. Absent ids are a no-op.
    pub fn close_pane(&mut self, id: &str) -> Option<PaneDescriptor<V>> {
        let pos = self.position(id)?;
        self.revision += 1;
        Some(self.panes.remove(pos))
    }

    /// Index of the pane with `id`.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.panes.iter().position(|p| p.id == id)
    }

    /// Check whether a pane with `id` is open.
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Get the pane with `id`.
    pub fn get(&self, id: &str) -> Option<&PaneDescriptor<V>> {
        self.panes.iter().find(|p| p.id == id)
    }

    /// Number of panes.
    pub fn len(&self) -> usize {
        self.panes.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.panes.is_empty()
    }

    /// Panes in display order.
    pub fn as_slice(&self) -> &[PaneDescriptor<V>] {
        &self.panes
    }

    /// Pane ids in display order.
    pub fn ids(&self) -> Vec<&str> {
        self.panes.iter().map(|p| p.id.as_str()).collect()
    }

    /// Counter bumped on every effective mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl<V> Default for PaneList<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pane(id: &str) -> PaneDescriptor<String> {
        PaneDescriptor::new(id, id.to_uppercase(), format!("view {}", id))
    }

    #[test]
    fn test_open_fresh_ids_append() {
        let mut list = PaneList::new();
        for id in ["a", "b", "c", "d"] {
            let before = list.len();
            list.open_pane(pane(id));
            assert_eq!(list.len(), before + 1);
            assert_eq!(list.ids().last().copied(), Some(id));
        }
        assert_eq!(list.ids(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_open_existing_id_promotes_to_end() {
        let mut list = PaneList::from_panes(["a", "b", "c", "d"].map(pane));

        list.open_pane(pane("b"));

        assert_eq!(list.len(), 4);
        assert_eq!(list.ids(), vec!["a", "c", "d", "b"]);
    }

    #[test]
    fn test_open_existing_id_replaces_descriptor() {
        let mut list = PaneList::from_panes(["a", "b"].map(pane));

        list.open_pane(PaneDescriptor::new("a", "Renamed", "new".to_string()));

        assert_eq!(list.ids(), vec!["b", "a"]);
        assert_eq!(list.get("a").map(|p| p.title.as_str()), Some("Renamed"));
    }

    #[test]
    fn test_open_last_pane_keeps_order() {
        let mut list = PaneList::from_panes(["a", "b", "c"].map(pane));
        list.open_pane(pane("c"));
        assert_eq!(list.ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_close_preserves_order() {
        let mut list = PaneList::from_panes(["a", "b", "c"].map(pane));

        let removed = list.close_pane("b");

        assert_eq!(removed.map(|p| p.id), Some("b".to_string()));
        assert_eq!(list.ids(), vec!["a", "c"]);
    }

    #[test]
    fn test_close_absent_id_is_noop() {
        let mut list = PaneList::from_panes(["a", "b"].map(pane));
        let revision = list.revision();

        assert!(list.close_pane("zzz").is_none());
        assert_eq!(list.ids(), vec!["a", "b"]);
        assert_eq!(list.revision(), revision);
    }

    #[test]
    fn test_mutations_bump_revision() {
        let mut list = PaneList::new();
        assert_eq!(list.revision(), 0);
        list.open_pane(pane("a"));
        assert_eq!(list.revision(), 1);
        list.open_pane(pane("a"));
        assert_eq!(list.revision(), 2);
        list.close_pane("a");
        assert_eq!(list.revision(), 3);
    }

    #[test]
    fn test_duplicate_initial_ids_keep_first() {
        let list = PaneList::from_panes(vec![
            PaneDescriptor::new("a", "First", "1".to_string()),
            pane("b"),
            PaneDescriptor::new("a", "Second", "2".to_string()),
        ]);

        assert_eq!(list.ids(), vec!["a", "b"]);
        assert_eq!(list.get("a").map(|p| p.title.as_str()), Some("First"));
    }
}
