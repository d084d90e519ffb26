//! Multi-selection of board items.

use crate::model::ItemId;
use crate::position::relative_position;
use kurbo::{Rect, Vec2};

/// A selected item with the snapshot taken when it was selected.
///
/// The bounds and payload are only used by the host to paint selection
/// affordances and multi-drag overlays; relocation math reads the live model.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedItem<T> {
    pub id: ItemId,
    /// On-screen bounds at selection time.
    pub bounds: Rect,
    pub payload: T,
}

impl<T> SelectedItem<T> {
    pub fn new(id: impl Into<ItemId>, bounds: Rect, payload: T) -> Self {
        Self {
            id: id.into(),
            bounds,
            payload,
        }
    }
}

/// Ordered set of selected items, unique by id.
///
/// Insertion order is kept so overlays stack deterministically.
#[derive(Debug, Clone)]
pub struct SelectionSet<T> {
    items: Vec<SelectedItem<T>>,
    /// Whether the host's multi-select modifier is held.
    latched: bool,
}

impl<T> Default for SelectionSet<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            latched: false,
        }
    }
}

impl<T> SelectionSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item. Returns false if the id was already selected.
    pub fn add(&mut self, item: SelectedItem<T>) -> bool {
        if self.contains(&item.id) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove an item. Returns the removed entry, if any.
    pub fn remove(&mut self, id: &ItemId) -> Option<SelectedItem<T>> {
        let index = self.items.iter().position(|item| &item.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.iter().any(|item| &item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Selected items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SelectedItem<T>> {
        self.items.iter()
    }

    /// Selected ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &ItemId> {
        self.items.iter().map(|item| &item.id)
    }

    /// Record whether the multi-select modifier is held.
    pub fn set_latched(&mut self, latched: bool) {
        self.latched = latched;
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Toggle an item while the modifier is held.
    ///
    /// Returns true if the selection changed. Without the modifier this is a no-op.
    pub fn toggle(&mut self, item: SelectedItem<T>) -> bool {
        if !self.latched {
            return false;
        }
        if self.remove(&item.id).is_some() {
            return true;
        }
        self.add(item)
    }

    /// Offsets of every selected item relative to `anchor`'s snapshot, in
    /// insertion order. Empty if `anchor` is not selected.
    pub fn overlay_offsets(&self, anchor: &ItemId) -> Vec<(&ItemId, Vec2)> {
        let Some(base) = self.items.iter().find(|item| &item.id == anchor) else {
            return Vec::new();
        };
        self.items
            .iter()
            .map(|item| (&item.id, relative_position(item.bounds, base.bounds)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selected(id: &str, x: f64, y: f64) -> SelectedItem<&'static str> {
        SelectedItem::new(id, Rect::new(x, y, x + 100.0, y + 50.0), "payload")
    }

    #[test]
    fn test_add_is_unique_by_id() {
        let mut set = SelectionSet::new();
        assert!(set.add(selected("a", 0.0, 0.0)));
        assert!(!set.add(selected("a", 10.0, 10.0)));
        assert_eq!(set.len(), 1);
        // The first snapshot wins.
        assert_eq!(set.iter().next().unwrap().bounds.x0, 0.0);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut set = SelectionSet::new();
        set.add(selected("c", 0.0, 0.0));
        set.add(selected("a", 0.0, 0.0));
        set.add(selected("b", 0.0, 0.0));
        let ids: Vec<_> = set.ids().map(ItemId::as_str).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut set = SelectionSet::new();
        set.add(selected("a", 0.0, 0.0));
        assert!(set.remove(&ItemId::new("zzz")).is_none());
        assert_eq!(set.len(), 1);
        assert!(set.remove(&ItemId::new("a")).is_some());
        assert!(set.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut set = SelectionSet::new();
        set.add(selected("a", 0.0, 0.0));
        set.add(selected("b", 0.0, 0.0));
        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains(&ItemId::new("a")));
    }

    #[test]
    fn test_toggle_requires_latch() {
        let mut set = SelectionSet::new();
        assert!(!set.toggle(selected("a", 0.0, 0.0)));
        assert!(set.is_empty());

        set.set_latched(true);
        assert!(set.toggle(selected("a", 0.0, 0.0)));
        assert!(set.contains(&ItemId::new("a")));
        assert!(set.toggle(selected("a", 0.0, 0.0)));
        assert!(!set.contains(&ItemId::new("a")));

        set.set_latched(false);
        assert!(!set.is_latched());
    }

    #[test]
    fn test_overlay_offsets() {
        let mut set = SelectionSet::new();
        set.add(selected("a", 100.0, 50.0));
        set.add(selected("b", 400.0, 0.0));
        let offsets = set.overlay_offsets(&ItemId::new("a"));
        assert_eq!(offsets.len(), 2);
        assert_eq!(offsets[0].1, Vec2::ZERO);
        assert_eq!(offsets[1].0.as_str(), "b");
        assert_eq!(offsets[1].1, Vec2::new(300.0, -50.0));
        assert!(set.overlay_offsets(&ItemId::new("missing")).is_empty());
    }
}
