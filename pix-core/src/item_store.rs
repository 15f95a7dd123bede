//! Process-wide item attribute cache.
//!
//! Cloning an [`ItemStore`] yields another handle onto the same map, so every
//! carousel sees the same attributes. Writes are last-writer-wins per id.

use std::sync::Arc;

use dashmap::DashMap;
use pix_model::{Item, ItemId, Record, Response};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    items: Arc<DashMap<ItemId, Item>>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ItemId) -> Option<Item> {
        self.items.get(&id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    /// Stores an item under its server id. Unsaved items are ignored.
    pub fn insert(&self, item: Item) -> Option<ItemId> {
        let id = item.id?;
        self.items.insert(id, item);
        Some(id)
    }

    pub fn remove(&self, id: ItemId) -> Option<Item> {
        self.items.remove(&id).map(|(_, item)| item)
    }

    /// Merges every item record of a response. Views are skipped; they are
    /// owned by the carousel that loaded them.
    pub fn merge_response(&self, response: &Response) -> Vec<ItemId> {
        let merged: Vec<ItemId> = response
            .records()
            .filter_map(Record::as_item)
            .filter_map(|item| self.insert(item.clone()))
            .collect();
        if !merged.is_empty() {
            debug!(count = merged.len(), "merged items into store");
        }
        merged
    }

    /// Ids from `ids` with no attributes yet, in input order, without repeats.
    pub fn missing(&self, ids: &[ItemId]) -> Vec<ItemId> {
        let mut out: Vec<ItemId> = Vec::new();
        for id in ids {
            if !self.contains(*id) && !out.contains(id) {
                out.push(*id);
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pix_model::View;

    #[test]
    fn clones_share_the_same_map() {
        let store = ItemStore::new();
        let other = store.clone();
        store.insert(Item::image("a").with_id(ItemId(1)));
        assert!(other.contains(ItemId(1)));
    }

    #[test]
    fn last_writer_wins() {
        let store = ItemStore::new();
        store.insert(Item::image("a").with_id(ItemId(1)));
        store.insert(Item::image("b").with_id(ItemId(1)));
        assert_eq!(store.get(ItemId(1)).unwrap().src, "b");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn merge_skips_views_and_unsaved_items() {
        let store = ItemStore::new();
        let response = Response::with_items(vec![
            Item::image("a").with_id(ItemId(1)).into(),
            Item::image("b").into(),
            View::public("p", vec![]).with_id(ItemId(2)).into(),
        ]);
        assert_eq!(store.merge_response(&response), vec![ItemId(1)]);
        assert_eq!(store.missing(&[ItemId(1), ItemId(2), ItemId(2)]), vec![ItemId(2)]);
    }
}
