use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;
use pix_model::{Filter, ItemId, Patch, Record};

use crate::error::CacheError;

/// Write-through record cache consulted before the remote store.
///
/// Records are keyed by `(collection, id)`; records without an id are not
/// cached. Calls are synchronous and must be quick.
pub trait LocalCache: Send + Sync {
    /// Records matching `filter`, ordered by id.
    fn find(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Record>, CacheError>;

    /// Inserts or replaces records.
    fn upsert(
        &self,
        collection: &str,
        records: &[Record],
    ) -> Result<(), CacheError>;

    /// Applies `patch` to a cached record. Returns false when the record is
    /// not cached.
    fn patch(
        &self,
        collection: &str,
        id: ItemId,
        patch: &Patch,
    ) -> Result<bool, CacheError>;
}

/// In-process [`LocalCache`].
#[derive(Debug, Default)]
pub struct MemoryCache {
    collections: RwLock<HashMap<String, BTreeMap<ItemId, Record>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

impl LocalCache for MemoryCache {
    fn find(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Record>, CacheError> {
        let guard = self.collections.read();
        Ok(guard
            .get(collection)
            .map(|records| {
                records
                    .values()
                    .filter(|record| filter.matches(record))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn upsert(
        &self,
        collection: &str,
        records: &[Record],
    ) -> Result<(), CacheError> {
        let mut guard = self.collections.write();
        let entries = guard.entry(collection.to_owned()).or_default();
        for record in records {
            if let Some(id) = record.id() {
                entries.insert(id, record.clone());
            }
        }
        Ok(())
    }

    fn patch(
        &self,
        collection: &str,
        id: ItemId,
        patch: &Patch,
    ) -> Result<bool, CacheError> {
        let mut guard = self.collections.write();
        let Some(record) =
            guard.get_mut(collection).and_then(|records| records.get_mut(&id))
        else {
            return Ok(false);
        };
        patch.apply(record);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pix_model::{Item, View};

    #[test]
    fn find_is_scoped_to_collection() {
        let cache = MemoryCache::new();
        cache
            .upsert("pix8", &[Item::image("a").with_id(ItemId(1)).into()])
            .unwrap();
        assert_eq!(cache.find("pix8", &Filter::by_id(ItemId(1))).unwrap().len(), 1);
        assert!(cache.find("other", &Filter::default()).unwrap().is_empty());
    }

    #[test]
    fn unsaved_records_are_not_cached() {
        let cache = MemoryCache::new();
        cache.upsert("pix8", &[Item::image("a").into()]).unwrap();
        assert_eq!(cache.len("pix8"), 0);
    }

    #[test]
    fn patch_updates_cached_view() {
        let cache = MemoryCache::new();
        let view = View::public("cats", vec![ItemId(1)]).with_id(ItemId(10));
        cache.upsert("pix8", &[view.into()]).unwrap();

        let patch = Patch::items(vec![ItemId(2), ItemId(1)]);
        assert!(cache.patch("pix8", ItemId(10), &patch).unwrap());
        assert!(!cache.patch("pix8", ItemId(11), &patch).unwrap());

        let found = cache.find("pix8", &Filter::public("cats")).unwrap();
        assert_eq!(found[0].as_view().unwrap().items, vec![ItemId(2), ItemId(1)]);
    }
}
