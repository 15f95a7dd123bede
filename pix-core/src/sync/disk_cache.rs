//! `cacache`-backed [`LocalCache`] that survives restarts.

use std::fmt;
use std::path::{Path, PathBuf};

use pix_model::{Filter, ItemId, Patch, Record};
use tracing::{debug, warn};

use super::cache::LocalCache;
use crate::error::CacheError;

/// Directory `cacache` manages (index plus content-addressed blobs).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DiskCacheRoot(PathBuf);

impl DiskCacheRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Debug for DiskCacheRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DiskCacheRoot").field(&self.0).finish()
    }
}

/// Stable entry key. Versioned so the JSON layout can change later.
fn record_key(collection: &str, id: ItemId) -> String {
    format!("records/v1/{collection}/{id}")
}

fn collection_prefix(collection: &str) -> String {
    format!("records/v1/{collection}/")
}

fn map_cacache(key: &str, err: cacache::Error) -> CacheError {
    match err {
        cacache::Error::EntryNotFound(_, _) => {
            CacheError::NotFound(key.to_owned())
        }
        cacache::Error::IntegrityError(err) => CacheError::Storage(format!(
            "entry failed integrity check: {key} ({err})"
        )),
        cacache::Error::SizeMismatch(wanted, actual) => {
            CacheError::Storage(format!(
                "entry size mismatch: key={key}, wanted={wanted}, actual={actual}"
            ))
        }
        cacache::Error::IoError(_, msg) => {
            CacheError::Storage(format!("cacache I/O error: {msg}"))
        }
        cacache::Error::SerdeError(_, msg) => {
            CacheError::Storage(format!("cacache index error: {msg}"))
        }
    }
}

/// Records stored as JSON blobs, one cacache entry per `(collection, id)`.
#[derive(Debug, Clone)]
pub struct DiskCache {
    root: DiskCacheRoot,
}

impl DiskCache {
    pub fn new(root: DiskCacheRoot) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &DiskCacheRoot {
        &self.root
    }

    fn read(&self, key: &str) -> Result<Record, CacheError> {
        let bytes = cacache::read_sync(self.root.as_path(), key)
            .map_err(|e| map_cacache(key, e))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn write(&self, key: &str, record: &Record) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(record)?;
        cacache::write_sync(self.root.as_path(), key, bytes)
            .map_err(|e| map_cacache(key, e))?;
        Ok(())
    }
}

impl LocalCache for DiskCache {
    fn find(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Record>, CacheError> {
        // Narrow id filters go straight to their keys.
        if let Some(ids) = &filter.ids {
            let mut out = Vec::with_capacity(ids.len());
            for id in ids {
                match self.read(&record_key(collection, *id)) {
                    Ok(record) if filter.matches(&record) => out.push(record),
                    Ok(_) | Err(CacheError::NotFound(_)) => {}
                    Err(err) => return Err(err),
                }
            }
            out.sort_by_key(Record::id);
            return Ok(out);
        }

        let prefix = collection_prefix(collection);
        let mut out = Vec::new();
        for entry in cacache::list_sync(self.root.as_path()) {
            let meta = entry.map_err(|e| map_cacache(&prefix, e))?;
            if !meta.key.starts_with(&prefix) {
                continue;
            }
            match self.read(&meta.key) {
                Ok(record) if filter.matches(&record) => out.push(record),
                Ok(_) => {}
                Err(err) => {
                    warn!(key = %meta.key, %err, "skipping unreadable cache entry");
                }
            }
        }
        out.sort_by_key(Record::id);
        out.dedup_by_key(|record| record.id());
        Ok(out)
    }

    fn upsert(
        &self,
        collection: &str,
        records: &[Record],
    ) -> Result<(), CacheError> {
        for record in records {
            let Some(id) = record.id() else { continue };
            self.write(&record_key(collection, id), record)?;
        }
        debug!(collection, count = records.len(), "disk cache upsert");
        Ok(())
    }

    fn patch(
        &self,
        collection: &str,
        id: ItemId,
        patch: &Patch,
    ) -> Result<bool, CacheError> {
        let key = record_key(collection, id);
        let mut record = match self.read(&key) {
            Ok(record) => record,
            Err(CacheError::NotFound(_)) => return Ok(false),
            Err(err) => return Err(err),
        };
        if patch.apply(&mut record) {
            self.write(&key, &record)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pix_model::{Item, View};

    #[test]
    fn records_survive_a_new_handle() {
        let dir = tempfile::tempdir().unwrap();
        let root = DiskCacheRoot::new(dir.path());
        let cache = DiskCache::new(root.clone());
        cache
            .upsert(
                "pix8",
                &[
                    Item::image("a").with_id(ItemId(2)).into(),
                    Item::image("b").with_id(ItemId(1)).into(),
                ],
            )
            .unwrap();

        let reopened = DiskCache::new(root);
        let all = reopened.find("pix8", &Filter::default()).unwrap();
        let ids: Vec<_> = all.iter().filter_map(Record::id).collect();
        assert_eq!(ids, vec![ItemId(1), ItemId(2)]);
        assert!(reopened.find("other", &Filter::default()).unwrap().is_empty());
    }

    #[test]
    fn id_lookup_and_patch() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(DiskCacheRoot::new(dir.path()));
        let view = View::public("cats", vec![ItemId(1)]).with_id(ItemId(9));
        cache.upsert("pix8", &[view.into()]).unwrap();

        assert!(
            cache
                .patch("pix8", ItemId(9), &Patch::items(vec![ItemId(3)]))
                .unwrap()
        );
        assert!(!cache.patch("pix8", ItemId(8), &Patch::default()).unwrap());

        let found = cache.find("pix8", &Filter::by_ids([ItemId(9), ItemId(8)])).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].as_view().unwrap().items, vec![ItemId(3)]);
    }
}
