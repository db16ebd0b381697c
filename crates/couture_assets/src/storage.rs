use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use slotmap::{Key, SlotMap};
use uuid::Uuid;

struct StorageInner<H: Key, T> {
    map: SlotMap<H, Arc<T>>,
    by_name: FxHashMap<String, H>,
    by_uuid: FxHashMap<Uuid, H>,
}

impl<H: Key, T> Default for StorageInner<H, T> {
    fn default() -> Self {
        Self {
            map: SlotMap::default(),
            by_name: FxHashMap::default(),
            by_uuid: FxHashMap::default(),
        }
    }
}

/// Shared, lock-protected pool of immutable assets.
///
/// Assets are handed out as `Arc<T>`, so a reader keeps its copy alive even
/// if the entry is later removed from the pool.
pub struct AssetStorage<H: Key, T> {
    inner: RwLock<StorageInner<H, T>>,
}

impl<H: Key, T> Default for AssetStorage<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Key, T> AssetStorage<H, T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::default(),
        }
    }

    pub fn add(&self, asset: impl Into<T>) -> H {
        self.inner.write().map.insert(Arc::new(asset.into()))
    }

    /// Adds an asset under a name, or returns the handle already registered
    /// for that name. Used to load each file once.
    pub fn add_named(&self, name: &str, asset: impl Into<T>) -> H {
        let mut guard = self.inner.write();
        if let Some(&handle) = guard.by_name.get(name)
            && guard.map.contains_key(handle)
        {
            return handle;
        }
        let handle = guard.map.insert(Arc::new(asset.into()));
        guard.by_name.insert(name.to_string(), handle);
        handle
    }

    /// Adds an asset keyed by its uuid, deduplicating repeated inserts.
    pub fn add_with_uuid(&self, uuid: Uuid, asset: impl Into<T>) -> H {
        let mut guard = self.inner.write();
        if let Some(&handle) = guard.by_uuid.get(&uuid)
            && guard.map.contains_key(handle)
        {
            return handle;
        }
        let handle = guard.map.insert(Arc::new(asset.into()));
        guard.by_uuid.insert(uuid, handle);
        handle
    }

    #[must_use]
    pub fn get(&self, handle: H) -> Option<Arc<T>> {
        self.inner.read().map.get(handle).cloned()
    }

    #[must_use]
    pub fn handle_by_name(&self, name: &str) -> Option<H> {
        let guard = self.inner.read();
        guard
            .by_name
            .get(name)
            .copied()
            .filter(|h| guard.map.contains_key(*h))
    }

    #[must_use]
    pub fn get_by_uuid(&self, uuid: &Uuid) -> Option<Arc<T>> {
        let guard = self.inner.read();
        let handle = guard.by_uuid.get(uuid)?;
        guard.map.get(*handle).cloned()
    }

    #[must_use]
    pub fn contains(&self, handle: H) -> bool {
        self.inner.read().map.contains_key(handle)
    }

    /// Drops the pool's reference; outstanding `Arc`s stay valid.
    pub fn remove(&self, handle: H) -> Option<Arc<T>> {
        let mut guard = self.inner.write();
        let removed = guard.map.remove(handle)?;
        guard.by_name.retain(|_, h| *h != handle);
        guard.by_uuid.retain(|_, h| *h != handle);
        Some(removed)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use couture_core::TextureHandle;

    use super::*;

    #[test]
    fn named_assets_are_loaded_once() {
        let storage: AssetStorage<TextureHandle, String> = AssetStorage::new();
        let a = storage.add_named("sea/x+.jpg", "first");
        let b = storage.add_named("sea/x+.jpg", "second");
        assert_eq!(a, b);
        assert_eq!(storage.get(a).as_deref().map(String::as_str), Some("first"));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn removed_assets_survive_in_outstanding_arcs() {
        let storage: AssetStorage<TextureHandle, String> = AssetStorage::new();
        let handle = storage.add_named("grid", "pixels");
        let held = storage.get(handle).unwrap();
        storage.remove(handle);
        assert!(!storage.contains(handle));
        assert!(storage.handle_by_name("grid").is_none());
        assert_eq!(held.as_str(), "pixels");
    }
}
