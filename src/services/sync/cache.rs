// src/services/sync/cache.rs

use crate::types::LocalFavoriteEntry;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Storage key holding the serialized favorites array.
pub const WISHLIST_KEY: &str = "cronox-wishlist";
/// Storage key holding the one-shot "merge completed" flag.
pub const SYNC_COMPLETED_KEY: &str = "cronox-wishlist-sync-completed";

/// Key/value persistence the favorites cache writes through. Mirrors the
/// shape of browser localStorage: string keys, string payloads, infallible
/// reads.
pub trait CacheStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory backend, for native embedders and tests
#[derive(Default)]
pub struct MemoryStorage {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.data.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.data.lock().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.data.lock().remove(key);
    }
}

/// Client-side mirror of the user's favorites.
///
/// This cache is a copy, never the authority; correspondence with ledger
/// memberships is established only by the sync protocol. All entries live
/// serialized under a single key so the whole list replaces atomically.
pub struct LocalFavoritesCache<S: CacheStorage> {
    storage: S,
}

impl<S: CacheStorage> LocalFavoritesCache<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// All cached entries; corrupt or missing payloads read as empty.
    pub fn entries(&self) -> Vec<LocalFavoriteEntry> {
        self.storage
            .get(WISHLIST_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, entries: &[LocalFavoriteEntry]) {
        if let Ok(raw) = serde_json::to_string(entries) {
            self.storage.set(WISHLIST_KEY, &raw);
        }
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries().iter().any(|e| e.id == id)
    }

    /// Adds an entry unless one with the same id is already present.
    /// Returns whether the cache changed.
    pub fn insert(&self, entry: LocalFavoriteEntry) -> bool {
        let mut entries = self.entries();
        if entries.iter().any(|e| e.id == entry.id) {
            return false;
        }
        entries.push(entry);
        self.save(&entries);
        true
    }

    /// Removes the entry with the given id, returning it for a possible
    /// optimistic-revert.
    pub fn remove(&self, id: &str) -> Option<LocalFavoriteEntry> {
        let mut entries = self.entries();
        let position = entries.iter().position(|e| e.id == id)?;
        let removed = entries.remove(position);
        self.save(&entries);
        Some(removed)
    }

    /// Drops the whole list and the merge flag (logout path).
    pub fn clear(&self) {
        self.storage.remove(WISHLIST_KEY);
        self.storage.remove(SYNC_COMPLETED_KEY);
    }

    pub fn sync_completed(&self) -> bool {
        self.storage
            .get(SYNC_COMPLETED_KEY)
            .map(|v| v == "true")
            .unwrap_or(false)
    }

    pub fn set_sync_completed(&self, completed: bool) {
        if completed {
            self.storage.set(SYNC_COMPLETED_KEY, "true");
        } else {
            self.storage.remove(SYNC_COMPLETED_KEY);
        }
    }
}
