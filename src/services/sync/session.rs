// src/services/sync/session.rs

use crate::log_warn;
use crate::services::favorites::{FavoritesLedger, FavoritesStore};
use crate::services::sync::cache::{CacheStorage, LocalFavoritesCache};
use crate::types::{FavoriteProduct, LocalFavoriteEntry, SyncReport};
use crate::utils::formatter::format_price_eur;
use crate::utils::time::millis_to_rfc3339;
use crate::utils::{StorefrontError, StorefrontResult};
use async_trait::async_trait;

/// The client's view of the favorites surface. The crate ships an
/// implementation backed directly by the ledger; an HTTP client fits the same
/// seam.
#[async_trait(?Send)]
pub trait FavoritesApi {
    async fn list(&self, user_id: i64) -> StorefrontResult<Vec<FavoriteProduct>>;
    async fn add(&self, user_id: i64, product_id: i64) -> StorefrontResult<i64>;
    async fn remove(&self, user_id: i64, product_id: i64) -> StorefrontResult<i64>;
    async fn reconcile(&self, user_id: i64, desired: &[i64]) -> StorefrontResult<SyncReport>;
}

#[async_trait(?Send)]
impl<S: FavoritesStore> FavoritesApi for FavoritesLedger<S> {
    async fn list(&self, user_id: i64) -> StorefrontResult<Vec<FavoriteProduct>> {
        FavoritesLedger::list(self, user_id).await
    }

    async fn add(&self, user_id: i64, product_id: i64) -> StorefrontResult<i64> {
        FavoritesLedger::add(self, user_id, product_id).await
    }

    async fn remove(&self, user_id: i64, product_id: i64) -> StorefrontResult<i64> {
        FavoritesLedger::remove(self, user_id, product_id).await
    }

    async fn reconcile(&self, user_id: i64, desired: &[i64]) -> StorefrontResult<SyncReport> {
        FavoritesLedger::reconcile(self, user_id, desired).await
    }
}

/// Where the session stands in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Unauthenticated,
    Authenticating,
    Synced,
    LoggedOut,
}

/// A toggle recorded while no credential was present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingToggle {
    pub product_id: String,
    pub favorited: bool,
}

/// Result of a login-triggered merge
#[derive(Debug, Clone)]
pub enum MergeOutcome {
    Merged(SyncReport),
    AlreadySynced,
}

/// One sync session per page load / credential lifetime.
///
/// Owns the local cache, the merge-completed flag and the pending queue, and
/// is the only component allowed to decide when a reconcile runs. The merge
/// runs at most once per login; a second credential-detection event while the
/// flag is set is a no-op.
pub struct SyncSession<A: FavoritesApi, S: CacheStorage> {
    api: A,
    cache: LocalFavoritesCache<S>,
    phase: SyncPhase,
    user_id: Option<i64>,
    pending: Vec<PendingToggle>,
}

impl<A: FavoritesApi, S: CacheStorage> SyncSession<A, S> {
    pub fn new(api: A, storage: S) -> Self {
        Self {
            api,
            cache: LocalFavoritesCache::new(storage),
            phase: SyncPhase::Unauthenticated,
            user_id: None,
            pending: Vec::new(),
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn cache(&self) -> &LocalFavoritesCache<S> {
        &self.cache
    }

    pub fn pending(&self) -> &[PendingToggle] {
        &self.pending
    }

    /// Flips one favorite. The cache mutates immediately (optimistic); when
    /// authenticated the ledger is updated and a failure reverts the cache
    /// change before surfacing. While signed out the toggle is queued.
    /// Returns whether the product is favorited after the call.
    pub async fn toggle(&mut self, entry: LocalFavoriteEntry) -> StorefrontResult<bool> {
        let id = entry.id.clone();
        let was_favorited = self.cache.contains(&id);

        // Optimistic cache change; `removed` keeps the original entry so a
        // failed remove can restore it untouched.
        let removed = if was_favorited {
            self.cache.remove(&id)
        } else {
            self.cache.insert(entry);
            None
        };
        let now_favorited = !was_favorited;

        if self.phase == SyncPhase::Synced {
            let user_id = self.user_id.ok_or_else(|| {
                StorefrontError::internal_error("Synced session without a user id")
            })?;
            let product_id = match id.trim().parse::<i64>() {
                Ok(pid) => pid,
                Err(_) => {
                    self.revert(&id, removed, now_favorited);
                    return Err(StorefrontError::validation_error(format!(
                        "Invalid product id: {}",
                        id
                    )));
                }
            };

            let result = if now_favorited {
                self.api.add(user_id, product_id).await
            } else {
                self.api.remove(user_id, product_id).await
            };

            if let Err(e) = result {
                self.revert(&id, removed, now_favorited);
                return Err(e);
            }
        } else {
            self.pending.push(PendingToggle {
                product_id: id,
                favorited: now_favorited,
            });
        }

        Ok(now_favorited)
    }

    fn revert(&self, id: &str, removed: Option<LocalFavoriteEntry>, now_favorited: bool) {
        if now_favorited {
            self.cache.remove(id);
        } else if let Some(entry) = removed {
            self.cache.insert(entry);
        }
    }

    /// Credential detected: runs the one-time bidirectional merge.
    ///
    /// Fetches ledger membership, unions it into the local cache (existing
    /// local entries always win over ledger copies of the same id), then
    /// replaces the ledger set with the union. A connectivity failure leaves
    /// the cache untouched and the merge flag unset, so the next
    /// login-detection event retries.
    pub async fn handle_login(&mut self, user_id: i64) -> StorefrontResult<MergeOutcome> {
        if self.cache.sync_completed() {
            self.user_id = Some(user_id);
            self.phase = SyncPhase::Synced;
            return Ok(MergeOutcome::AlreadySynced);
        }

        self.phase = SyncPhase::Authenticating;

        let ledger_items = match self.api.list(user_id).await {
            Ok(items) => items,
            Err(e) => {
                self.phase = SyncPhase::Unauthenticated;
                return Err(e);
            }
        };

        let mut entries = self.cache.entries();
        for product in &ledger_items {
            let id = product.id.to_string();
            if !entries.iter().any(|e| e.id == id) {
                entries.push(entry_from_product(product));
            }
        }

        let mut desired = Vec::with_capacity(entries.len());
        for entry in &entries {
            match entry.id.trim().parse::<i64>() {
                Ok(pid) => desired.push(pid),
                Err(_) => {
                    log_warn!(&format!(
                        "Skipping cached favorite with non-numeric id: {}",
                        entry.id
                    ));
                }
            }
        }

        let report = match self.api.reconcile(user_id, &desired).await {
            Ok(report) => report,
            Err(e) => {
                self.phase = SyncPhase::Unauthenticated;
                return Err(e);
            }
        };

        for item_error in &report.errors {
            log_warn!(&format!("Favorite did not sync: {}", item_error));
        }

        self.cache.save(&entries);
        self.cache.set_sync_completed(true);
        self.pending.clear();
        self.user_id = Some(user_id);
        self.phase = SyncPhase::Synced;

        Ok(MergeOutcome::Merged(report))
    }

    /// Credential removed: drops all user-specific local state. Unsynced
    /// local changes are discarded with it.
    pub fn handle_logout(&mut self) {
        self.cache.clear();
        self.pending.clear();
        self.user_id = None;
        self.phase = SyncPhase::LoggedOut;
    }
}

fn entry_from_product(product: &FavoriteProduct) -> LocalFavoriteEntry {
    LocalFavoriteEntry {
        id: product.id.to_string(),
        name: product.name.clone(),
        price: format_price_eur(product.price),
        image: product.image_url.clone(),
        added_at: Some(millis_to_rfc3339(product.favourited_at as i64)),
    }
}
