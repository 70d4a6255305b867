// src/services/favorites/ledger.rs

use crate::services::favorites::store::FavoritesStore;
use crate::types::{CounterStats, FavoriteProduct, SyncReport};
use crate::utils::{StorefrontError, StorefrontResult};
use std::collections::HashSet;

/// Authoritative store of favorite memberships and the per-product
/// popularity counter.
///
/// Invariant: after any completed mutation, `products.favourites` equals the
/// number of membership rows for that product. The counter is recomputed as a
/// full aggregate on every mutation, so concurrent interleavings converge on
/// the next completed recompute.
pub struct FavoritesLedger<S: FavoritesStore> {
    store: S,
}

impl<S: FavoritesStore> FavoritesLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Adds a favorite. Repeat calls are no-ops, not errors. Fails with
    /// NotFound when the product is missing or inactive. Returns the new
    /// counter value.
    pub async fn add(&self, user_id: i64, product_id: i64) -> StorefrontResult<i64> {
        if !self.store.product_is_active(product_id).await? {
            return Err(StorefrontError::not_found(format!(
                "Product {} not found",
                product_id
            )));
        }
        self.store.add_and_recount(user_id, product_id).await
    }

    /// Removes a favorite. Removing an absent membership is not an error;
    /// the caller may be retrying or racing another session. Returns the new
    /// counter value.
    pub async fn remove(&self, user_id: i64, product_id: i64) -> StorefrontResult<i64> {
        self.store.remove_and_recount(user_id, product_id).await
    }

    /// Active-product memberships for the user, most recently favorited
    /// first. Fails with NotFound for unknown users.
    pub async fn list(&self, user_id: i64) -> StorefrontResult<Vec<FavoriteProduct>> {
        if !self.store.user_exists(user_id).await? {
            return Err(StorefrontError::not_found(format!(
                "User {} not found",
                user_id
            )));
        }
        self.store.list_memberships(user_id).await
    }

    pub async fn check(&self, user_id: i64, product_id: i64) -> StorefrontResult<bool> {
        self.store.membership_exists(user_id, product_id).await
    }

    /// Stored counter next to the live membership count for one product.
    pub async fn stats(&self, product_id: i64) -> StorefrontResult<CounterStats> {
        self.store
            .counter_stats(product_id)
            .await?
            .ok_or_else(|| {
                StorefrontError::not_found(format!("Product {} not found", product_id))
            })
    }

    /// Bulk-sync primitive: replaces the user's entire membership set with
    /// `desired` intersected with the currently active products.
    ///
    /// Ids that do not reference an active product are reported per item in
    /// the returned report instead of failing the call. Counters are
    /// recomputed for every product whose membership changed in either
    /// direction, including products dropped by the replace.
    pub async fn reconcile(&self, user_id: i64, desired: &[i64]) -> StorefrontResult<SyncReport> {
        if !self.store.user_exists(user_id).await? {
            return Err(StorefrontError::not_found(format!(
                "User {} not found",
                user_id
            )));
        }

        let before = self.store.member_product_ids(user_id).await?;

        let mut seen = HashSet::new();
        let mut accepted = Vec::new();
        let mut errors = Vec::new();
        for &product_id in desired {
            if !seen.insert(product_id) {
                continue; // duplicate ids collapse to set semantics
            }
            if self.store.product_is_active(product_id).await? {
                accepted.push(product_id);
            } else {
                errors.push(format!("Product {} not found or inactive", product_id));
            }
        }

        self.store.clear_memberships(user_id).await?;

        let mut synced_count = 0u32;
        for &product_id in &accepted {
            self.store.add_and_recount(user_id, product_id).await?;
            synced_count += 1;
        }

        // Products that held a membership before the replace but were not
        // re-added lost a row; their counters need the recompute too.
        let accepted_set: HashSet<i64> = accepted.iter().copied().collect();
        for product_id in before {
            if !accepted_set.contains(&product_id) {
                self.store.recount(product_id).await?;
            }
        }

        Ok(SyncReport {
            user_id,
            synced_count,
            total_items: desired.len() as u32,
            errors,
        })
    }
}
