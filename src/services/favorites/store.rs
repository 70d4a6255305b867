// src/services/favorites/store.rs

use crate::types::{CounterStats, FavoriteProduct};
use crate::utils::time::get_current_timestamp_ms;
use crate::utils::{row_f64, row_i64, row_opt_string, row_string, DbRow, StorefrontError, StorefrontResult};
use async_trait::async_trait;
use worker::D1Database;

/// Storage seam for the favorites ledger.
///
/// The composite mutations (`add_and_recount`, `remove_and_recount`) are part
/// of the trait so each backend can make the membership write and the counter
/// recompute atomic: the D1 implementation batches both statements into a
/// single implicit transaction, the in-memory test store holds its lock
/// across the pair. The recompute is always a full aggregate over the
/// membership rows, never a delta.
#[async_trait(?Send)]
pub trait FavoritesStore {
    async fn user_exists(&self, user_id: i64) -> StorefrontResult<bool>;

    async fn product_is_active(&self, product_id: i64) -> StorefrontResult<bool>;

    async fn membership_exists(&self, user_id: i64, product_id: i64) -> StorefrontResult<bool>;

    /// Active-product memberships for a user, most recently favorited first.
    async fn list_memberships(&self, user_id: i64) -> StorefrontResult<Vec<FavoriteProduct>>;

    /// Every product id the user has a membership row for, active or not.
    async fn member_product_ids(&self, user_id: i64) -> StorefrontResult<Vec<i64>>;

    /// Stored counter next to the live aggregate; None for unknown products.
    async fn counter_stats(&self, product_id: i64) -> StorefrontResult<Option<CounterStats>>;

    /// Idempotent membership insert + counter recompute; returns the new count.
    async fn add_and_recount(&self, user_id: i64, product_id: i64) -> StorefrontResult<i64>;

    /// Idempotent membership delete + counter recompute; returns the new count.
    async fn remove_and_recount(&self, user_id: i64, product_id: i64) -> StorefrontResult<i64>;

    /// Recompute and persist the counter without touching memberships.
    async fn recount(&self, product_id: i64) -> StorefrontResult<i64>;

    /// Drop every membership row for a user. Counters are NOT recomputed
    /// here; reconcile recounts the affected products afterwards.
    async fn clear_memberships(&self, user_id: i64) -> StorefrontResult<()>;
}

const RECOUNT_SQL: &str = "
    UPDATE products
    SET favourites = (
        SELECT COUNT(*)
        FROM user_favourites
        WHERE user_favourites.product_id = products.id
    ),
    updated_at = ?
    WHERE id = ?
";

/// D1FavoritesStore persists memberships and counters in Cloudflare D1
pub struct D1FavoritesStore {
    db: D1Database,
}

impl D1FavoritesStore {
    pub fn new(db: D1Database) -> Self {
        Self { db }
    }

    async fn exists_query(&self, sql: &str, id: i64) -> StorefrontResult<bool> {
        let stmt = self.db.prepare(sql);
        let result = stmt
            .bind(&[id.into()])
            .map_err(|e| StorefrontError::database_error(format!("Failed to bind parameters: {}", e)))?
            .first::<DbRow>(None)
            .await
            .map_err(|e| StorefrontError::database_error(format!("Failed to execute query: {}", e)))?;
        Ok(result.is_some())
    }

    async fn stored_count(&self, product_id: i64) -> StorefrontResult<i64> {
        let stmt = self.db.prepare("SELECT favourites FROM products WHERE id = ?");
        let result = stmt
            .bind(&[product_id.into()])
            .map_err(|e| StorefrontError::database_error(format!("Failed to bind parameters: {}", e)))?
            .first::<DbRow>(None)
            .await
            .map_err(|e| StorefrontError::database_error(format!("Failed to execute query: {}", e)))?;
        Ok(result.map(|row| row_i64(&row, "favourites")).unwrap_or(0))
    }

    fn row_to_favorite_product(&self, row: DbRow) -> FavoriteProduct {
        FavoriteProduct {
            id: row_i64(&row, "id"),
            name: row_string(&row, "name"),
            description: row_opt_string(&row, "description"),
            price: row_f64(&row, "price"),
            image_url: row_opt_string(&row, "image_url"),
            favourites: row_i64(&row, "favourites"),
            favourited_at: row_i64(&row, "favourited_at") as u64,
        }
    }
}

#[async_trait(?Send)]
impl FavoritesStore for D1FavoritesStore {
    async fn user_exists(&self, user_id: i64) -> StorefrontResult<bool> {
        self.exists_query("SELECT id FROM users WHERE id = ?", user_id)
            .await
    }

    async fn product_is_active(&self, product_id: i64) -> StorefrontResult<bool> {
        self.exists_query(
            "SELECT id FROM products WHERE id = ? AND is_active = 1",
            product_id,
        )
        .await
    }

    async fn membership_exists(&self, user_id: i64, product_id: i64) -> StorefrontResult<bool> {
        let stmt = self.db.prepare(
            "SELECT 1 AS present FROM user_favourites WHERE user_id = ? AND product_id = ?",
        );
        let result = stmt
            .bind(&[user_id.into(), product_id.into()])
            .map_err(|e| StorefrontError::database_error(format!("Failed to bind parameters: {}", e)))?
            .first::<DbRow>(None)
            .await
            .map_err(|e| StorefrontError::database_error(format!("Failed to execute query: {}", e)))?;
        Ok(result.is_some())
    }

    async fn list_memberships(&self, user_id: i64) -> StorefrontResult<Vec<FavoriteProduct>> {
        let stmt = self.db.prepare(
            "
            SELECT p.id, p.name, p.description, p.price, p.image_url,
                   p.favourites, uf.created_at AS favourited_at
            FROM products p
            INNER JOIN user_favourites uf ON p.id = uf.product_id
            WHERE uf.user_id = ? AND p.is_active = 1
            ORDER BY uf.created_at DESC
        ",
        );
        let result = stmt
            .bind(&[user_id.into()])
            .map_err(|e| StorefrontError::database_error(format!("Failed to bind parameters: {}", e)))?
            .all()
            .await
            .map_err(|e| StorefrontError::database_error(format!("Failed to execute query: {}", e)))?;

        let rows = result
            .results::<DbRow>()
            .map_err(|e| StorefrontError::database_error(format!("Failed to parse results: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|row| self.row_to_favorite_product(row))
            .collect())
    }

    async fn member_product_ids(&self, user_id: i64) -> StorefrontResult<Vec<i64>> {
        let stmt = self
            .db
            .prepare("SELECT product_id FROM user_favourites WHERE user_id = ?");
        let result = stmt
            .bind(&[user_id.into()])
            .map_err(|e| StorefrontError::database_error(format!("Failed to bind parameters: {}", e)))?
            .all()
            .await
            .map_err(|e| StorefrontError::database_error(format!("Failed to execute query: {}", e)))?;

        let rows = result
            .results::<DbRow>()
            .map_err(|e| StorefrontError::database_error(format!("Failed to parse results: {}", e)))?;

        Ok(rows.iter().map(|row| row_i64(row, "product_id")).collect())
    }

    async fn counter_stats(&self, product_id: i64) -> StorefrontResult<Option<CounterStats>> {
        let stmt = self.db.prepare(
            "
            SELECT p.name, p.favourites, COUNT(uf.id) AS actual_count
            FROM products p
            LEFT JOIN user_favourites uf ON p.id = uf.product_id
            WHERE p.id = ?
            GROUP BY p.id, p.favourites, p.name
        ",
        );
        let result = stmt
            .bind(&[product_id.into()])
            .map_err(|e| StorefrontError::database_error(format!("Failed to bind parameters: {}", e)))?
            .first::<DbRow>(None)
            .await
            .map_err(|e| StorefrontError::database_error(format!("Failed to execute query: {}", e)))?;

        Ok(result.map(|row| {
            let stored = row_i64(&row, "favourites");
            let actual = row_i64(&row, "actual_count");
            CounterStats {
                product_id,
                product_name: row_string(&row, "name"),
                favourites_count: stored,
                actual_count: actual,
                is_synced: stored == actual,
            }
        }))
    }

    async fn add_and_recount(&self, user_id: i64, product_id: i64) -> StorefrontResult<i64> {
        let now = get_current_timestamp_ms() as i64;

        let insert = self
            .db
            .prepare(
                "INSERT OR IGNORE INTO user_favourites (user_id, product_id, created_at) VALUES (?, ?, ?)",
            )
            .bind(&[user_id.into(), product_id.into(), now.into()])
            .map_err(|e| StorefrontError::database_error(format!("Failed to bind parameters: {}", e)))?;

        let recount = self
            .db
            .prepare(RECOUNT_SQL)
            .bind(&[now.into(), product_id.into()])
            .map_err(|e| StorefrontError::database_error(format!("Failed to bind parameters: {}", e)))?;

        self.db
            .batch(vec![insert, recount])
            .await
            .map_err(|e| StorefrontError::database_error(format!("Failed to execute batch: {}", e)))?;

        self.stored_count(product_id).await
    }

    async fn remove_and_recount(&self, user_id: i64, product_id: i64) -> StorefrontResult<i64> {
        let now = get_current_timestamp_ms() as i64;

        let delete = self
            .db
            .prepare("DELETE FROM user_favourites WHERE user_id = ? AND product_id = ?")
            .bind(&[user_id.into(), product_id.into()])
            .map_err(|e| StorefrontError::database_error(format!("Failed to bind parameters: {}", e)))?;

        let recount = self
            .db
            .prepare(RECOUNT_SQL)
            .bind(&[now.into(), product_id.into()])
            .map_err(|e| StorefrontError::database_error(format!("Failed to bind parameters: {}", e)))?;

        self.db
            .batch(vec![delete, recount])
            .await
            .map_err(|e| StorefrontError::database_error(format!("Failed to execute batch: {}", e)))?;

        self.stored_count(product_id).await
    }

    async fn recount(&self, product_id: i64) -> StorefrontResult<i64> {
        let now = get_current_timestamp_ms() as i64;
        self.db
            .prepare(RECOUNT_SQL)
            .bind(&[now.into(), product_id.into()])
            .map_err(|e| StorefrontError::database_error(format!("Failed to bind parameters: {}", e)))?
            .run()
            .await
            .map_err(|e| StorefrontError::database_error(format!("Failed to execute query: {}", e)))?;

        self.stored_count(product_id).await
    }

    async fn clear_memberships(&self, user_id: i64) -> StorefrontResult<()> {
        self.db
            .prepare("DELETE FROM user_favourites WHERE user_id = ?")
            .bind(&[user_id.into()])
            .map_err(|e| StorefrontError::database_error(format!("Failed to bind parameters: {}", e)))?
            .run()
            .await
            .map_err(|e| StorefrontError::database_error(format!("Failed to execute query: {}", e)))?;
        Ok(())
    }
}
