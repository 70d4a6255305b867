// src/services/catalog.rs

use crate::types::{Category, Product};
use crate::utils::{
    row_bool, row_f64, row_i64, row_opt_string, row_string, DbRow, StorefrontError,
    StorefrontResult,
};
use worker::{D1Database, Env};

const DEFAULT_PAGE_SIZE: u32 = 50;
const SEARCH_RESULT_CAP: u32 = 25;

/// CatalogService provides read-only product and category queries.
/// The catalog is a collaborator of the favorites ledger: writes to it happen
/// out of band, this service only ever reads.
pub struct CatalogService {
    db: D1Database,
}

impl CatalogService {
    pub fn new(env: &Env) -> worker::Result<Self> {
        let db = env.d1("CronoxDB")?;
        Ok(CatalogService { db })
    }

    pub fn with_database(db: D1Database) -> Self {
        CatalogService { db }
    }

    /// Active products, newest first, optionally restricted to one category.
    pub async fn list_products(
        &self,
        category_id: Option<i64>,
        limit: Option<u32>,
    ) -> StorefrontResult<Vec<Product>> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).min(200) as i64;

        let (sql, params): (&str, Vec<worker::wasm_bindgen::JsValue>) = match category_id {
            Some(category) => (
                "
                SELECT * FROM products
                WHERE is_active = 1 AND category_id = ?
                ORDER BY created_at DESC
                LIMIT ?
            ",
                vec![category.into(), limit.into()],
            ),
            None => (
                "
                SELECT * FROM products
                WHERE is_active = 1
                ORDER BY created_at DESC
                LIMIT ?
            ",
                vec![limit.into()],
            ),
        };

        let result = self
            .db
            .prepare(sql)
            .bind(&params)
            .map_err(|e| StorefrontError::database_error(format!("Failed to bind parameters: {}", e)))?
            .all()
            .await
            .map_err(|e| StorefrontError::database_error(format!("Failed to execute query: {}", e)))?;

        let rows = result
            .results::<DbRow>()
            .map_err(|e| StorefrontError::database_error(format!("Failed to parse results: {}", e)))?;

        Ok(rows.into_iter().map(row_to_product).collect())
    }

    /// A single active product; None when missing or inactive.
    pub async fn get_product(&self, product_id: i64) -> StorefrontResult<Option<Product>> {
        let result = self
            .db
            .prepare("SELECT * FROM products WHERE id = ? AND is_active = 1")
            .bind(&[product_id.into()])
            .map_err(|e| StorefrontError::database_error(format!("Failed to bind parameters: {}", e)))?
            .first::<DbRow>(None)
            .await
            .map_err(|e| StorefrontError::database_error(format!("Failed to execute query: {}", e)))?;

        Ok(result.map(row_to_product))
    }

    pub async fn list_categories(&self) -> StorefrontResult<Vec<Category>> {
        let result = self
            .db
            .prepare("SELECT * FROM categories WHERE is_active = 1 ORDER BY name ASC")
            .all()
            .await
            .map_err(|e| StorefrontError::database_error(format!("Failed to execute query: {}", e)))?;

        let rows = result
            .results::<DbRow>()
            .map_err(|e| StorefrontError::database_error(format!("Failed to parse results: {}", e)))?;

        Ok(rows.into_iter().map(row_to_category).collect())
    }

    /// Case-insensitive substring search over name and description of active
    /// products.
    pub async fn search_products(&self, query: &str) -> StorefrontResult<Vec<Product>> {
        let pattern = format!("%{}%", query.trim().to_lowercase());
        let result = self
            .db
            .prepare(
                "
                SELECT * FROM products
                WHERE is_active = 1
                  AND (LOWER(name) LIKE ? OR LOWER(COALESCE(description, '')) LIKE ?)
                ORDER BY name ASC
                LIMIT ?
            ",
            )
            .bind(&[
                pattern.clone().into(),
                pattern.into(),
                (SEARCH_RESULT_CAP as i64).into(),
            ])
            .map_err(|e| StorefrontError::database_error(format!("Failed to bind parameters: {}", e)))?
            .all()
            .await
            .map_err(|e| StorefrontError::database_error(format!("Failed to execute query: {}", e)))?;

        let rows = result
            .results::<DbRow>()
            .map_err(|e| StorefrontError::database_error(format!("Failed to parse results: {}", e)))?;

        Ok(rows.into_iter().map(row_to_product).collect())
    }
}

fn row_to_product(row: DbRow) -> Product {
    Product {
        id: row_i64(&row, "id"),
        name: row_string(&row, "name"),
        description: row_opt_string(&row, "description"),
        price: row_f64(&row, "price"),
        image_url: row_opt_string(&row, "image_url"),
        category_id: match row.get("category_id") {
            Some(serde_json::Value::Null) | None => None,
            _ => Some(row_i64(&row, "category_id")),
        },
        favourites: row_i64(&row, "favourites"),
        is_active: row_bool(&row, "is_active"),
        created_at: row_i64(&row, "created_at") as u64,
        updated_at: row_i64(&row, "updated_at") as u64,
    }
}

fn row_to_category(row: DbRow) -> Category {
    Category {
        id: row_i64(&row, "id"),
        name: row_string(&row, "name"),
        slug: row_string(&row, "slug"),
        is_active: row_bool(&row, "is_active"),
    }
}
