// src/types.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Catalog product row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub category_id: Option<i64>,
    pub favourites: i64,
    pub is_active: bool,
    pub created_at: u64,
    pub updated_at: u64,
}

/// Catalog category row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
}

/// Public view of a user account (never carries the password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: u64,
}

/// A product the user has favorited, as returned by the ledger's `list`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteProduct {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub favourites: i64,
    pub favourited_at: u64,
}

/// Stored counter vs. live membership count for one product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterStats {
    pub product_id: i64,
    pub product_name: String,
    pub favourites_count: i64,
    pub actual_count: i64,
    pub is_synced: bool,
}

/// Outcome of a bulk reconcile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub user_id: i64,
    pub synced_count: u32,
    pub total_items: u32,
    pub errors: Vec<String>,
}

/// One client-side cached favorite, the shape persisted under the wishlist
/// storage key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalFavoriteEntry {
    pub id: String,
    pub name: String,
    pub price: String,
    pub image: Option<String>,
    #[serde(rename = "addedAt")]
    pub added_at: Option<String>,
}

// ============= REQUEST PAYLOADS =============

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.first_name.trim().is_empty()
            || self.last_name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.is_empty()
        {
            return Err("All fields are required".to_string());
        }
        if self.password.len() < 6 {
            return Err("Password must be at least 6 characters".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err("Email and password are required".to_string());
        }
        Ok(())
    }
}

/// Body of POST / DELETE /api/favourites
#[derive(Debug, Clone, Deserialize)]
pub struct FavouriteMutationRequest {
    pub user_id: Option<i64>,
    pub product_id: Option<i64>,
}

impl FavouriteMutationRequest {
    pub fn validate(&self) -> Result<(i64, i64), String> {
        match (self.user_id, self.product_id) {
            (Some(u), Some(p)) => Ok((u, p)),
            _ => Err("user_id and product_id are required".to_string()),
        }
    }
}

/// One item in the sync payload. Clients persist ids as strings; the
/// deserializer accepts both string and numeric forms.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncItem {
    pub id: Value,
}

impl SyncItem {
    pub fn product_id(&self) -> Option<i64> {
        match &self.id {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }
}

/// Body of POST /api/favourites/sync
#[derive(Debug, Clone, Deserialize)]
pub struct SyncRequest {
    pub user_id: Option<i64>,
    pub wishlist_items: Option<Vec<SyncItem>>,
}

impl SyncRequest {
    pub fn validate(&self) -> Result<(i64, &[SyncItem]), String> {
        match (self.user_id, self.wishlist_items.as_deref()) {
            (Some(u), Some(items)) => Ok((u, items)),
            _ => Err("user_id and wishlist_items are required".to_string()),
        }
    }
}
