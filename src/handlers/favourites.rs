// src/handlers/favourites.rs

use crate::handlers::error_response;
use crate::log_info;
use crate::middleware::require_user;
use crate::responses::ApiResponse;
use crate::services::favorites::{D1FavoritesStore, FavoritesLedger};
use crate::types::{FavouriteMutationRequest, SyncRequest};
use crate::utils::StorefrontError;
use worker::{Env, Request, Response, Result};

fn ledger(env: &Env) -> Result<FavoritesLedger<D1FavoritesStore>> {
    Ok(FavoritesLedger::new(D1FavoritesStore::new(
        env.d1("CronoxDB")?,
    )))
}

/// GET /api/favourites/:userId - the user's favorites, newest first
pub async fn handle_get_favourites(req: Request, env: Env, user_id: &str) -> Result<Response> {
    let user_id: i64 = match user_id.parse() {
        Ok(id) => id,
        Err(_) => return error_response(StorefrontError::validation_error("Invalid user id")),
    };

    if let Err(e) = require_user(&req, &env, user_id) {
        return error_response(e);
    }

    match ledger(&env)?.list(user_id).await {
        Ok(items) => {
            let response = ApiResponse::success(serde_json::json!({
                "items": items,
                "total": items.len(),
            }));
            Response::from_json(&response)
        }
        Err(e) => error_response(e),
    }
}

/// POST /api/favourites - add one product to the user's favorites
pub async fn handle_add_favourite(mut req: Request, env: Env) -> Result<Response> {
    let body: FavouriteMutationRequest = match req.json().await {
        Ok(data) => data,
        Err(e) => {
            return error_response(StorefrontError::validation_error(format!(
                "Invalid JSON format: {}",
                e
            )))
        }
    };

    let (user_id, product_id) = match body.validate() {
        Ok(ids) => ids,
        Err(message) => return error_response(StorefrontError::validation_error(message)),
    };

    if let Err(e) = require_user(&req, &env, user_id) {
        return error_response(e);
    }

    match ledger(&env)?.add(user_id, product_id).await {
        Ok(count) => {
            let response = ApiResponse::success(serde_json::json!({
                "message": "Product added to favourites",
                "product_id": product_id,
                "favourites_count": count,
            }));
            Response::from_json(&response)
        }
        Err(e) => error_response(e),
    }
}

/// DELETE /api/favourites - remove one product from the user's favorites.
/// Removing a product that was never favorited succeeds with the unchanged
/// count; the client may be retrying or racing another session.
pub async fn handle_remove_favourite(mut req: Request, env: Env) -> Result<Response> {
    let body: FavouriteMutationRequest = match req.json().await {
        Ok(data) => data,
        Err(e) => {
            return error_response(StorefrontError::validation_error(format!(
                "Invalid JSON format: {}",
                e
            )))
        }
    };

    let (user_id, product_id) = match body.validate() {
        Ok(ids) => ids,
        Err(message) => return error_response(StorefrontError::validation_error(message)),
    };

    if let Err(e) = require_user(&req, &env, user_id) {
        return error_response(e);
    }

    match ledger(&env)?.remove(user_id, product_id).await {
        Ok(count) => {
            let response = ApiResponse::success(serde_json::json!({
                "message": "Product removed from favourites",
                "product_id": product_id,
                "favourites_count": count,
            }));
            Response::from_json(&response)
        }
        Err(e) => error_response(e),
    }
}

/// GET /api/favourites/check/:userId/:productId - membership test
pub async fn handle_check_favourite(
    req: Request,
    env: Env,
    user_id: &str,
    product_id: &str,
) -> Result<Response> {
    let (user_id, product_id): (i64, i64) = match (user_id.parse(), product_id.parse()) {
        (Ok(u), Ok(p)) => (u, p),
        _ => {
            return error_response(StorefrontError::validation_error(
                "Invalid user or product id",
            ))
        }
    };

    if let Err(e) = require_user(&req, &env, user_id) {
        return error_response(e);
    }

    match ledger(&env)?.check(user_id, product_id).await {
        Ok(is_favourite) => {
            let response = ApiResponse::success(serde_json::json!({
                "is_favourite": is_favourite,
            }));
            Response::from_json(&response)
        }
        Err(e) => error_response(e),
    }
}

/// GET /api/favourites/stats/:productId - stored counter vs. live count
pub async fn handle_favourites_stats(
    _req: Request,
    env: Env,
    product_id: &str,
) -> Result<Response> {
    let product_id: i64 = match product_id.parse() {
        Ok(id) => id,
        Err(_) => return error_response(StorefrontError::validation_error("Invalid product id")),
    };

    match ledger(&env)?.stats(product_id).await {
        Ok(stats) => {
            let response = ApiResponse::success(stats);
            Response::from_json(&response)
        }
        Err(e) => error_response(e),
    }
}

/// POST /api/favourites/sync - replace the user's membership set with the
/// client's cached wishlist. Items referencing unknown or inactive products
/// are reported per item; the call itself still succeeds.
pub async fn handle_sync_favourites(mut req: Request, env: Env) -> Result<Response> {
    let body: SyncRequest = match req.json().await {
        Ok(data) => data,
        Err(e) => {
            return error_response(StorefrontError::validation_error(format!(
                "Invalid JSON format: {}",
                e
            )))
        }
    };

    let (user_id, items) = match body.validate() {
        Ok(parsed) => parsed,
        Err(message) => return error_response(StorefrontError::validation_error(message)),
    };

    if let Err(e) = require_user(&req, &env, user_id) {
        return error_response(e);
    }

    let mut parse_errors = Vec::new();
    let mut desired = Vec::with_capacity(items.len());
    for item in items {
        match item.product_id() {
            Some(product_id) => desired.push(product_id),
            None => parse_errors.push(format!("Invalid product id: {}", item.id)),
        }
    }

    match ledger(&env)?.reconcile(user_id, &desired).await {
        Ok(mut report) => {
            report.total_items = items.len() as u32;
            report.errors.extend(parse_errors);
            log_info!(&format!(
                "Favorites sync completed for user {}: {}/{} items",
                user_id, report.synced_count, report.total_items
            ));
            let response = ApiResponse::success(report);
            Response::from_json(&response)
        }
        Err(e) => error_response(e),
    }
}
