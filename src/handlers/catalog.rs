// src/handlers/catalog.rs

use crate::handlers::error_response;
use crate::responses::ApiResponse;
use crate::services::CatalogService;
use crate::utils::StorefrontError;
use std::collections::HashMap;
use worker::{Env, Request, Response, Result};

fn query_map(req: &Request) -> Result<HashMap<String, String>> {
    let url = req.url()?;
    Ok(url
        .query_pairs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect())
}

/// GET /api/products - active products, optional ?category= and ?limit=
pub async fn handle_get_products(req: Request, env: Env) -> Result<Response> {
    let query = query_map(&req)?;
    let category_id = query.get("category").and_then(|v| v.parse::<i64>().ok());
    let limit = query.get("limit").and_then(|v| v.parse::<u32>().ok());

    let catalog = CatalogService::new(&env)?;
    match catalog.list_products(category_id, limit).await {
        Ok(products) => {
            let response = ApiResponse::success(serde_json::json!({
                "items": products,
                "total": products.len(),
            }));
            Response::from_json(&response)
        }
        Err(e) => error_response(e),
    }
}

/// GET /api/products/:id
pub async fn handle_get_product(_req: Request, env: Env, product_id: &str) -> Result<Response> {
    let product_id: i64 = match product_id.parse() {
        Ok(id) => id,
        Err(_) => return error_response(StorefrontError::validation_error("Invalid product id")),
    };

    let catalog = CatalogService::new(&env)?;
    match catalog.get_product(product_id).await {
        Ok(Some(product)) => {
            let response = ApiResponse::success(product);
            Response::from_json(&response)
        }
        Ok(None) => error_response(StorefrontError::not_found(format!(
            "Product {} not found",
            product_id
        ))),
        Err(e) => error_response(e),
    }
}

/// GET /api/categories
pub async fn handle_get_categories(_req: Request, env: Env) -> Result<Response> {
    let catalog = CatalogService::new(&env)?;
    match catalog.list_categories().await {
        Ok(categories) => {
            let response = ApiResponse::success(serde_json::json!({
                "items": categories,
                "total": categories.len(),
            }));
            Response::from_json(&response)
        }
        Err(e) => error_response(e),
    }
}

/// GET /api/search?q= - substring search over active products
pub async fn handle_search(req: Request, env: Env) -> Result<Response> {
    let query = query_map(&req)?;
    let term = match query.get("q").map(|s| s.trim()).filter(|s| !s.is_empty()) {
        Some(term) => term.to_string(),
        None => {
            return error_response(StorefrontError::validation_error(
                "Query parameter q is required",
            ))
        }
    };

    let catalog = CatalogService::new(&env)?;
    match catalog.search_products(&term).await {
        Ok(products) => {
            let response = ApiResponse::success(serde_json::json!({
                "query": term,
                "items": products,
                "total": products.len(),
            }));
            Response::from_json(&response)
        }
        Err(e) => error_response(e),
    }
}
