use worker::*;

// Module declarations
pub mod handlers;
pub mod middleware;
pub mod responses;
pub mod services;
pub mod types;
pub mod utils;

use handlers::*;
use middleware::cors::add_cors_headers;

#[event(fetch)]
pub async fn main(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    utils::logger::set_panic_hook();

    let url = req.url()?;
    let path = url.path().to_string();
    let method = req.method();

    crate::log_info!(&format!("Request: {} {}", method, path));

    // Handle preflight requests
    if method == Method::Options {
        return add_cors_headers(Response::empty()?);
    }

    let response = match (method.clone(), path.as_str()) {
        // Health
        (Method::Get, "/health") => handle_health_check(req, env).await,

        // Accounts
        (Method::Post, "/api/users/register") => handle_register(req, env).await,
        (Method::Post, "/api/users/login") => handle_login(req, env).await,
        (Method::Get, "/api/users/profile") => handle_get_profile(req, env).await,

        // Catalog (read-only)
        (Method::Get, "/api/products") => handle_get_products(req, env).await,
        (Method::Get, p) if p.starts_with("/api/products/") => {
            let id = p.strip_prefix("/api/products/").unwrap_or("");
            handle_get_product(req, env, id).await
        }
        (Method::Get, "/api/categories") => handle_get_categories(req, env).await,
        (Method::Get, "/api/search") => handle_search(req, env).await,

        // Favorites ledger
        (Method::Post, "/api/favourites/sync") => handle_sync_favourites(req, env).await,
        (Method::Get, p) if p.starts_with("/api/favourites/check/") => {
            let rest = p.strip_prefix("/api/favourites/check/").unwrap_or("");
            match rest.split_once('/') {
                Some((user_id, product_id)) => {
                    handle_check_favourite(req, env, user_id, product_id).await
                }
                None => Response::error("Not Found", 404),
            }
        }
        (Method::Get, p) if p.starts_with("/api/favourites/stats/") => {
            let id = p.strip_prefix("/api/favourites/stats/").unwrap_or("");
            handle_favourites_stats(req, env, id).await
        }
        (Method::Get, p) if p.starts_with("/api/favourites/") => {
            let id = p.strip_prefix("/api/favourites/").unwrap_or("");
            handle_get_favourites(req, env, id).await
        }
        (Method::Post, "/api/favourites") => handle_add_favourite(req, env).await,
        (Method::Delete, "/api/favourites") => handle_remove_favourite(req, env).await,

        _ => {
            crate::log_warn!(&format!("Route not found: {} {}", method, path));
            Response::error("Not Found", 404)
        }
    };

    response.and_then(add_cors_headers)
}
