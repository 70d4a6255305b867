// src/handlers/health.rs

use crate::responses::ApiResponse;
use worker::{Env, Request, Response, Result};

/// GET /health - service health summary
pub async fn handle_health_check(_req: Request, env: Env) -> Result<Response> {
    let database = match env.d1("CronoxDB") {
        Ok(_) => "healthy",
        Err(_) => "not_configured",
    };

    let response = ApiResponse::success(serde_json::json!({
        "status": "healthy",
        "services": {
            "database": database,
            "favorites_ledger": "healthy",
            "catalog": "healthy",
        },
    }));
    Response::from_json(&response)
}
