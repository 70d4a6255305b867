// src/handlers/users.rs

use crate::handlers::error_response;
use crate::middleware::authenticate;
use crate::responses::ApiResponse;
use crate::services::UserService;
use crate::types::{LoginRequest, RegisterRequest};
use crate::utils::StorefrontError;
use worker::{Env, Request, Response, Result};

/// POST /api/users/register
pub async fn handle_register(mut req: Request, env: Env) -> Result<Response> {
    let body: RegisterRequest = match req.json().await {
        Ok(data) => data,
        Err(e) => {
            return error_response(StorefrontError::validation_error(format!(
                "Invalid JSON format: {}",
                e
            )))
        }
    };

    let users = UserService::new(&env)?;
    match users.register(&body).await {
        Ok((account, token)) => {
            let response = ApiResponse::success(serde_json::json!({
                "id": account.id,
                "firstName": account.first_name,
                "lastName": account.last_name,
                "email": account.email,
                "token": token,
            }));
            Ok(Response::from_json(&response)?.with_status(201))
        }
        Err(e) => error_response(e),
    }
}

/// POST /api/users/login
pub async fn handle_login(mut req: Request, env: Env) -> Result<Response> {
    let body: LoginRequest = match req.json().await {
        Ok(data) => data,
        Err(e) => {
            return error_response(StorefrontError::validation_error(format!(
                "Invalid JSON format: {}",
                e
            )))
        }
    };

    let users = UserService::new(&env)?;
    match users.login(&body).await {
        Ok((account, token)) => {
            let response = ApiResponse::success(serde_json::json!({
                "id": account.id,
                "firstName": account.first_name,
                "lastName": account.last_name,
                "email": account.email,
                "token": token,
            }));
            Response::from_json(&response)
        }
        Err(e) => error_response(e),
    }
}

/// GET /api/users/profile - the authenticated caller's account
pub async fn handle_get_profile(req: Request, env: Env) -> Result<Response> {
    let claims = match authenticate(&req, &env) {
        Ok(claims) => claims,
        Err(e) => return error_response(e),
    };

    let users = UserService::new(&env)?;
    match users.profile(claims.user_id).await {
        Ok(account) => {
            let response = ApiResponse::success(account);
            Response::from_json(&response)
        }
        Err(e) => error_response(e),
    }
}
