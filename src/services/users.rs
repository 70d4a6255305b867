// src/services/users.rs

use crate::types::{LoginRequest, RegisterRequest, UserAccount};
use crate::utils::jwt::{self, AuthClaims};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::time::get_current_timestamp_ms;
use crate::utils::{row_i64, row_string, DbRow, StorefrontError, StorefrontResult};
use once_cell::sync::Lazy;
use regex::Regex;
use worker::{D1Database, Env};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

/// UserService owns the credential store: registration, login and profile
/// lookups over the `users` table.
pub struct UserService {
    db: D1Database,
    jwt_secret: String,
}

impl UserService {
    pub fn new(env: &Env) -> worker::Result<Self> {
        let db = env.d1("CronoxDB")?;
        let jwt_secret = env
            .var("JWT_SECRET")
            .map_err(|_| worker::Error::RustError("Missing JWT_SECRET".to_string()))?
            .to_string();
        Ok(UserService { db, jwt_secret })
    }

    /// Creates an account and returns the public profile plus a bearer token.
    pub async fn register(&self, request: &RegisterRequest) -> StorefrontResult<(UserAccount, String)> {
        request
            .validate()
            .map_err(StorefrontError::validation_error)?;

        let email = request.email.trim().to_lowercase();
        if !EMAIL_RE.is_match(&email) {
            return Err(StorefrontError::validation_error("Invalid email address"));
        }

        if self.find_by_email(&email).await?.is_some() {
            return Err(StorefrontError::conflict_error(
                "Email is already registered",
            ));
        }

        let now = get_current_timestamp_ms() as i64;
        self.db
            .prepare(
                "
                INSERT INTO users (first_name, last_name, email, password_hash, created_at)
                VALUES (?, ?, ?, ?, ?)
            ",
            )
            .bind(&[
                request.first_name.trim().into(),
                request.last_name.trim().into(),
                email.clone().into(),
                hash_password(&request.password).into(),
                now.into(),
            ])
            .map_err(|e| StorefrontError::database_error(format!("Failed to bind parameters: {}", e)))?
            .run()
            .await
            .map_err(|e| StorefrontError::database_error(format!("Failed to execute query: {}", e)))?;

        let row = self.find_by_email(&email).await?.ok_or_else(|| {
            StorefrontError::database_error("User row missing after insert")
        })?;
        let account = row_to_account(&row);
        let token = jwt::sign(
            &AuthClaims::new(account.id, account.email.clone()),
            &self.jwt_secret,
        )?;

        Ok((account, token))
    }

    /// Verifies credentials and returns the public profile plus a bearer
    /// token. Missing user and wrong password are indistinguishable to the
    /// caller.
    pub async fn login(&self, request: &LoginRequest) -> StorefrontResult<(UserAccount, String)> {
        request
            .validate()
            .map_err(StorefrontError::validation_error)?;

        let email = request.email.trim().to_lowercase();
        let row = self
            .find_by_email(&email)
            .await?
            .ok_or_else(|| StorefrontError::authentication_error("Invalid credentials"))?;

        let stored_hash = row_string(&row, "password_hash");
        if !verify_password(&request.password, &stored_hash) {
            return Err(StorefrontError::authentication_error("Invalid credentials"));
        }

        let account = row_to_account(&row);
        let token = jwt::sign(
            &AuthClaims::new(account.id, account.email.clone()),
            &self.jwt_secret,
        )?;

        Ok((account, token))
    }

    pub async fn profile(&self, user_id: i64) -> StorefrontResult<UserAccount> {
        let result = self
            .db
            .prepare("SELECT * FROM users WHERE id = ?")
            .bind(&[user_id.into()])
            .map_err(|e| StorefrontError::database_error(format!("Failed to bind parameters: {}", e)))?
            .first::<DbRow>(None)
            .await
            .map_err(|e| StorefrontError::database_error(format!("Failed to execute query: {}", e)))?;

        result
            .map(|row| row_to_account(&row))
            .ok_or_else(|| StorefrontError::not_found(format!("User {} not found", user_id)))
    }

    async fn find_by_email(&self, email: &str) -> StorefrontResult<Option<DbRow>> {
        self.db
            .prepare("SELECT * FROM users WHERE email = ?")
            .bind(&[email.into()])
            .map_err(|e| StorefrontError::database_error(format!("Failed to bind parameters: {}", e)))?
            .first::<DbRow>(None)
            .await
            .map_err(|e| StorefrontError::database_error(format!("Failed to execute query: {}", e)))
    }
}

fn row_to_account(row: &DbRow) -> UserAccount {
    UserAccount {
        id: row_i64(row, "id"),
        first_name: row_string(row, "first_name"),
        last_name: row_string(row, "last_name"),
        email: row_string(row, "email"),
        created_at: row_i64(row, "created_at") as u64,
    }
}
