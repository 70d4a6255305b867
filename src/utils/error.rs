// src/utils/error.rs

use serde::{Deserialize, Serialize};
use std::fmt;

pub type StorefrontResult<T> = Result<T, StorefrontError>;

/// Main error type for the storefront application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontError {
    pub message: String,
    pub status: Option<u16>,
    pub error_code: Option<String>,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    #[default]
    UnknownError,
    NetworkError,
    DatabaseError,
    ValidationError,
    AuthenticationError,
    AuthorizationError,
    ConfigurationError,
    SerializationError,
    DeserializationError,
    NotFoundError,
    ConflictError,
    InternalServerError,
}

impl fmt::Display for StorefrontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StorefrontError {}

impl StorefrontError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            error_code: None,
            kind,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code(mut self, error_code: impl Into<String>) -> Self {
        self.error_code = Some(error_code.into());
        self
    }

    /// HTTP status this error maps to; 500 when none was attached.
    pub fn http_status(&self) -> u16 {
        self.status.unwrap_or(500)
    }

    /// Store-unreachable/network class of failure. The sync protocol treats
    /// these as retry-later, never as data loss.
    pub fn is_connectivity(&self) -> bool {
        matches!(self.kind, ErrorKind::NetworkError | ErrorKind::DatabaseError)
    }

    // Convenience constructors for common error types
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, message)
            .with_status(400)
            .with_code("VALIDATION_ERROR")
    }

    pub fn not_found<T: Into<String>>(message: T) -> Self {
        Self::new(ErrorKind::NotFoundError, message)
            .with_status(404)
            .with_code("NOT_FOUND")
    }

    pub fn authentication_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthenticationError, message)
            .with_status(401)
            .with_code("AUTH_ERROR")
    }

    pub fn authorization_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthorizationError, message)
            .with_status(403)
            .with_code("ACCESS_DENIED")
    }

    pub fn conflict_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConflictError, message)
            .with_status(400)
            .with_code("CONFLICT")
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DatabaseError, message)
            .with_status(500)
            .with_code("DATABASE_ERROR")
    }

    pub fn network_error<T: Into<String>>(message: T) -> Self {
        Self::new(ErrorKind::NetworkError, message)
            .with_status(503)
            .with_code("NETWORK_ERROR")
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DeserializationError, message)
            .with_status(400)
            .with_code("PARSE_ERROR")
    }

    pub fn serialization_error<T: Into<String>>(message: T) -> Self {
        Self::new(ErrorKind::SerializationError, message)
            .with_status(400)
            .with_code("SERIALIZATION_ERROR")
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigurationError, message)
            .with_status(500)
            .with_code("CONFIG_ERROR")
    }

    pub fn internal_error<T: Into<String>>(message: T) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
            .with_status(500)
            .with_code("INTERNAL_ERROR")
    }
}

// Implement From conversions for common error types
impl From<serde_json::Error> for StorefrontError {
    fn from(err: serde_json::Error) -> Self {
        StorefrontError::parse_error(format!("JSON parsing error: {}", err))
    }
}

impl From<worker::Error> for StorefrontError {
    fn from(err: worker::Error) -> Self {
        StorefrontError::database_error(format!("Worker error: {:?}", err))
    }
}

impl From<String> for StorefrontError {
    fn from(err: String) -> Self {
        Self::validation_error(err)
    }
}

impl From<&str> for StorefrontError {
    fn from(err: &str) -> Self {
        Self::validation_error(err.to_string())
    }
}

impl From<url::ParseError> for StorefrontError {
    fn from(err: url::ParseError) -> Self {
        StorefrontError::validation_error(format!("URL parse error: {}", err))
    }
}

// Implementation to convert StorefrontError into worker::Error
impl From<StorefrontError> for worker::Error {
    fn from(err: StorefrontError) -> Self {
        let message = if let Some(status_code) = err.status {
            format!(
                "[Status: {}] StorefrontError (Kind: {:?}): {}",
                status_code, err.kind, err.message
            )
        } else {
            format!("StorefrontError (Kind: {:?}): {}", err.kind, err.message)
        };

        worker::Error::RustError(message)
    }
}
