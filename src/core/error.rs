use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde_json::json;
use thiserror::Error;

/// Message returned when a user registers with a username already in use
pub const USERNAME_TAKEN_MESSAGE: &str = "Já existe um usuário com este username";

/// Error type for service operations
#[derive(Error, Debug)]
pub enum AppError {
    /// No Authorization header on a protected route
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Token present but rejected
    #[error("Unauthorized")]
    Unauthorized,

    /// Registration with an existing username
    #[error("{}", USERNAME_TAKEN_MESSAGE)]
    UsernameTaken,

    /// Requested record does not exist
    #[error("Not found")]
    NotFound,

    /// Malformed request body or field
    #[error("{0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("password hash error: {0}")]
    PasswordHash(String),

    #[error("configuration error: {0}")]
    Config(Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    ConfigValidation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bug or misassembled application
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias used across the service
pub type Result<T> = std::result::Result<T, AppError>;

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl AppError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the error is the caller's fault rather than the service's
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotAuthenticated => StatusCode::FORBIDDEN,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::UsernameTaken | AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());

        if !self.is_client_error() {
            error!("Internal error while handling request: {}", self);
            return response.json(json!({ "detail": "Internal server error" }));
        }

        match self {
            AppError::NotFound => response.json(json!({})),
            _ => response.json(json!({ "detail": self.to_string() })),
        }
    }
}
