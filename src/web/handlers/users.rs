//! Registration and login

use actix_web::{web, HttpResponse};
use log::{debug, info};
use rusqlite::ErrorCode;
use serde_json::json;

use crate::core::auth::{hash_password, verify_password};
use crate::core::error::AppError;
use crate::core::models::NewUser;
use crate::web::models::{CreateUserRequest, LoginRequest, TokenResponse};
use crate::web::server::AppState;

/// Register a new user
pub async fn create_user(
    data: web::Data<AppState>,
    request: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();

    if data.repository.find_user_by_username(&request.username).await?.is_some() {
        debug!("Username {} is already registered", request.username);
        return Err(AppError::UsernameTaken);
    }

    let password = request.password;
    let password_hash = web::block(move || hash_password(&password))
        .await
        .map_err(|e| AppError::internal(e.to_string()))??;

    let new_user = NewUser {
        name: request.name,
        username: request.username,
        password_hash,
        cover: request.cover,
    };

    let user = match data.repository.insert_user(new_user).await {
        Ok(user) => user,
        // Lost a race with a concurrent registration of the same username
        Err(AppError::Database(rusqlite::Error::SqliteFailure(e, _)))
            if e.code == ErrorCode::ConstraintViolation =>
        {
            return Err(AppError::UsernameTaken);
        }
        Err(e) => return Err(e),
    };

    info!("Created user {} ({})", user.username, user.id);
    Ok(HttpResponse::Created().json(json!({})))
}

/// Exchange credentials for an access token
pub async fn login(
    data: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();

    let record = match data.repository.find_user_by_username(&request.username).await? {
        Some(record) => record,
        None => {
            debug!("Login for unknown username {}", request.username);
            return Err(AppError::NotFound);
        }
    };

    let password = request.password;
    let password_hash = record.password_hash.clone();
    let valid = web::block(move || verify_password(&password, &password_hash))
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;

    if !valid {
        debug!("Login for {} with a wrong password", record.user.username);
        return Err(AppError::NotFound);
    }

    let token = data.tokens.create_access_token(&record.user)?;
    info!("User {} logged in", record.user.username);

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}
