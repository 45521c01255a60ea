use actix_web::{HttpResponse, Responder};

use crate::web::extractors::AuthenticatedUser;
use crate::web::models::{HealthCheckResponse, TokenStatusResponse};

/// Liveness probe
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthCheckResponse {
        health_check: "ok".to_string(),
    })
}

/// Confirm the caller's token is still accepted
pub async fn check_token(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(TokenStatusResponse {
        token_status: "ok".to_string(),
        username: user.claims().username.clone(),
    })
}
