//! Request extractors for authenticated routes

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use log::warn;

use crate::core::error::AppError;
use crate::core::models::UserClaims;
use crate::web::server::AppState;

/// Caller identity resolved from the `Authorization` header
///
/// The header carries the raw token; a `Bearer ` prefix is tolerated.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserClaims);

impl AuthenticatedUser {
    /// Claims of the authenticated caller
    pub fn claims(&self) -> &UserClaims {
        &self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AppError::NotAuthenticated)?;
    let raw = header.to_str().map_err(|_| AppError::Unauthorized)?.trim();
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();

    if token.is_empty() {
        return Err(AppError::NotAuthenticated);
    }

    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::internal("application state is not registered"))?;

    match state.tokens.validate_access_token(token) {
        Some(claims) => Ok(AuthenticatedUser(claims)),
        None => {
            warn!("Rejected request to {} with an invalid token", req.path());
            Err(AppError::Unauthorized)
        }
    }
}
