//! Daily values for the authenticated user

use actix_web::{web, HttpResponse};
use log::{debug, info};
use serde_json::json;

use crate::core::error::AppError;
use crate::storage::Upsert;
use crate::utils::normalize_day;
use crate::web::extractors::AuthenticatedUser;
use crate::web::models::{CreateDailyValueRequest, DailyValuesResponse};
use crate::web::server::AppState;

/// List the caller's daily values
pub async fn get_daily_values(
    data: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let values = data.repository.list_daily_values(&user.claims().id).await?;
    debug!("Found {} daily values for {}", values.len(), user.claims().username);

    Ok(HttpResponse::Ok().json(DailyValuesResponse { values }))
}

/// Create or replace the caller's value for a day
pub async fn create_daily_value(
    data: web::Data<AppState>,
    user: AuthenticatedUser,
    request: web::Json<CreateDailyValueRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = user.claims().id.as_str();

    if data.repository.find_user_by_id(user_id).await?.is_none() {
        debug!("Token for {} refers to a deleted user", user_id);
        return Err(AppError::NotFound);
    }

    if !request.user_id.is_empty() && request.user_id != user_id {
        debug!("Ignoring user_id {} in value body from {}", request.user_id, user_id);
    }

    let day = normalize_day(&request.date)?;

    match data.repository.upsert_daily_value(user_id, &day, request.value).await? {
        Upsert::Created => {
            info!("Recorded value for {} on {}", user_id, day);
            Ok(HttpResponse::Created().json(json!({})))
        }
        Upsert::Updated => {
            info!("Updated value for {} on {}", user_id, day);
            Ok(HttpResponse::Ok().json(json!({})))
        }
    }
}
