//! Monthly goals for the authenticated user

use actix_web::{web, HttpResponse};
use log::{debug, info};
use serde_json::json;

use crate::core::error::AppError;
use crate::core::models::GoalAmounts;
use crate::storage::Upsert;
use crate::utils::normalize_month;
use crate::web::extractors::AuthenticatedUser;
use crate::web::models::{CreateGoalRequest, GoalsResponse};
use crate::web::server::AppState;

/// List the caller's goals
pub async fn get_goals(
    data: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let goals = data.repository.list_goals(&user.claims().id).await?;
    debug!("Found {} goals for {}", goals.len(), user.claims().username);

    Ok(HttpResponse::Ok().json(GoalsResponse { goals }))
}

/// Create or replace the caller's goal for a month
pub async fn create_goal(
    data: web::Data<AppState>,
    user: AuthenticatedUser,
    request: web::Json<CreateGoalRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = user.claims().id.as_str();

    if data.repository.find_user_by_id(user_id).await?.is_none() {
        debug!("Token for {} refers to a deleted user", user_id);
        return Err(AppError::NotFound);
    }

    if !request.user_id.is_empty() && request.user_id != user_id {
        debug!("Ignoring user_id {} in goal body from {}", request.user_id, user_id);
    }

    let month = normalize_month(&request.date)?;
    let amounts = GoalAmounts {
        silver: request.silver,
        gold: request.gold,
        diamond: request.diamond,
    };

    match data.repository.upsert_goal(user_id, &month, amounts).await? {
        Upsert::Created => {
            info!("Created goal {} for {}", month, user_id);
            Ok(HttpResponse::Created().json(json!({})))
        }
        Upsert::Updated => {
            info!("Updated goal {} for {}", month, user_id);
            Ok(HttpResponse::Ok().json(json!({})))
        }
    }
}
