use serde::{Deserialize, Serialize};

use crate::core::models::{DailyValue, Goal};

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// User registration request
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub username: String,
    pub password: String,
    pub cover: String,
}

/// Goal request
///
/// `user_id` is accepted for compatibility but always replaced by the
/// authenticated user.
#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    #[serde(default)]
    pub user_id: String,
    pub silver: f64,
    pub gold: f64,
    pub diamond: f64,
    /// Month as `YYYY-MM`
    pub date: String,
}

/// Daily value request
#[derive(Debug, Deserialize)]
pub struct CreateDailyValueRequest {
    #[serde(default)]
    pub user_id: String,
    pub value: f64,
    /// Day as `YYYY-MM-DD` or a timestamp on that day
    pub date: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub health_check: String,
}

/// Token check response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenStatusResponse {
    pub token_status: String,
    pub username: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Goals listing
#[derive(Debug, Serialize, Deserialize)]
pub struct GoalsResponse {
    pub goals: Vec<Goal>,
}

/// Daily values listing
#[derive(Debug, Serialize, Deserialize)]
pub struct DailyValuesResponse {
    pub values: Vec<DailyValue>,
}
