//! Persistence for users, goals and daily values
//!
//! Handlers talk to the [`Repository`] trait; [`sqlite::SqliteRepository`]
//! is the production backend.

pub mod schema;
pub mod sqlite;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::core::models::{DailyValue, Goal, GoalAmounts, NewUser, User, UserRecord};

pub use sqlite::SqliteRepository;

/// Outcome of writing a record keyed by user and date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// No record existed for the key and one was inserted
    Created,
    /// The existing record was overwritten
    Updated,
}

/// Storage operations used by the HTTP layer
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Repository: Send + Sync {
    /// Look up a user, including the credential hash, by username
    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>>;

    /// Look up a user by id
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Store a new user and return its public record
    async fn insert_user(&self, user: NewUser) -> Result<User>;

    /// All goals for a user, oldest month first
    async fn list_goals(&self, user_id: &str) -> Result<Vec<Goal>>;

    /// Create or overwrite the goal for a user and month
    async fn upsert_goal(&self, user_id: &str, month: &str, amounts: GoalAmounts) -> Result<Upsert>;

    /// All daily values for a user, oldest day first
    async fn list_daily_values(&self, user_id: &str) -> Result<Vec<DailyValue>>;

    /// Create or overwrite the value for a user and day
    async fn upsert_daily_value(&self, user_id: &str, day: &str, value: f64) -> Result<Upsert>;
}
