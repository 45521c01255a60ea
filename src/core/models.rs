use serde::{Deserialize, Serialize};

/// Public view of a registered user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub username: String,
    /// Profile cover image reference
    pub cover: String,
}

/// Stored user including the credential hash
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub user: User,
    /// Argon2 PHC string
    pub password_hash: String,
}

/// User about to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub password_hash: String,
    pub cover: String,
}

/// Monthly savings goal across the three denominations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub silver: f64,
    pub gold: f64,
    pub diamond: f64,
    /// Month in `YYYY-MM` form
    pub date: String,
}

/// Value recorded for a single day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyValue {
    pub id: String,
    pub user_id: String,
    pub value: f64,
    /// Day in `YYYY-MM-DD` form
    pub date: String,
}

/// Payload carried inside an access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserClaims {
    pub id: String,
    pub name: String,
    pub username: String,
    pub cover: String,
    /// Expiration as seconds since the Unix epoch
    pub exp: u64,
}

impl UserClaims {
    /// Build claims for a user expiring at `exp`
    pub fn for_user(user: &User, exp: u64) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            username: user.username.clone(),
            cover: user.cover.clone(),
            exp,
        }
    }

    /// The user these claims were issued for
    #[cfg(test)]
    pub fn user(&self) -> User {
        User {
            id: self.id.clone(),
            name: self.name.clone(),
            username: self.username.clone(),
            cover: self.cover.clone(),
        }
    }
}

/// Plain snapshot of goal amounts, used when writing a goal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalAmounts {
    pub silver: f64,
    pub gold: f64,
    pub diamond: f64,
}
