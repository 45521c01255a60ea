//! SQLite schema for users, goals and daily values

/// Registered users
pub const CREATE_USERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    username TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    cover TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

pub const CREATE_USERNAME_INDEX: &str = r"
CREATE UNIQUE INDEX IF NOT EXISTS idx_users_username ON users(username)
";

/// Monthly goals, one per user and month
pub const CREATE_GOALS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS goals (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    silver REAL NOT NULL,
    gold REAL NOT NULL,
    diamond REAL NOT NULL,
    date TEXT NOT NULL
)
";

pub const CREATE_GOALS_INDEX: &str = r"
CREATE UNIQUE INDEX IF NOT EXISTS idx_goals_user_date ON goals(user_id, date)
";

/// Daily values, one per user and day
pub const CREATE_DAILY_VALUES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS daily_values (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    value REAL NOT NULL,
    date TEXT NOT NULL
)
";

pub const CREATE_DAILY_VALUES_INDEX: &str = r"
CREATE UNIQUE INDEX IF NOT EXISTS idx_daily_values_user_date ON daily_values(user_id, date)
";

/// All schema creation statements in order
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_USERS_TABLE,
    CREATE_USERNAME_INDEX,
    CREATE_GOALS_TABLE,
    CREATE_GOALS_INDEX,
    CREATE_DAILY_VALUES_TABLE,
    CREATE_DAILY_VALUES_INDEX,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statements_apply_cleanly_twice() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        for _ in 0..2 {
            for stmt in SCHEMA_STATEMENTS {
                conn.execute_batch(stmt).unwrap();
            }
        }
    }

    #[test]
    fn test_goal_month_is_unique_per_user() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        for stmt in SCHEMA_STATEMENTS {
            conn.execute_batch(stmt).unwrap();
        }

        let insert = "INSERT INTO goals (id, user_id, silver, gold, diamond, date) VALUES (?1, 'u', 1, 2, 3, '2024-03')";
        conn.execute(insert, ["a"]).unwrap();
        assert!(conn.execute(insert, ["b"]).is_err());
    }
}
