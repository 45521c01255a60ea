use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::models::{DailyValue, Goal, GoalAmounts, NewUser, User, UserRecord};
use crate::storage::schema::SCHEMA_STATEMENTS;
use crate::storage::{Repository, Upsert};

/// SQLite-backed repository
///
/// A single connection is shared behind a mutex and only touched from the
/// blocking thread pool. Upserts run their lookup and write inside one
/// transaction while holding the lock.
#[derive(Debug)]
pub struct SqliteRepository {
    /// Path to the database file
    path: PathBuf,
    /// Database connection
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRepository {
    /// Open or create the database at `path` and apply the schema
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        initialize_schema(&conn)?;

        info!("Database connected at {}", path.display());
        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open a private in-memory database
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Path to the database file
    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against the connection on the blocking thread pool
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|_| AppError::internal("database connection lock poisoned"))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| AppError::internal(format!("database task failed: {}", e)))?
    }
}

impl Drop for SqliteRepository {
    fn drop(&mut self) {
        info!("Database disconnected from {}", self.path.display());
    }
}

fn initialize_schema(conn: &Connection) -> Result<()> {
    for stmt in SCHEMA_STATEMENTS {
        conn.execute_batch(stmt)?;
    }
    Ok(())
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        username: row.get(2)?,
        cover: row.get(3)?,
    })
}

fn goal_from_row(row: &Row<'_>) -> rusqlite::Result<Goal> {
    Ok(Goal {
        id: row.get(0)?,
        user_id: row.get(1)?,
        silver: row.get(2)?,
        gold: row.get(3)?,
        diamond: row.get(4)?,
        date: row.get(5)?,
    })
}

fn daily_value_from_row(row: &Row<'_>) -> rusqlite::Result<DailyValue> {
    Ok(DailyValue {
        id: row.get(0)?,
        user_id: row.get(1)?,
        value: row.get(2)?,
        date: row.get(3)?,
    })
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let username = username.to_string();

        self.with_conn(move |conn| {
            let record = conn
                .query_row(
                    "SELECT id, name, username, cover, password_hash FROM users WHERE username = ?1",
                    [username],
                    |row| {
                        Ok(UserRecord {
                            user: user_from_row(row)?,
                            password_hash: row.get(4)?,
                        })
                    },
                )
                .optional()?;
            Ok(record)
        })
        .await
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let id = id.to_string();

        self.with_conn(move |conn| {
            let user = conn
                .query_row(
                    "SELECT id, name, username, cover FROM users WHERE id = ?1",
                    [id],
                    user_from_row,
                )
                .optional()?;
            Ok(user)
        })
        .await
    }

    async fn insert_user(&self, user: NewUser) -> Result<User> {
        self.with_conn(move |conn| {
            let id = new_id();
            conn.execute(
                "INSERT INTO users (id, name, username, password_hash, cover) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, user.name, user.username, user.password_hash, user.cover],
            )?;

            debug!("Inserted user {} with id {}", user.username, id);
            Ok(User {
                id,
                name: user.name,
                username: user.username,
                cover: user.cover,
            })
        })
        .await
    }

    async fn list_goals(&self, user_id: &str) -> Result<Vec<Goal>> {
        let user_id = user_id.to_string();

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, silver, gold, diamond, date FROM goals WHERE user_id = ?1 ORDER BY date ASC",
            )?;
            let goals = stmt
                .query_map([user_id], goal_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(goals)
        })
        .await
    }

    async fn upsert_goal(&self, user_id: &str, month: &str, amounts: GoalAmounts) -> Result<Upsert> {
        let user_id = user_id.to_string();
        let month = month.to_string();

        self.with_conn(move |conn| {
            let tx = conn.transaction()?;

            let existing: Option<String> = tx
                .query_row(
                    "SELECT id FROM goals WHERE user_id = ?1 AND date = ?2",
                    [&user_id, &month],
                    |row| row.get(0),
                )
                .optional()?;

            let outcome = match existing {
                Some(id) => {
                    tx.execute(
                        "UPDATE goals SET silver = ?1, gold = ?2, diamond = ?3 WHERE id = ?4",
                        params![amounts.silver, amounts.gold, amounts.diamond, id],
                    )?;
                    Upsert::Updated
                }
                None => {
                    tx.execute(
                        "INSERT INTO goals (id, user_id, silver, gold, diamond, date) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                        params![new_id(), user_id, amounts.silver, amounts.gold, amounts.diamond, month],
                    )?;
                    Upsert::Created
                }
            };

            tx.commit()?;
            Ok(outcome)
        })
        .await
    }

    async fn list_daily_values(&self, user_id: &str) -> Result<Vec<DailyValue>> {
        let user_id = user_id.to_string();

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, value, date FROM daily_values WHERE user_id = ?1 ORDER BY date ASC",
            )?;
            let values = stmt
                .query_map([user_id], daily_value_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(values)
        })
        .await
    }

    async fn upsert_daily_value(&self, user_id: &str, day: &str, value: f64) -> Result<Upsert> {
        let user_id = user_id.to_string();
        let day = day.to_string();

        self.with_conn(move |conn| {
            let tx = conn.transaction()?;

            let existing: Option<String> = tx
                .query_row(
                    "SELECT id FROM daily_values WHERE user_id = ?1 AND date = ?2",
                    [&user_id, &day],
                    |row| row.get(0),
                )
                .optional()?;

            let outcome = match existing {
                Some(id) => {
                    tx.execute(
                        "UPDATE daily_values SET value = ?1 WHERE id = ?2",
                        params![value, id],
                    )?;
                    Upsert::Updated
                }
                None => {
                    tx.execute(
                        "INSERT INTO daily_values (id, user_id, value, date) VALUES (?1, ?2, ?3, ?4)",
                        params![new_id(), user_id, value, day],
                    )?;
                    Upsert::Created
                }
            };

            tx.commit()?;
            Ok(outcome)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            name: "Ana".to_string(),
            username: username.to_string(),
            password_hash: "hash".to_string(),
            cover: "cover.png".to_string(),
        }
    }

    fn amounts(silver: f64) -> GoalAmounts {
        GoalAmounts {
            silver,
            gold: silver * 2.0,
            diamond: silver * 3.0,
        }
    }

    #[actix_web::test]
    async fn test_insert_and_find_user() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let user = repo.insert_user(new_user("ana")).await.unwrap();

        let by_name = repo.find_user_by_username("ana").await.unwrap().unwrap();
        assert_eq!(by_name.user, user);
        assert_eq!(by_name.password_hash, "hash");

        let by_id = repo.find_user_by_id(&user.id).await.unwrap();
        assert_eq!(by_id, Some(user));

        assert!(repo.find_user_by_username("bob").await.unwrap().is_none());
        assert!(repo.find_user_by_id("missing").await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn test_duplicate_username_is_rejected_by_index() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        repo.insert_user(new_user("ana")).await.unwrap();

        assert!(repo.insert_user(new_user("ana")).await.is_err());
    }

    #[actix_web::test]
    async fn test_goal_upsert_overwrites_same_month() {
        let repo = SqliteRepository::open_in_memory().unwrap();

        assert_eq!(repo.upsert_goal("u1", "2024-03", amounts(1.0)).await.unwrap(), Upsert::Created);
        let first = repo.list_goals("u1").await.unwrap();

        assert_eq!(repo.upsert_goal("u1", "2024-03", amounts(5.0)).await.unwrap(), Upsert::Updated);
        let goals = repo.list_goals("u1").await.unwrap();

        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].id, first[0].id);
        assert_eq!(goals[0].silver, 5.0);
        assert_eq!(goals[0].diamond, 15.0);
    }

    #[actix_web::test]
    async fn test_concurrent_goal_upserts_create_once() {
        let repo = SqliteRepository::open_in_memory().unwrap();

        let (first, second) = futures::join!(
            repo.upsert_goal("u1", "2024-03", amounts(1.0)),
            repo.upsert_goal("u1", "2024-03", amounts(2.0)),
        );
        let mut outcomes = vec![first.unwrap(), second.unwrap()];
        outcomes.sort_by_key(|outcome| *outcome == Upsert::Updated);

        assert_eq!(outcomes, vec![Upsert::Created, Upsert::Updated]);
        assert_eq!(repo.list_goals("u1").await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_concurrent_value_upserts_create_once() {
        let repo = SqliteRepository::open_in_memory().unwrap();

        let (first, second) = futures::join!(
            repo.upsert_daily_value("u1", "2024-03-15", 1.0),
            repo.upsert_daily_value("u1", "2024-03-15", 2.0),
        );
        let created = [first.unwrap(), second.unwrap()]
            .iter()
            .filter(|outcome| **outcome == Upsert::Created)
            .count();

        assert_eq!(created, 1);
        assert_eq!(repo.list_daily_values("u1").await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_goals_are_scoped_and_ordered() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        repo.upsert_goal("u1", "2024-05", amounts(1.0)).await.unwrap();
        repo.upsert_goal("u1", "2024-01", amounts(2.0)).await.unwrap();
        repo.upsert_goal("u2", "2024-01", amounts(3.0)).await.unwrap();

        let dates: Vec<String> = repo
            .list_goals("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.date)
            .collect();
        assert_eq!(dates, vec!["2024-01", "2024-05"]);
    }

    #[actix_web::test]
    async fn test_daily_value_upsert() {
        let repo = SqliteRepository::open_in_memory().unwrap();

        assert_eq!(repo.upsert_daily_value("u1", "2024-03-15", 10.0).await.unwrap(), Upsert::Created);
        assert_eq!(repo.upsert_daily_value("u1", "2024-03-15", 12.5).await.unwrap(), Upsert::Updated);
        assert_eq!(repo.upsert_daily_value("u1", "2024-03-16", 1.0).await.unwrap(), Upsert::Created);

        let values = repo.list_daily_values("u1").await.unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].value, 12.5);
        assert_eq!(values[1].date, "2024-03-16");
        assert!(repo.list_daily_values("u2").await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_open_creates_file() {
        let dir = std::env::temp_dir().join(format!("nuvelu-test-{}", Uuid::new_v4().simple()));
        let path = dir.join("nested").join("nuvelu.db");

        let repo = SqliteRepository::open(&path).unwrap();
        repo.insert_user(new_user("ana")).await.unwrap();
        assert_eq!(repo.path(), path.as_path());
        drop(repo);

        let reopened = SqliteRepository::open(&path).unwrap();
        assert!(reopened.find_user_by_username("ana").await.unwrap().is_some());

        let _ = std::fs::remove_dir_all(dir);
    }
}
