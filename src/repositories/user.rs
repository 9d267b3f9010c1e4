use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use tokio_postgres::{error::SqlState, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::user::{User, UserProfile},
};

/// Persistence for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user. Fails with `AppError::DuplicateUsername` if the
    /// username is already taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User>;

    /// Finds a user by username, including the password hash.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Finds a user by ID. The result never carries the password hash.
    async fn find_by_id(&self, user_id: &Uuid) -> Result<Option<UserProfile>>;
}

const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

/// A `UserStore` backed by PostgreSQL.
#[derive(Clone)]
pub struct PgUserStore {
    pool: Pool,
}

impl PgUserStore {
    /// Creates a new `PgUserStore` over an existing pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Creates the `users` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        let client = self.pool.get().await?;
        client.batch_execute(CREATE_USERS_TABLE).await?;
        tracing::info!("✅ users table ready");
        Ok(())
    }
}

/// A helper function to map a `tokio_postgres::Row` to a `User`.
fn row_to_user(row: &Row) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password")?,
        created_at: row.try_get::<_, DateTime<Utc>>("created_at")?,
    })
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        let client = self.pool.get().await?;
        let id = Uuid::new_v4();
        let row = client
            .query_one(
                r#"
                INSERT INTO users (id, username, password)
                VALUES ($1, $2, $3)
                RETURNING id, username, password, created_at
                "#,
                &[&id, &username, &password_hash],
            )
            .await
            .map_err(|e| {
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    AppError::DuplicateUsername
                } else {
                    AppError::Database(e)
                }
            })?;
        row_to_user(&row)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT id, username, password, created_at
                FROM users
                WHERE username = $1
                "#,
                &[&username],
            )
            .await?;
        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn find_by_id(&self, user_id: &Uuid) -> Result<Option<UserProfile>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT id, username, created_at
                FROM users
                WHERE id = $1
                "#,
                &[user_id],
            )
            .await?;
        row.map(|r| -> Result<UserProfile> {
            Ok(UserProfile {
                id: r.try_get("id")?,
                username: r.try_get("username")?,
                created_at: r.try_get("created_at")?,
            })
        })
        .transpose()
    }
}
