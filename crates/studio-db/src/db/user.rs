use async_trait::async_trait;
use sqlx::Postgres;
use studio_core::models::{NewUser, User};
use studio_core::AppError;

use crate::pool::InstrumentedPool;

/// Lookup and registration of users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact, case-sensitive email match.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Insert a user. An email that is already taken yields [`AppError::Conflict`].
    async fn create(&self, user: &NewUser) -> Result<User, AppError>;
}

/// Repository for the `users` table
#[derive(Clone)]
pub struct UserRepository {
    pool: InstrumentedPool,
}

impl UserRepository {
    pub fn new(pool: InstrumentedPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let mut conn = self.pool.acquire().await?;
        let user = sqlx::query_as::<Postgres, User>(
            r#"
            SELECT id, email, first_name, last_name, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self, user), fields(db.table = "users", db.operation = "insert", email = %user.email))]
    async fn create(&self, user: &NewUser) -> Result<User, AppError> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query_as::<Postgres, User>(
            r#"
            INSERT INTO users (email, first_name, last_name)
            VALUES ($1, $2, $3)
            RETURNING id, email, first_name, last_name, created_at
            "#,
        )
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .fetch_one(&mut *conn)
        .await;

        match result {
            Ok(created) => {
                tracing::info!(user_id = %created.id, "User registered");
                Ok(created)
            }
            Err(e) => {
                let err = AppError::from(e);
                // A concurrent registration can win between lookup and insert.
                if err.is_unique_violation() {
                    Err(AppError::Conflict(format!(
                        "A user with email {} already exists",
                        user.email
                    )))
                } else {
                    Err(err)
                }
            }
        }
    }
}
