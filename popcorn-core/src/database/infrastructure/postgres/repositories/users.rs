use async_trait::async_trait;
use chrono::{DateTime, Utc};
use popcorn_model::{User, UserId};
use sqlx::postgres::PgRow;
use sqlx::types::Uuid;
use sqlx::{PgPool, Row};

use crate::database::ports::UserRepository;
use crate::error::Result;

const USER_COLUMNS: &str = "id, email, username, password_hash, created_at";

#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_row(row: &PgRow) -> Result<User> {
        let id: Uuid = row.try_get("id")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        Ok(User {
            id: UserId::from(id),
            email: row.try_get("email")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            created_at,
        })
    }

    async fn fetch_one_where(
        &self,
        column: &str,
        value: &str,
    ) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(Self::map_row).transpose()
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.to_uuid())
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        self.fetch_one_where("username", username).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        self.fetch_one_where("email", email).await
    }

    async fn create(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, username, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id.to_uuid())
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn update(
        &self,
        id: UserId,
        username: &str,
        email: &str,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE users SET username = $2, email = $3 WHERE id = $1",
        )
        .bind(id.to_uuid())
        .bind(username)
        .bind(email)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected())
    }

    async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<u64> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
                .bind(id.to_uuid())
                .bind(password_hash)
                .execute(self.pool())
                .await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: UserId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.to_uuid())
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }
}
