use std::sync::Arc;

use async_trait::async_trait;
use grimoire_domain::{NewUser, User, UserId};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::query::db_err;
use crate::infrastructure::ports::{ClockPort, RepoError, UserRepo};

const USER_COLUMNS: &str = "id, username, email, password_hash, is_admin, \
                            preferred_edition_id, created_at, updated_at";

pub struct SqliteUserRepo {
    pool: SqlitePool,
    clock: Arc<dyn ClockPort>,
}

impl SqliteUserRepo {
    pub fn new(pool: SqlitePool, clock: Arc<dyn ClockPort>) -> Self {
        Self { pool, clock }
    }

    fn row_to_user(row: &SqliteRow) -> Result<User, sqlx::Error> {
        Ok(User {
            id: UserId::new(row.try_get("id")?),
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            is_admin: row.try_get("is_admin")?,
            preferred_edition_id: row.try_get("preferred_edition_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    async fn touch(
        &self,
        operation: &'static str,
        id: UserId,
        sql: &'static str,
        value: Option<i64>,
    ) -> Result<(), RepoError> {
        let result = sqlx::query(sql)
            .bind(value)
            .bind(self.clock.now())
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(db_err(operation))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("User", id));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepo for SqliteUserRepo {
    async fn get(&self, id: UserId) -> Result<Option<User>, RepoError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("get_user"))?;
        row.as_ref()
            .map(Self::row_to_user)
            .transpose()
            .map_err(db_err("get_user"))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE username = ?",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("find_user_by_username"))?;
        row.as_ref()
            .map(Self::row_to_user)
            .transpose()
            .map_err(db_err("find_user_by_username"))
    }

    async fn exists_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, RepoError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ? OR email = ?")
                .bind(username)
                .bind(email)
                .fetch_one(&self.pool)
                .await
                .map_err(db_err("user_exists"))?;
        Ok(count > 0)
    }

    async fn create(&self, user: &NewUser) -> Result<UserId, RepoError> {
        let now = self.clock.now();
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, is_admin, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_err("create_user"))?;

        Ok(UserId::new(result.last_insert_rowid()))
    }

    async fn set_preferred_edition(
        &self,
        id: UserId,
        edition_id: Option<i64>,
    ) -> Result<(), RepoError> {
        self.touch(
            "set_preferred_edition",
            id,
            "UPDATE users SET preferred_edition_id = ?, updated_at = ? WHERE id = ?",
            edition_id,
        )
        .await
    }

    async fn set_admin(&self, id: UserId, is_admin: bool) -> Result<(), RepoError> {
        self.touch(
            "set_admin",
            id,
            "UPDATE users SET is_admin = ?, updated_at = ? WHERE id = ?",
            Some(i64::from(is_admin)),
        )
        .await
    }
}
