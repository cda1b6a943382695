use async_trait::async_trait;

use crate::{
    db::PgStore,
    error::AppResult,
    pagination::Pagination,
    users::repo_types::{NewUser, User, UserChanges},
};

const USER_COLUMNS: &str = "id, name, username, password_hash, role, created_at, updated_at";

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_user_by_id(&self, id: i64) -> AppResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn count_users(&self) -> AppResult<i64>;
    async fn list_users(&self, page: &Pagination) -> AppResult<Vec<User>>;
    async fn create_user(&self, new: &NewUser) -> AppResult<User>;
    /// Returns `None` when no user has this id.
    async fn update_user(&self, id: i64, changes: &UserChanges) -> AppResult<Option<User>>;
    /// Returns whether a row was deleted.
    async fn delete_user(&self, id: i64) -> AppResult<bool>;
}

#[async_trait]
impl UserRepo for PgStore {
    async fn find_user_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn count_users(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list_users(&self, page: &Pagination) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(page.sql_limit())
        .bind(page.sql_offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn create_user(&self, new: &NewUser) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, username, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(&new.username)
        .bind(&new.password_hash)
        .bind(new.role.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_user(&self, id: i64, changes: &UserChanges) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET name = $2,
                   username = $3,
                   password_hash = COALESCE($4, password_hash),
                   role = $5,
                   updated_at = now()
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.username)
        .bind(changes.password_hash.as_deref())
        .bind(changes.role.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> AppResult<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
