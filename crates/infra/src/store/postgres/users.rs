use async_trait::async_trait;
use uuid::Uuid;

use crate::models::UserRow;
use crate::store::{NewUser, StoreError, StoreResult, UserStore};

use super::PgStore;

const USER_COLUMNS: &str = "id, email, name, password_hash, role, created_at, updated_at";

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, email, name, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(&user.role)
        .fetch_one(self.pool())
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(format!("user {}", user.email))
            }
            _ => StoreError::Db(e),
        })?;

        Ok(row)
    }

    async fn get_user_by_id(&self, id: Uuid) -> StoreResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }
}
