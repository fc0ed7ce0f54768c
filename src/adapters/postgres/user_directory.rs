use crate::domain::value_objects::UserId;
use crate::ports::user_directory::{Result, UserDirectory as UserDirectoryTrait};
use async_trait::async_trait;
use sqlx::PgPool;

/// 借り手ロールの値
const BORROWER_ROLE: &str = "borrower";

/// UserDirectoryのPostgreSQL実装
///
/// 利用者テーブル（users）を読み取り専用で参照する。
pub struct UserDirectory {
    pool: PgPool,
}

impl UserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectoryTrait for UserDirectory {
    async fn is_borrower(&self, user_id: UserId) -> Result<bool> {
        let role: Option<String> = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
            .bind(user_id.value())
            .fetch_optional(&self.pool)
            .await?;

        Ok(role.as_deref() == Some(BORROWER_ROLE))
    }

    async fn is_enabled(&self, user_id: UserId) -> Result<bool> {
        let enabled: Option<bool> = sqlx::query_scalar("SELECT enabled FROM users WHERE id = $1")
            .bind(user_id.value())
            .fetch_optional(&self.pool)
            .await?;

        Ok(enabled.unwrap_or(false))
    }

    async fn get_user_name(&self, user_id: UserId) -> Result<Option<String>> {
        let name = sqlx::query_scalar("SELECT name FROM users WHERE id = $1")
            .bind(user_id.value())
            .fetch_optional(&self.pool)
            .await?;

        Ok(name)
    }
}
