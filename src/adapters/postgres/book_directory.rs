use crate::domain::value_objects::BookId;
use crate::ports::book_directory::{BookDirectory as BookDirectoryTrait, Result};
use async_trait::async_trait;
use sqlx::PgPool;

/// BookDirectoryのPostgreSQL実装
///
/// 蔵書テーブル（books）を読み取り専用で参照する。
/// 貸出可否の更新はこのコンテキストの責務ではない。
pub struct BookDirectory {
    pool: PgPool,
}

impl BookDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookDirectoryTrait for BookDirectory {
    /// 存在しない書籍は貸出不可として扱う
    async fn is_available(&self, book_id: BookId) -> Result<bool> {
        let available: Option<bool> = sqlx::query_scalar("SELECT available FROM books WHERE id = $1")
            .bind(book_id.value())
            .fetch_optional(&self.pool)
            .await?;

        Ok(available.unwrap_or(false))
    }
}
