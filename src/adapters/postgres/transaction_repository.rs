use crate::domain::{
    LoanState, Transaction, TransactionStatus,
    value_objects::{ActorRole, BookId, Fine, LoanPeriod, TransactionId, UserId},
};
use crate::ports::transaction_repository::{
    Result, TransactionFilter, TransactionRepository as TransactionRepositoryTrait,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

const SELECT_COLUMNS: &str = r#"
    SELECT
        transaction_id,
        book_id,
        borrower_id,
        borrowed_date,
        borrowed_for,
        returned_date,
        status,
        delay_days,
        fine,
        created_by,
        updated_by,
        created_at,
        updated_at
    FROM transactions
"#;

fn invalid_data(message: String) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message))
}

/// 保存されたステータスと日付・料金から状態を復元する
///
/// 組み合わせが不整合な行はエラーとして扱う。
fn restore_state(
    status: TransactionStatus,
    returned_date: Option<NaiveDate>,
    delay_days: u64,
    fine: Fine,
) -> Result<LoanState> {
    match (status, returned_date) {
        (TransactionStatus::Borrowed, None) => Ok(LoanState::Borrowed),
        (TransactionStatus::Returned, Some(returned_date)) if fine.is_zero() => {
            Ok(LoanState::Returned { returned_date })
        }
        (TransactionStatus::Delayed, Some(returned_date)) => Ok(LoanState::Delayed {
            returned_date,
            delay_days,
            fine,
        }),
        _ => Err(invalid_data(format!(
            "inconsistent transaction row: status={} returned_date={:?} fine={}",
            status, returned_date, fine
        ))),
    }
}

/// PostgreSQLの行データをTransactionに変換する
///
/// 整数型の範囲変換と列挙値の文字列からの変換でエラーハンドリングを行う。
fn map_row_to_transaction(row: &PgRow) -> Result<Transaction> {
    let borrowed_for_i32: i32 = row.get("borrowed_for");
    let borrowed_for = LoanPeriod::try_from(i64::from(borrowed_for_i32))
        .map_err(|e| invalid_data(format!("borrowed_for out of range: {}", e)))?;

    let status_str: &str = row.get("status");
    let status = TransactionStatus::from_str(status_str).map_err(invalid_data)?;

    let delay_days_i64: i64 = row.get("delay_days");
    let delay_days = u64::try_from(delay_days_i64)
        .map_err(|_| invalid_data(format!("delay_days out of range: {}", delay_days_i64)))?;

    let fine_i64: i64 = row.get("fine");
    let fine = u64::try_from(fine_i64)
        .map(Fine::from_units)
        .map_err(|_| invalid_data(format!("fine out of range: {}", fine_i64)))?;

    let created_by_str: &str = row.get("created_by");
    let created_by = ActorRole::from_str(created_by_str).map_err(invalid_data)?;
    let updated_by_str: &str = row.get("updated_by");
    let updated_by = ActorRole::from_str(updated_by_str).map_err(invalid_data)?;

    let state = restore_state(status, row.get("returned_date"), delay_days, fine)?;

    Ok(Transaction {
        transaction_id: TransactionId::from_uuid(row.get("transaction_id")),
        book_id: BookId::from_uuid(row.get("book_id")),
        borrower_id: UserId::from_uuid(row.get("borrower_id")),
        borrowed_date: row.get("borrowed_date"),
        borrowed_for,
        state,
        created_by,
        updated_by,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// TransactionRepositoryのPostgreSQL実装
///
/// 1件の作成・更新・削除はそれぞれ1つのSQL文で実行され、原子的に反映される。
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    /// PostgreSQLコネクションプールから新しいTransactionRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepositoryTrait for TransactionRepository {
    async fn insert(&self, transaction: &Transaction) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                transaction_id,
                book_id,
                borrower_id,
                borrowed_date,
                borrowed_for,
                returned_date,
                status,
                delay_days,
                fine,
                created_by,
                updated_by,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(transaction.transaction_id.value())
        .bind(transaction.book_id.value())
        .bind(transaction.borrower_id.value())
        .bind(transaction.borrowed_date)
        .bind(i32::try_from(transaction.borrowed_for.days())?)
        .bind(transaction.returned_date())
        .bind(transaction.status().as_str())
        .bind(i64::try_from(transaction.delay_days())?)
        .bind(i64::try_from(transaction.fine().value())?)
        .bind(transaction.created_by.as_str())
        .bind(transaction.updated_by.as_str())
        .bind(transaction.created_at)
        .bind(transaction.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 完全な状態で上書きする（最後の書き込みが勝つ）
    async fn update(&self, transaction: &Transaction) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET
                book_id = $2,
                borrower_id = $3,
                borrowed_date = $4,
                borrowed_for = $5,
                returned_date = $6,
                status = $7,
                delay_days = $8,
                fine = $9,
                updated_by = $10,
                updated_at = $11
            WHERE transaction_id = $1
            "#,
        )
        .bind(transaction.transaction_id.value())
        .bind(transaction.book_id.value())
        .bind(transaction.borrower_id.value())
        .bind(transaction.borrowed_date)
        .bind(i32::try_from(transaction.borrowed_for.days())?)
        .bind(transaction.returned_date())
        .bind(transaction.status().as_str())
        .bind(i64::try_from(transaction.delay_days())?)
        .bind(i64::try_from(transaction.fine().value())?)
        .bind(transaction.updated_by.as_str())
        .bind(transaction.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, transaction_id: TransactionId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM transactions WHERE transaction_id = $1")
            .bind(transaction_id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_by_id(&self, transaction_id: TransactionId) -> Result<Option<Transaction>> {
        let query = format!("{} WHERE transaction_id = $1", SELECT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(transaction_id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_transaction).transpose()
    }

    /// 条件がNULLの場合は絞り込まない
    async fn list(&self, filter: TransactionFilter) -> Result<Vec<Transaction>> {
        let query = format!(
            r#"{}
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::UUID IS NULL OR borrower_id = $2)
            ORDER BY borrowed_date DESC, created_at DESC
            "#,
            SELECT_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(filter.status.map(|status| status.as_str()))
            .bind(filter.borrower_id.map(|id| id.value()))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_row_to_transaction).collect()
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count)?)
    }

    async fn count_by_status(&self, status: TransactionStatus) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // TDD: restore_state() のテスト
    #[test]
    fn test_restore_state_accepts_consistent_rows() {
        assert_eq!(
            restore_state(TransactionStatus::Borrowed, None, 0, Fine::ZERO).unwrap(),
            LoanState::Borrowed
        );
        assert_eq!(
            restore_state(
                TransactionStatus::Delayed,
                Some(date(2024, 1, 16)),
                5,
                Fine::from_units(50)
            )
            .unwrap()
            .fine(),
            Fine::from_units(50)
        );
    }

    #[test]
    fn test_restore_state_rejects_inconsistent_rows() {
        assert!(
            restore_state(
                TransactionStatus::Borrowed,
                Some(date(2024, 1, 5)),
                0,
                Fine::ZERO
            )
            .is_err()
        );
        assert!(restore_state(TransactionStatus::Returned, None, 0, Fine::ZERO).is_err());
        assert!(
            restore_state(
                TransactionStatus::Returned,
                Some(date(2024, 1, 5)),
                0,
                Fine::from_units(10)
            )
            .is_err()
        );
    }
}
