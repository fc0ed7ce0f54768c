use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::transaction::TransactionStats;
use crate::domain::{
    ActorRole, BookId, FineAssessment, Transaction, TransactionId, TransactionStatus, UserId,
    ValidationError,
    commands::{CreateTransaction, EditTransaction, RecordReturn},
};

/// 必須項目を取り出す（欠けていれば`MissingRequired`）
fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingRequired(field))
}

// ============================================================================
// Requests
// ============================================================================

/// POST /transactions のリクエスト
///
/// 必須項目もOptionで受け取り、欠けている場合は検証エラーとして返す。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub book_id: Option<Uuid>,
    pub borrower_id: Option<Uuid>,
    pub borrowed_date: Option<NaiveDate>,
    pub borrowed_for_days: Option<i64>,
    /// 申告ステータス（省略可）
    pub status: Option<TransactionStatus>,
}

impl CreateTransactionRequest {
    pub fn to_command(
        &self,
        actor: ActorRole,
        requested_at: DateTime<Utc>,
    ) -> Result<CreateTransaction, ValidationError> {
        Ok(CreateTransaction {
            book_id: BookId::from_uuid(required(self.book_id, "book_id")?),
            borrower_id: UserId::from_uuid(required(self.borrower_id, "borrower_id")?),
            borrowed_date: required(self.borrowed_date, "borrowed_date")?,
            borrowed_for_days: required(self.borrowed_for_days, "borrowed_for_days")?,
            declared_status: self.status,
            actor,
            requested_at,
        })
    }
}

/// POST /transactions/:id/return のリクエスト
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordReturnRequest {
    pub returned_date: Option<NaiveDate>,
}

impl RecordReturnRequest {
    pub fn to_command(
        &self,
        transaction_id: TransactionId,
        actor: ActorRole,
        requested_at: DateTime<Utc>,
    ) -> Result<RecordReturn, ValidationError> {
        Ok(RecordReturn {
            transaction_id,
            returned_date: required(self.returned_date, "returned_date")?,
            actor,
            requested_at,
        })
    }
}

/// PUT /transactions/:id のリクエスト（全項目を指定）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditTransactionRequest {
    pub book_id: Option<Uuid>,
    pub borrower_id: Option<Uuid>,
    pub borrowed_date: Option<NaiveDate>,
    pub borrowed_for_days: Option<i64>,
    pub returned_date: Option<NaiveDate>,
    pub status: Option<TransactionStatus>,
}

impl EditTransactionRequest {
    pub fn to_command(
        &self,
        transaction_id: TransactionId,
        actor: ActorRole,
        requested_at: DateTime<Utc>,
    ) -> Result<EditTransaction, ValidationError> {
        Ok(EditTransaction {
            transaction_id,
            book_id: BookId::from_uuid(required(self.book_id, "book_id")?),
            borrower_id: UserId::from_uuid(required(self.borrower_id, "borrower_id")?),
            borrowed_date: required(self.borrowed_date, "borrowed_date")?,
            borrowed_for_days: required(self.borrowed_for_days, "borrowed_for_days")?,
            returned_date: self.returned_date,
            declared_status: self.status,
            actor,
            requested_at,
        })
    }
}

/// 貸出一覧取得のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct ListTransactionsQuery {
    /// ステータスでフィルタリング
    pub status: Option<String>,
    /// 借り手IDでフィルタリング
    pub borrower_id: Option<Uuid>,
}

/// 延滞料金試算のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct FinePreviewQuery {
    pub borrowed_date: NaiveDate,
    pub borrowed_for_days: i64,
    pub returned_date: Option<NaiveDate>,
}

// ============================================================================
// Responses
// ============================================================================

/// 貸出記録レスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub transaction_id: Uuid,
    pub book_id: Uuid,
    pub borrower_id: Uuid,
    pub borrowed_date: NaiveDate,
    pub borrowed_for_days: u32,
    pub due_date: Option<NaiveDate>,
    pub returned_date: Option<NaiveDate>,
    pub status: TransactionStatus,
    pub delay_days: u64,
    pub fine: u64,
    pub created_by: ActorRole,
    pub updated_by: ActorRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(transaction: Transaction) -> Self {
        Self {
            transaction_id: transaction.transaction_id.value(),
            book_id: transaction.book_id.value(),
            borrower_id: transaction.borrower_id.value(),
            borrowed_date: transaction.borrowed_date,
            borrowed_for_days: transaction.borrowed_for.days(),
            due_date: transaction.due_date(),
            returned_date: transaction.returned_date(),
            status: transaction.status(),
            delay_days: transaction.delay_days(),
            fine: transaction.fine().value(),
            created_by: transaction.created_by,
            updated_by: transaction.updated_by,
            created_at: transaction.created_at,
            updated_at: transaction.updated_at,
        }
    }
}

/// ダッシュボード用の件数レスポンス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionStatsResponse {
    pub borrowed: u64,
    pub returned: u64,
    pub delayed: u64,
    pub total: u64,
}

impl From<TransactionStats> for TransactionStatsResponse {
    fn from(stats: TransactionStats) -> Self {
        Self {
            borrowed: stats.borrowed,
            returned: stats.returned,
            delayed: stats.delayed,
            total: stats.total(),
        }
    }
}

/// 延滞料金試算レスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinePreviewResponse {
    pub delay_days: u64,
    pub fine: u64,
    /// 例: "5 Days x $10 = $50.00"
    pub breakdown: String,
}

impl From<FineAssessment> for FinePreviewResponse {
    fn from(assessment: FineAssessment) -> Self {
        Self {
            delay_days: assessment.delay_days,
            fine: assessment.fine.value(),
            breakdown: assessment.breakdown(),
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// ステータスクエリパラメータのパースとバリデーション
pub fn parse_status_filter(status: &str) -> Result<TransactionStatus, String> {
    status.parse::<TransactionStatus>()
}
