use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{ActorRole, BookId, TransactionId, TransactionStatus, UserId};

/// コマンド：貸出を記録する
///
/// `borrowed_for_days`は未検証の入力値。ドメイン関数で`LoanPeriod`に変換する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTransaction {
    pub book_id: BookId,
    pub borrower_id: UserId,
    pub borrowed_date: NaiveDate,
    pub borrowed_for_days: i64,
    pub declared_status: Option<TransactionStatus>,
    pub actor: ActorRole,
    pub requested_at: DateTime<Utc>,
}

/// コマンド：返却を記録する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordReturn {
    pub transaction_id: TransactionId,
    pub returned_date: NaiveDate,
    pub actor: ActorRole,
    pub requested_at: DateTime<Utc>,
}

/// コマンド：貸出記録を編集する（全項目を指定）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditTransaction {
    pub transaction_id: TransactionId,
    pub book_id: BookId,
    pub borrower_id: UserId,
    pub borrowed_date: NaiveDate,
    pub borrowed_for_days: i64,
    pub returned_date: Option<NaiveDate>,
    pub declared_status: Option<TransactionStatus>,
    pub actor: ActorRole,
    pub requested_at: DateTime<Utc>,
}

/// コマンド：貸出記録を削除する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTransaction {
    pub transaction_id: TransactionId,
    pub actor: ActorRole,
    pub requested_at: DateTime<Utc>,
}
