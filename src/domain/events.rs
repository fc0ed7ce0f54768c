use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{ActorRole, BookId, Fine, TransactionId, TransactionStatus, UserId};

/// イベント：貸出が記録された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionCreated {
    pub transaction_id: TransactionId,
    pub book_id: BookId,
    pub borrower_id: UserId,
    pub borrowed_date: NaiveDate,
    pub borrowed_for_days: u32,
    pub due_date: Option<NaiveDate>,
    pub created_by: ActorRole,
    pub created_at: DateTime<Utc>,
}

/// イベント：返却が記録された（ReturnedまたはDelayedへ遷移）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReturned {
    pub transaction_id: TransactionId,
    pub book_id: BookId,
    pub borrower_id: UserId,
    pub returned_date: NaiveDate,
    pub status: TransactionStatus,
    pub delay_days: u64,
    pub fine: Fine,
    pub recorded_by: ActorRole,
    pub recorded_at: DateTime<Utc>,
}

/// イベント：貸出記録が編集された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEdited {
    pub transaction_id: TransactionId,
    pub book_id: BookId,
    pub borrower_id: UserId,
    pub previous_status: TransactionStatus,
    pub status: TransactionStatus,
    pub fine: Fine,
    /// 日付項目が変わり、延滞料金とステータスを再計算したか
    pub recalculated: bool,
    pub edited_by: ActorRole,
    pub edited_at: DateTime<Utc>,
}

/// イベント：貸出記録が削除された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDeleted {
    pub transaction_id: TransactionId,
    pub book_id: BookId,
    pub borrower_id: UserId,
    pub deleted_by: ActorRole,
    pub deleted_at: DateTime<Utc>,
}

/// ドメインイベント統合型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainEvent {
    TransactionCreated(TransactionCreated),
    TransactionReturned(TransactionReturned),
    TransactionEdited(TransactionEdited),
    TransactionDeleted(TransactionDeleted),
}

impl DomainEvent {
    pub fn transaction_id(&self) -> TransactionId {
        match self {
            DomainEvent::TransactionCreated(e) => e.transaction_id,
            DomainEvent::TransactionReturned(e) => e.transaction_id,
            DomainEvent::TransactionEdited(e) => e.transaction_id,
            DomainEvent::TransactionDeleted(e) => e.transaction_id,
        }
    }

    pub fn borrower_id(&self) -> UserId {
        match self {
            DomainEvent::TransactionCreated(e) => e.borrower_id,
            DomainEvent::TransactionReturned(e) => e.borrower_id,
            DomainEvent::TransactionEdited(e) => e.borrower_id,
            DomainEvent::TransactionDeleted(e) => e.borrower_id,
        }
    }

    /// 件数が変わるイベント（作成・削除）か
    pub fn changes_record_count(&self) -> bool {
        matches!(
            self,
            DomainEvent::TransactionCreated(_) | DomainEvent::TransactionDeleted(_)
        )
    }

    /// ReturnedまたはDelayedへの遷移を表す場合、遷移先のステータスと料金を返す
    pub fn return_transition(&self) -> Option<(TransactionStatus, Fine)> {
        match self {
            DomainEvent::TransactionReturned(e) => Some((e.status, e.fine)),
            DomainEvent::TransactionEdited(e)
                if e.status.is_returned() && e.status != e.previous_status =>
            {
                Some((e.status, e.fine))
            }
            _ => None,
        }
    }
}
