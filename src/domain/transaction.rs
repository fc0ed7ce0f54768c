use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::commands::{CreateTransaction, DeleteTransaction, EditTransaction, RecordReturn};
use super::fine::{compute_fine, due_date};
use super::status::{check_declared_status, resolve_status};
use super::{
    ActorRole, BookId, EditTransactionError, Fine, LoanPeriod, Operation, RecordReturnError,
    TransactionCreated, TransactionDeleted, TransactionEdited, TransactionId, TransactionReturned,
    TransactionStatus, UserId, ValidationError,
};

// ============================================================================
// 型安全な状態パターン
// ============================================================================

/// 貸出の状態
///
/// ビジネスルール（型で保証）：
/// - Borrowed ⇔ 返却日なし
/// - Returned / Delayed ⇔ 返却日あり
/// - 延滞料金 > 0 はDelayedのみ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LoanState {
    Borrowed,
    Returned {
        returned_date: NaiveDate,
    },
    Delayed {
        returned_date: NaiveDate,
        delay_days: u64,
        fine: Fine,
    },
}

impl LoanState {
    pub fn status(&self) -> TransactionStatus {
        match self {
            LoanState::Borrowed => TransactionStatus::Borrowed,
            LoanState::Returned { .. } => TransactionStatus::Returned,
            LoanState::Delayed { .. } => TransactionStatus::Delayed,
        }
    }

    pub fn returned_date(&self) -> Option<NaiveDate> {
        match self {
            LoanState::Borrowed => None,
            LoanState::Returned { returned_date } | LoanState::Delayed { returned_date, .. } => {
                Some(*returned_date)
            }
        }
    }

    pub fn delay_days(&self) -> u64 {
        match self {
            LoanState::Delayed { delay_days, .. } => *delay_days,
            _ => 0,
        }
    }

    pub fn fine(&self) -> Fine {
        match self {
            LoanState::Delayed { fine, .. } => *fine,
            _ => Fine::ZERO,
        }
    }

    /// 終端状態（Returned / Delayed）か
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoanState::Borrowed)
    }
}

/// 保存フック：延滞料金の算定とステータスの導出を行い、状態を確定する
///
/// 返却日が貸出日より前の場合は`ValidationError`。
pub fn settle(
    borrowed_date: NaiveDate,
    borrowed_for: LoanPeriod,
    returned_date: Option<NaiveDate>,
) -> Result<LoanState, ValidationError> {
    if let Some(returned) = returned_date {
        if returned < borrowed_date {
            return Err(ValidationError::ReturnedBeforeBorrowed {
                borrowed: borrowed_date,
                returned,
            });
        }
    }

    let assessment = compute_fine(borrowed_date, borrowed_for.days(), returned_date);

    let state = match (
        returned_date,
        resolve_status(returned_date, assessment.delay_days),
    ) {
        (Some(returned_date), TransactionStatus::Delayed) => LoanState::Delayed {
            returned_date,
            delay_days: assessment.delay_days,
            fine: assessment.fine,
        },
        (Some(returned_date), _) => LoanState::Returned { returned_date },
        (None, _) => LoanState::Borrowed,
    };

    Ok(state)
}

/// Transaction集約 - 1冊の書籍の1回の貸出記録
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    // 識別子
    pub transaction_id: TransactionId,

    // 他の集約への参照（IDのみ）
    pub book_id: BookId,
    pub borrower_id: UserId,

    // 貸出管理の責務
    pub borrowed_date: NaiveDate,
    pub borrowed_for: LoanPeriod,
    #[serde(flatten)]
    pub state: LoanState,

    // 監査情報
    pub created_by: ActorRole,
    pub updated_by: ActorRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn status(&self) -> TransactionStatus {
        self.state.status()
    }

    pub fn returned_date(&self) -> Option<NaiveDate> {
        self.state.returned_date()
    }

    pub fn fine(&self) -> Fine {
        self.state.fine()
    }

    pub fn delay_days(&self) -> u64 {
        self.state.delay_days()
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        due_date(self.borrowed_date, self.borrowed_for.days())
    }
}

// ============================================================================
// 純粋関数：ライフサイクル
// ============================================================================

/// 純粋関数：貸出を記録する
///
/// ビジネスルール：
/// - 貸出期間は0〜30日
/// - 状態はBorrowed、延滞料金0、返却日なし
/// - 申告できるステータスはBorrowedのみ
///
/// 書籍・借り手の前提条件はアプリケーション層で外部ディレクトリに問い合わせる。
/// 副作用なし。新しいTransactionとイベントを返す。
pub fn create_transaction(
    cmd: &CreateTransaction,
) -> Result<(Transaction, TransactionCreated), ValidationError> {
    let borrowed_for = LoanPeriod::try_from(cmd.borrowed_for_days)?;
    let state = settle(cmd.borrowed_date, borrowed_for, None)?;

    check_declared_status(
        cmd.declared_status,
        state.status(),
        Operation::Create,
        cmd.actor,
    )?;

    let transaction = Transaction {
        transaction_id: TransactionId::new(),
        book_id: cmd.book_id,
        borrower_id: cmd.borrower_id,
        borrowed_date: cmd.borrowed_date,
        borrowed_for,
        state,
        created_by: cmd.actor,
        updated_by: cmd.actor,
        created_at: cmd.requested_at,
        updated_at: cmd.requested_at,
    };

    let event = TransactionCreated {
        transaction_id: transaction.transaction_id,
        book_id: transaction.book_id,
        borrower_id: transaction.borrower_id,
        borrowed_date: transaction.borrowed_date,
        borrowed_for_days: borrowed_for.days(),
        due_date: transaction.due_date(),
        created_by: cmd.actor,
        created_at: cmd.requested_at,
    };

    Ok((transaction, event))
}

/// 純粋関数：返却を記録する
///
/// ビジネスルール：
/// - Borrowedからのみ遷移する（Returned / Delayedへ）
/// - 同じ返却日での再実行は冪等（イベントなし、料金の二重計上なし）
/// - 異なる返却日での再実行は`AlreadyReturned`（訂正は編集で行う）
///
/// 副作用なし。新しいTransactionと、遷移した場合のみイベントを返す。
pub fn record_return(
    transaction: &Transaction,
    cmd: &RecordReturn,
) -> Result<(Transaction, Option<TransactionReturned>), RecordReturnError> {
    if let Some(returned_date) = transaction.returned_date() {
        if returned_date == cmd.returned_date {
            return Ok((transaction.clone(), None));
        }
        return Err(RecordReturnError::AlreadyReturned { returned_date });
    }

    let state = settle(
        transaction.borrowed_date,
        transaction.borrowed_for,
        Some(cmd.returned_date),
    )?;

    let returned = Transaction {
        state,
        updated_by: cmd.actor,
        updated_at: cmd.requested_at,
        ..transaction.clone()
    };

    let event = TransactionReturned {
        transaction_id: returned.transaction_id,
        book_id: returned.book_id,
        borrower_id: returned.borrower_id,
        returned_date: cmd.returned_date,
        status: returned.status(),
        delay_days: returned.delay_days(),
        fine: returned.fine(),
        recorded_by: cmd.actor,
        recorded_at: cmd.requested_at,
    };

    Ok((returned, Some(event)))
}

/// 純粋関数：貸出記録を編集する
///
/// ビジネスルール：
/// - どの状態でも全項目を訂正できる
/// - 貸出日・貸出日数・返却日が変わった場合のみ延滞料金とステータスを再計算する
/// - Returned / Delayedから返却日を外してBorrowedに戻すことはできない
/// - 申告ステータスが導出値と食い違う場合はエラー
///
/// 副作用なし。新しいTransactionとイベントを返す。
pub fn edit_transaction(
    transaction: &Transaction,
    cmd: &EditTransaction,
) -> Result<(Transaction, TransactionEdited), EditTransactionError> {
    let borrowed_for = LoanPeriod::try_from(cmd.borrowed_for_days)?;

    if transaction.state.is_terminal() && cmd.returned_date.is_none() {
        return Err(EditTransactionError::CannotReopen);
    }

    let recalculated = transaction.borrowed_date != cmd.borrowed_date
        || transaction.borrowed_for != borrowed_for
        || transaction.returned_date() != cmd.returned_date;

    let state = if recalculated {
        settle(cmd.borrowed_date, borrowed_for, cmd.returned_date)?
    } else {
        transaction.state.clone()
    };

    check_declared_status(
        cmd.declared_status,
        state.status(),
        Operation::Edit,
        cmd.actor,
    )?;

    let edited = Transaction {
        book_id: cmd.book_id,
        borrower_id: cmd.borrower_id,
        borrowed_date: cmd.borrowed_date,
        borrowed_for,
        state,
        updated_by: cmd.actor,
        updated_at: cmd.requested_at,
        ..transaction.clone()
    };

    let event = TransactionEdited {
        transaction_id: edited.transaction_id,
        book_id: edited.book_id,
        borrower_id: edited.borrower_id,
        previous_status: transaction.status(),
        status: edited.status(),
        fine: edited.fine(),
        recalculated,
        edited_by: cmd.actor,
        edited_at: cmd.requested_at,
    };

    Ok((edited, event))
}

/// 純粋関数：貸出記録を削除する
///
/// 記録自体の削除のみ。書籍の貸出可否などへの波及はない。
pub fn delete_transaction(transaction: &Transaction, cmd: &DeleteTransaction) -> TransactionDeleted {
    TransactionDeleted {
        transaction_id: transaction.transaction_id,
        book_id: transaction.book_id,
        borrower_id: transaction.borrower_id,
        deleted_by: cmd.actor,
        deleted_at: cmd.requested_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_cmd(borrowed_date: NaiveDate, borrowed_for_days: i64) -> CreateTransaction {
        CreateTransaction {
            book_id: BookId::new(),
            borrower_id: UserId::new(),
            borrowed_date,
            borrowed_for_days,
            declared_status: None,
            actor: ActorRole::Staff,
            requested_at: Utc::now(),
        }
    }

    fn return_cmd(transaction: &Transaction, returned_date: NaiveDate) -> RecordReturn {
        RecordReturn {
            transaction_id: transaction.transaction_id,
            returned_date,
            actor: ActorRole::Staff,
            requested_at: Utc::now(),
        }
    }

    fn edit_cmd(transaction: &Transaction) -> EditTransaction {
        EditTransaction {
            transaction_id: transaction.transaction_id,
            book_id: transaction.book_id,
            borrower_id: transaction.borrower_id,
            borrowed_date: transaction.borrowed_date,
            borrowed_for_days: i64::from(transaction.borrowed_for.days()),
            returned_date: transaction.returned_date(),
            declared_status: None,
            actor: ActorRole::Staff,
            requested_at: Utc::now(),
        }
    }

    fn borrowed_on_new_year() -> Transaction {
        create_transaction(&create_cmd(date(2024, 1, 1), 10))
            .unwrap()
            .0
    }

    // TDD: create_transaction() のテスト
    #[test]
    fn test_create_transaction_starts_borrowed() {
        let cmd = create_cmd(date(2024, 1, 1), 10);

        let (transaction, event) = create_transaction(&cmd).unwrap();

        // Scenario C: 返却日なし → 料金0、Borrowed
        assert_eq!(transaction.status(), TransactionStatus::Borrowed);
        assert_eq!(transaction.fine(), Fine::ZERO);
        assert_eq!(transaction.returned_date(), None);
        assert_eq!(transaction.due_date(), Some(date(2024, 1, 11)));
        assert_eq!(transaction.created_by, ActorRole::Staff);

        // イベントの検証
        assert_eq!(event.transaction_id, transaction.transaction_id);
        assert_eq!(event.book_id, cmd.book_id);
        assert_eq!(event.borrower_id, cmd.borrower_id);
        assert_eq!(event.borrowed_for_days, 10);
        assert_eq!(event.due_date, Some(date(2024, 1, 11)));
    }

    #[test]
    fn test_create_transaction_rejects_negative_period() {
        let result = create_transaction(&create_cmd(date(2024, 1, 1), -3));
        assert_eq!(
            result.unwrap_err(),
            ValidationError::NegativeLoanPeriod(-3)
        );
    }

    #[test]
    fn test_create_transaction_rejects_period_over_thirty_days() {
        let result = create_transaction(&create_cmd(date(2024, 1, 1), 31));
        assert!(matches!(
            result.unwrap_err(),
            ValidationError::LoanPeriodTooLong { days: 31, .. }
        ));
    }

    #[test]
    fn test_create_transaction_accepts_declared_borrowed() {
        let mut cmd = create_cmd(date(2024, 1, 1), 10);
        cmd.declared_status = Some(TransactionStatus::Borrowed);
        assert!(create_transaction(&cmd).is_ok());
    }

    #[test]
    fn test_create_transaction_rejects_declared_delayed() {
        let mut cmd = create_cmd(date(2024, 1, 1), 10);
        cmd.declared_status = Some(TransactionStatus::Delayed);
        assert!(matches!(
            create_transaction(&cmd).unwrap_err(),
            ValidationError::StatusNotAllowed { .. }
        ));
    }

    // TDD: record_return() のテスト
    #[test]
    fn test_record_return_on_due_date_is_returned() {
        let transaction = borrowed_on_new_year();

        let (returned, event) =
            record_return(&transaction, &return_cmd(&transaction, date(2024, 1, 11))).unwrap();

        // Scenario A
        assert_eq!(returned.status(), TransactionStatus::Returned);
        assert_eq!(returned.fine(), Fine::ZERO);
        assert_eq!(returned.returned_date(), Some(date(2024, 1, 11)));

        let event = event.unwrap();
        assert_eq!(event.status, TransactionStatus::Returned);
        assert_eq!(event.delay_days, 0);
    }

    #[test]
    fn test_record_return_late_is_delayed_with_fine() {
        let transaction = borrowed_on_new_year();

        let (returned, event) =
            record_return(&transaction, &return_cmd(&transaction, date(2024, 1, 16))).unwrap();

        // Scenario B
        assert_eq!(returned.status(), TransactionStatus::Delayed);
        assert_eq!(returned.delay_days(), 5);
        assert_eq!(returned.fine(), Fine::from_units(50));

        let event = event.unwrap();
        assert_eq!(event.status, TransactionStatus::Delayed);
        assert_eq!(event.fine, Fine::from_units(50));
    }

    #[test]
    fn test_record_return_twice_with_same_date_is_idempotent() {
        let transaction = borrowed_on_new_year();
        let cmd = return_cmd(&transaction, date(2024, 1, 16));

        let (first, first_event) = record_return(&transaction, &cmd).unwrap();
        let (second, second_event) = record_return(&first, &cmd).unwrap();

        assert!(first_event.is_some());
        // 2回目は遷移なし、料金の二重計上なし
        assert!(second_event.is_none());
        assert_eq!(second, first);
        assert_eq!(second.fine(), Fine::from_units(50));
    }

    #[test]
    fn test_record_return_with_another_date_fails() {
        let transaction = borrowed_on_new_year();
        let (returned, _) =
            record_return(&transaction, &return_cmd(&transaction, date(2024, 1, 5))).unwrap();

        let result = record_return(&returned, &return_cmd(&returned, date(2024, 1, 20)));
        assert_eq!(
            result.unwrap_err(),
            RecordReturnError::AlreadyReturned {
                returned_date: date(2024, 1, 5)
            }
        );
    }

    #[test]
    fn test_record_return_before_borrowed_date_fails() {
        let transaction = borrowed_on_new_year();

        let result = record_return(&transaction, &return_cmd(&transaction, date(2023, 12, 31)));
        assert!(matches!(
            result.unwrap_err(),
            RecordReturnError::Validation(ValidationError::ReturnedBeforeBorrowed { .. })
        ));
    }

    // TDD: edit_transaction() のテスト
    #[test]
    fn test_edit_transaction_recalculates_when_returned_date_set() {
        let transaction = borrowed_on_new_year();
        let mut cmd = edit_cmd(&transaction);
        cmd.returned_date = Some(date(2024, 1, 14));
        cmd.declared_status = Some(TransactionStatus::Delayed);

        let (edited, event) = edit_transaction(&transaction, &cmd).unwrap();

        assert_eq!(edited.status(), TransactionStatus::Delayed);
        assert_eq!(edited.fine(), Fine::from_units(30));
        assert!(event.recalculated);
        assert_eq!(event.previous_status, TransactionStatus::Borrowed);
        assert_eq!(event.status, TransactionStatus::Delayed);
    }

    #[test]
    fn test_edit_transaction_extending_period_clears_fine() {
        let transaction = borrowed_on_new_year();
        let (delayed, _) =
            record_return(&transaction, &return_cmd(&transaction, date(2024, 1, 16))).unwrap();

        let mut cmd = edit_cmd(&delayed);
        cmd.borrowed_for_days = 15;

        let (edited, event) = edit_transaction(&delayed, &cmd).unwrap();

        assert_eq!(edited.status(), TransactionStatus::Returned);
        assert_eq!(edited.fine(), Fine::ZERO);
        assert_eq!(event.previous_status, TransactionStatus::Delayed);
        assert!(event.recalculated);
    }

    #[test]
    fn test_edit_transaction_without_date_change_keeps_state() {
        let transaction = borrowed_on_new_year();
        let mut cmd = edit_cmd(&transaction);
        cmd.book_id = BookId::new();

        let (edited, event) = edit_transaction(&transaction, &cmd).unwrap();

        assert_eq!(edited.book_id, cmd.book_id);
        assert_eq!(edited.state, transaction.state);
        assert!(!event.recalculated);
    }

    #[test]
    fn test_edit_transaction_reports_status_mismatch() {
        let transaction = borrowed_on_new_year();
        let mut cmd = edit_cmd(&transaction);
        cmd.returned_date = Some(date(2024, 1, 20));
        cmd.declared_status = Some(TransactionStatus::Returned);

        let result = edit_transaction(&transaction, &cmd);
        assert_eq!(
            result.unwrap_err(),
            EditTransactionError::Validation(ValidationError::StatusMismatch {
                declared: TransactionStatus::Returned,
                computed: TransactionStatus::Delayed,
            })
        );
    }

    #[test]
    fn test_edit_transaction_declared_returned_without_date_mismatches() {
        let transaction = borrowed_on_new_year();
        let mut cmd = edit_cmd(&transaction);
        cmd.declared_status = Some(TransactionStatus::Returned);

        let result = edit_transaction(&transaction, &cmd);
        assert!(matches!(
            result.unwrap_err(),
            EditTransactionError::Validation(ValidationError::StatusMismatch { .. })
        ));
    }

    #[test]
    fn test_edit_transaction_cannot_reopen_returned() {
        let transaction = borrowed_on_new_year();
        let (returned, _) =
            record_return(&transaction, &return_cmd(&transaction, date(2024, 1, 5))).unwrap();

        let mut cmd = edit_cmd(&returned);
        cmd.returned_date = None;

        let result = edit_transaction(&returned, &cmd);
        assert_eq!(result.unwrap_err(), EditTransactionError::CannotReopen);
    }

    #[test]
    fn test_edit_transaction_rejects_negative_period() {
        let transaction = borrowed_on_new_year();
        let mut cmd = edit_cmd(&transaction);
        cmd.borrowed_for_days = -1;

        let result = edit_transaction(&transaction, &cmd);
        assert_eq!(
            result.unwrap_err(),
            EditTransactionError::Validation(ValidationError::NegativeLoanPeriod(-1))
        );
    }

    // TDD: settle() のテスト
    #[test]
    fn test_settle_invariants_hold_for_every_outcome() {
        let borrowed = date(2024, 1, 1);
        let period = LoanPeriod::try_from(10i64).unwrap();
        let mut outcomes = vec![settle(borrowed, period, None).unwrap()];
        for offset in 0..25u64 {
            let returned = borrowed + chrono::Days::new(offset);
            outcomes.push(settle(borrowed, period, Some(returned)).unwrap());
        }

        for state in outcomes {
            // Borrowed ⇔ 返却日なし
            assert_eq!(
                state.status() == TransactionStatus::Borrowed,
                state.returned_date().is_none()
            );
            // 料金 > 0 ⇒ Delayed
            if !state.fine().is_zero() {
                assert_eq!(state.status(), TransactionStatus::Delayed);
            }
        }
    }

    #[test]
    fn test_transaction_serializes_status_tag() {
        let transaction = borrowed_on_new_year();
        let json = serde_json::to_value(&transaction).unwrap();
        assert_eq!(json["status"], "borrowed");

        let restored: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(restored, transaction);
    }

    #[test]
    fn test_delete_transaction_event() {
        let transaction = borrowed_on_new_year();
        let cmd = DeleteTransaction {
            transaction_id: transaction.transaction_id,
            actor: ActorRole::Admin,
            requested_at: Utc::now(),
        };

        let event = delete_transaction(&transaction, &cmd);
        assert_eq!(event.transaction_id, transaction.transaction_id);
        assert_eq!(event.deleted_by, ActorRole::Admin);
    }
}
