use chrono::NaiveDate;
use thiserror::Error;

use super::{Operation, TransactionStatus};

/// 入力値の検証エラー
///
/// 呼び出し元へ同期的に返される。自動リトライはせず、書き込みも行わない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 貸出期間が負
    #[error("borrowed_for_days must not be negative (got {0})")]
    NegativeLoanPeriod(i64),

    /// 貸出期間が上限を超えている
    #[error("borrowed_for_days must be at most {max} (got {days})")]
    LoanPeriodTooLong { days: i64, max: u32 },

    /// 返却日が貸出日より前
    #[error("returned_date {returned} is before borrowed_date {borrowed}")]
    ReturnedBeforeBorrowed {
        borrowed: NaiveDate,
        returned: NaiveDate,
    },

    /// 必須項目（書籍・借り手の参照など）が欠けている
    #[error("{0} is required")]
    MissingRequired(&'static str),

    /// この操作では選択できないステータス
    #[error("status '{declared}' cannot be chosen on {operation}")]
    StatusNotAllowed {
        declared: TransactionStatus,
        operation: Operation,
    },

    /// 申告されたステータスが日付から導出したステータスと一致しない
    #[error("declared status '{declared}' does not match computed status '{computed}'")]
    StatusMismatch {
        declared: TransactionStatus,
        computed: TransactionStatus,
    },
}

/// 外部ディレクトリで判定される前提条件のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    /// 書籍が貸出可能ではない
    #[error("book is not available for borrowing")]
    BookNotAvailable,

    /// 利用者が借り手ロールではない
    #[error("user does not have the borrower role")]
    UserNotBorrower,

    /// 借り手が無効化されている
    #[error("borrower account is disabled")]
    BorrowerDisabled,
}

/// 返却記録のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordReturnError {
    /// 別の返却日で既に返却済み（訂正は編集で行う）
    #[error("transaction was already returned on {returned_date}")]
    AlreadyReturned { returned_date: NaiveDate },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// 編集のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditTransactionError {
    /// 返却済み・延滞返却の記録から返却日を外して貸出中に戻すことはできない
    #[error("a returned transaction cannot be reopened")]
    CannotReopen,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
