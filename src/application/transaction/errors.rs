use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{EditTransactionError, PreconditionError, RecordReturnError, ValidationError};

/// 貸出記録アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum TransactionApplicationError {
    /// 入力値の検証エラー
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// 書籍・借り手の前提条件を満たさない
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// 貸出記録が見つからない
    #[error("Transaction not found")]
    TransactionNotFound,

    /// 別の返却日で既に返却済み
    #[error("Transaction was already returned on {returned_date}")]
    AlreadyReturned { returned_date: NaiveDate },

    /// 返却済みの記録を貸出中に戻そうとした
    #[error("A returned transaction cannot be reopened")]
    CannotReopen,

    /// TransactionRepositoryのエラー
    #[error("Transaction repository error")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// BookDirectoryのエラー
    #[error("Book directory error")]
    BookDirectoryError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// UserDirectoryのエラー
    #[error("User directory error")]
    UserDirectoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<RecordReturnError> for TransactionApplicationError {
    fn from(e: RecordReturnError) -> Self {
        match e {
            RecordReturnError::AlreadyReturned { returned_date } => {
                TransactionApplicationError::AlreadyReturned { returned_date }
            }
            RecordReturnError::Validation(e) => TransactionApplicationError::Validation(e),
        }
    }
}

impl From<EditTransactionError> for TransactionApplicationError {
    fn from(e: EditTransactionError) -> Self {
        match e {
            EditTransactionError::CannotReopen => TransactionApplicationError::CannotReopen,
            EditTransactionError::Validation(e) => TransactionApplicationError::Validation(e),
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, TransactionApplicationError>;
