use crate::application::transaction::TransactionApplicationError;
use crate::domain::{PreconditionError, ValidationError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(TransactionApplicationError);

impl From<TransactionApplicationError> for ApiError {
    fn from(err: TransactionApplicationError) -> Self {
        ApiError(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError(TransactionApplicationError::Validation(err))
    }
}

fn validation_code(err: &ValidationError) -> &'static str {
    match err {
        ValidationError::NegativeLoanPeriod(_) | ValidationError::LoanPeriodTooLong { .. } => {
            "INVALID_LOAN_PERIOD"
        }
        ValidationError::ReturnedBeforeBorrowed { .. } => "RETURNED_BEFORE_BORROWED",
        ValidationError::MissingRequired(_) => "MISSING_REQUIRED_FIELD",
        ValidationError::StatusNotAllowed { .. } => "STATUS_NOT_ALLOWED",
        ValidationError::StatusMismatch { .. } => "STATUS_MISMATCH",
    }
}

fn precondition_code(err: &PreconditionError) -> &'static str {
    match err {
        PreconditionError::BookNotAvailable => "BOOK_NOT_AVAILABLE",
        PreconditionError::UserNotBorrower => "USER_NOT_BORROWER",
        PreconditionError::BorrowerDisabled => "BORROWER_DISABLED",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self.0 {
            // 404 Not Found - リクエストされたリソースが存在しない
            TransactionApplicationError::TransactionNotFound => (
                StatusCode::NOT_FOUND,
                "TRANSACTION_NOT_FOUND",
                "Transaction not found".to_string(),
            ),

            // 422 Unprocessable Entity - 入力値・前提条件の違反
            TransactionApplicationError::Validation(ref e) => {
                (StatusCode::UNPROCESSABLE_ENTITY, validation_code(e), e.to_string())
            }
            TransactionApplicationError::Precondition(ref e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                precondition_code(e),
                e.to_string(),
            ),

            // 409 Conflict - 状態遷移の違反
            TransactionApplicationError::AlreadyReturned { .. } => (
                StatusCode::CONFLICT,
                "ALREADY_RETURNED",
                self.0.to_string(),
            ),
            TransactionApplicationError::CannotReopen => (
                StatusCode::CONFLICT,
                "CANNOT_REOPEN",
                self.0.to_string(),
            ),

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            TransactionApplicationError::RepositoryError(ref e) => {
                tracing::error!("Transaction repository error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "REPOSITORY_ERROR",
                    "Failed to access transactions".to_string(),
                )
            }
            TransactionApplicationError::BookDirectoryError(ref e) => {
                tracing::error!("Book directory error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "BOOK_DIRECTORY_ERROR",
                    "Book directory error".to_string(),
                )
            }
            TransactionApplicationError::UserDirectoryError(ref e) => {
                tracing::error!("User directory error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "USER_DIRECTORY_ERROR",
                    "User directory error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
