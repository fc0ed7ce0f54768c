use crate::application::navigation::NavigationBadge;
use crate::application::transaction::{
    ServiceDependencies, create_transaction as execute_create_transaction,
    delete_transaction as execute_delete_transaction,
    edit_transaction as execute_edit_transaction, get_navigation_badge,
    get_transaction as execute_get_transaction, get_transaction_stats,
    list_transactions as execute_list_transactions, preview_fine,
    record_return as execute_record_return,
};
use crate::domain::{
    commands::DeleteTransaction,
    value_objects::{TransactionId, UserId},
};
use crate::ports::TransactionFilter;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::{
    actor::Actor,
    error::ApiError,
    types::{
        CreateTransactionRequest, EditTransactionRequest, FinePreviewQuery, FinePreviewResponse,
        ListTransactionsQuery, RecordReturnRequest, TransactionResponse,
        TransactionStatsResponse, parse_status_filter,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Command handlers
// ============================================================================

/// POST /transactions - 新しい貸出を記録
///
/// 強制されるビジネスルール:
/// - 貸出期間は0〜30日
/// - 書籍が貸出可能であること
/// - 借り手が借り手ロールを持ち、有効であること
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    Json(req): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), ApiError> {
    let cmd = req.to_command(actor, Utc::now())?;

    let transaction = execute_create_transaction(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(TransactionResponse::from(transaction))))
}

/// POST /transactions/:id/return - 返却を記録
///
/// 同じ返却日での再実行は現在の記録をそのまま返す。
pub async fn record_return(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    Path(transaction_id): Path<Uuid>,
    Json(req): Json<RecordReturnRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let cmd = req.to_command(TransactionId::from_uuid(transaction_id), actor, Utc::now())?;

    let transaction = execute_record_return(&state.service_deps, cmd).await?;

    Ok(Json(TransactionResponse::from(transaction)))
}

/// PUT /transactions/:id - 貸出記録を編集
pub async fn edit_transaction(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    Path(transaction_id): Path<Uuid>,
    Json(req): Json<EditTransactionRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let cmd = req.to_command(TransactionId::from_uuid(transaction_id), actor, Utc::now())?;

    let transaction = execute_edit_transaction(&state.service_deps, cmd).await?;

    Ok(Json(TransactionResponse::from(transaction)))
}

/// DELETE /transactions/:id - 貸出記録を削除
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    Path(transaction_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let cmd = DeleteTransaction {
        transaction_id: TransactionId::from_uuid(transaction_id),
        actor,
        requested_at: Utc::now(),
    };

    execute_delete_transaction(&state.service_deps, cmd).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /transactions/:id - 貸出記録をIDで取得
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let transaction =
        execute_get_transaction(&state.service_deps, TransactionId::from_uuid(transaction_id))
            .await?;

    Ok(Json(TransactionResponse::from(transaction)))
}

/// GET /transactions - オプションフィルタ付き貸出一覧取得
///
/// クエリパラメータ:
/// - status: ステータスでフィルタリング（borrowed, returned, delayed）（オプション）
/// - borrower_id: 借り手IDでフィルタリング（オプション）
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<Vec<TransactionResponse>>, QueryError> {
    let status = query
        .status
        .as_deref()
        .map(parse_status_filter)
        .transpose()
        .map_err(QueryError::BadRequest)?;

    let filter = TransactionFilter {
        status,
        borrower_id: query.borrower_id.map(UserId::from_uuid),
    };

    let transactions = execute_list_transactions(&state.service_deps, filter)
        .await
        .map_err(|e| QueryError::InternalError(e.to_string()))?;

    Ok(Json(
        transactions
            .into_iter()
            .map(TransactionResponse::from)
            .collect(),
    ))
}

/// GET /stats/transactions - ステータスごとの件数
pub async fn transaction_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TransactionStatsResponse>, ApiError> {
    let stats = get_transaction_stats(&state.service_deps).await?;
    Ok(Json(TransactionStatsResponse::from(stats)))
}

/// GET /navigation/transactions - ナビゲーションバッジ
pub async fn navigation_badge(
    State(state): State<Arc<AppState>>,
) -> Result<Json<NavigationBadge>, ApiError> {
    let badge = get_navigation_badge(&state.service_deps).await?;
    Ok(Json(badge))
}

/// GET /fine-preview - 延滞料金の試算（保存しない）
pub async fn fine_preview(
    Query(query): Query<FinePreviewQuery>,
) -> Result<Json<FinePreviewResponse>, ApiError> {
    let assessment = preview_fine(
        query.borrowed_date,
        query.borrowed_for_days,
        query.returned_date,
    )?;
    Ok(Json(FinePreviewResponse::from(assessment)))
}

// ============================================================================
// Error types
// ============================================================================

/// クエリハンドラー用のエラー型
#[derive(Debug)]
pub enum QueryError {
    BadRequest(String),
    InternalError(String),
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            QueryError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            QueryError::InternalError(msg) => {
                // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
                tracing::error!("Internal error in query handler: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(super::types::ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
