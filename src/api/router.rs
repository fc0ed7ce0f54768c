use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_transaction, delete_transaction, edit_transaction, fine_preview,
    get_transaction, list_transactions, navigation_badge, record_return, transaction_stats,
};

/// Creates the API router with all transaction endpoints
///
/// Command endpoints (require the `x-actor-role` header):
/// - POST /transactions - Record a new borrow
/// - PUT /transactions/:id - Correct any field of a transaction
/// - POST /transactions/:id/return - Record the return
/// - DELETE /transactions/:id - Delete a transaction
///
/// Query endpoints:
/// - GET /transactions - List with optional status/borrower filters
/// - GET /transactions/:id - Get transaction details
/// - GET /stats/transactions - Counts per status
/// - GET /navigation/transactions - Cached badge count
/// - GET /fine-preview - Fine breakdown without persisting
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Transaction endpoints
        .route(
            "/transactions",
            post(create_transaction).get(list_transactions),
        )
        .route(
            "/transactions/:id",
            get(get_transaction)
                .put(edit_transaction)
                .delete(delete_transaction),
        )
        .route("/transactions/:id/return", post(record_return))
        // Dashboard and navigation
        .route("/stats/transactions", get(transaction_stats))
        .route("/navigation/transactions", get(navigation_badge))
        .route("/fine-preview", get(fine_preview))
        // Add tracing middleware
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
