mod errors;
mod notifications;
mod statistics;
mod transaction_service;

pub use errors::{Result, TransactionApplicationError};
pub use notifications::build_notification;
pub use statistics::{TransactionStats, get_navigation_badge, get_transaction_stats};
pub use transaction_service::{
    ServiceDependencies, create_transaction, delete_transaction, edit_transaction,
    get_transaction, list_transactions, preview_fine, record_return,
};
