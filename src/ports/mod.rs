pub mod book_directory;
pub mod notification_sink;
pub mod transaction_repository;
pub mod user_directory;

pub use book_directory::BookDirectory;
pub use notification_sink::{
    AdminNotification, NotificationDeliveryError, NotificationLevel, NotificationSink,
};
pub use transaction_repository::{TransactionFilter, TransactionRepository};
pub use user_directory::UserDirectory;
