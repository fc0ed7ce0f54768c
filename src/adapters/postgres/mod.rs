pub mod book_directory;
pub mod notification_sink;
pub mod transaction_repository;
pub mod user_directory;

// パブリックに型を再エクスポート
pub use book_directory::BookDirectory as PostgresBookDirectory;
pub use notification_sink::NotificationSink as PostgresNotificationSink;
pub use transaction_repository::TransactionRepository as PostgresTransactionRepository;
pub use user_directory::UserDirectory as PostgresUserDirectory;
