use crate::domain::{DomainEvent, TransactionStatus};
use crate::ports::{AdminNotification, NotificationLevel};

use super::transaction_service::ServiceDependencies;

/// 利用者名が取得できない場合の表示名
const UNKNOWN_BORROWER: &str = "A borrower";

/// イベントから管理者向け通知を組み立てる
///
/// 作成、Returnedへの遷移、Delayedへの遷移のみが通知対象。
pub fn build_notification(event: &DomainEvent, borrower_name: &str) -> Option<AdminNotification> {
    if let DomainEvent::TransactionCreated(e) = event {
        return Some(AdminNotification {
            title: format!("{} Borrowed a book", borrower_name),
            body: None,
            level: NotificationLevel::Info,
            transaction_id: e.transaction_id,
        });
    }

    let (status, fine) = event.return_transition()?;
    let notification = match status {
        TransactionStatus::Returned => AdminNotification {
            title: "A Borrower Returned a book".to_string(),
            body: Some(format!("{} returned a book on time", borrower_name)),
            level: NotificationLevel::Success,
            transaction_id: event.transaction_id(),
        },
        TransactionStatus::Delayed => AdminNotification {
            title: "A Borrower Delayed to return a book".to_string(),
            body: Some(format!(
                "{} delayed to return a book, and had to pay a fine of {}",
                borrower_name, fine
            )),
            level: NotificationLevel::Danger,
            transaction_id: event.transaction_id(),
        },
        TransactionStatus::Borrowed => return None,
    };

    Some(notification)
}

/// 管理者へ通知する（ベストエフォート）
///
/// 名前解決や配信の失敗はログに残すだけで、呼び出し元には返さない。
pub(super) async fn notify_admins(deps: &ServiceDependencies, event: &DomainEvent) {
    if !matches!(event, DomainEvent::TransactionCreated(_)) && event.return_transition().is_none() {
        return;
    }

    let borrower_name = match deps.user_directory.get_user_name(event.borrower_id()).await {
        Ok(Some(name)) => name,
        Ok(None) => UNKNOWN_BORROWER.to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to resolve borrower name for notification");
            UNKNOWN_BORROWER.to_string()
        }
    };

    let Some(notification) = build_notification(event, &borrower_name) else {
        return;
    };

    if let Err(e) = deps.notification_sink.send(notification).await {
        tracing::warn!(
            transaction_id = %event.transaction_id().value(),
            error = %e,
            "admin notification was not delivered"
        );
    }
}
