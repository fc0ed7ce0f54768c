use crate::ports::notification_sink::{
    AdminNotification, NotificationDeliveryError, NotificationSink as NotificationSinkTrait,
    Result,
};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// NotificationSinkのPostgreSQL実装
///
/// 管理者の受信箱（admin_notifications）に1行追加する。
pub struct NotificationSink {
    pool: PgPool,
}

impl NotificationSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationSinkTrait for NotificationSink {
    async fn send(&self, notification: AdminNotification) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO admin_notifications (id, transaction_id, title, body, level)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(notification.transaction_id.value())
        .bind(&notification.title)
        .bind(notification.body.as_deref())
        .bind(notification.level.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| NotificationDeliveryError::Failed(Box::new(e)))?;

        Ok(())
    }
}
