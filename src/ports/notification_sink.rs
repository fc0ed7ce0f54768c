use crate::domain::value_objects::TransactionId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 通知の重要度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Danger,
}

impl NotificationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "success",
            NotificationLevel::Danger => "danger",
        }
    }
}

impl std::str::FromStr for NotificationLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "info" => Ok(NotificationLevel::Info),
            "success" => Ok(NotificationLevel::Success),
            "danger" => Ok(NotificationLevel::Danger),
            _ => Err(format!("Invalid notification level: {}", s)),
        }
    }
}

/// 管理者向け通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminNotification {
    pub title: String,
    pub body: Option<String>,
    pub level: NotificationLevel,
    pub transaction_id: TransactionId,
}

/// 通知配信のエラー
#[derive(Debug, Error)]
pub enum NotificationDeliveryError {
    #[error("notification delivery failed")]
    Failed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, NotificationDeliveryError>;

/// 通知シンクポート
///
/// 管理者への通知配信メカニズムを抽象化する。
/// 配信はベストエフォートであり、失敗しても貸出記録の書き込みは取り消されない。
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// 管理者へ通知を送信する
    async fn send(&self, notification: AdminNotification) -> Result<()>;
}
