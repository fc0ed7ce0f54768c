use crate::ports::notification_sink::{
    AdminNotification, NotificationDeliveryError, NotificationSink as NotificationSinkTrait,
    Result,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// Mock implementation of NotificationSink
///
/// Records every delivered notification so tests can inspect them.
/// Can be switched into a failing mode to exercise best-effort delivery.
pub struct NotificationSink {
    sent: Mutex<Vec<AdminNotification>>,
    failing: AtomicBool,
}

impl NotificationSink {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every subsequent delivery fail
    pub fn fail_deliveries(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Notifications delivered so far
    pub fn sent(&self) -> Vec<AdminNotification> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for NotificationSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSinkTrait for NotificationSink {
    async fn send(&self, notification: AdminNotification) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotificationDeliveryError::Failed(
                "mock notification sink is failing".into(),
            ));
        }

        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
        Ok(())
    }
}
