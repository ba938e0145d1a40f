use super::INotificationSender;
use alarm_notifier_domain::NotificationPayload;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

/// Records every payload it is asked to send. Can be told to fail.
pub struct InMemoryNotificationSender {
    sent: Mutex<Vec<NotificationPayload>>,
    fail: AtomicBool,
}

impl InMemoryNotificationSender {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<NotificationPayload> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for InMemoryNotificationSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl INotificationSender for InMemoryNotificationSender {
    async fn send(&self, payload: &NotificationPayload) -> anyhow::Result<()> {
        // Attempts are recorded even when failing
        self.sent.lock().unwrap().push(payload.clone());
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("Notification gateway unavailable");
        }
        Ok(())
    }
}
