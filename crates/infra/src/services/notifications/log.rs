use super::INotificationSender;
use alarm_notifier_domain::NotificationPayload;
use tracing::info;

/// Used for channels without a configured gateway
pub struct LogNotificationSender {}

#[async_trait::async_trait]
impl INotificationSender for LogNotificationSender {
    async fn send(&self, payload: &NotificationPayload) -> anyhow::Result<()> {
        match payload {
            NotificationPayload::Sms {
                alarm_id,
                phone_number,
                message,
            } => info!(
                "SMS for alarm {} to {}: {}",
                alarm_id, phone_number, message
            ),
            NotificationPayload::Email {
                alarm_id,
                email,
                subject,
                message,
            } => info!(
                "Email for alarm {} to {} with subject {}: {}",
                alarm_id, email, subject, message
            ),
        }
        Ok(())
    }
}
