use super::INotificationSender;
use alarm_notifier_domain::NotificationPayload;
use reqwest::Client;
use tracing::error;

pub const WEBHOOK_KEY_HEADER: &str = "alarm-notifier-webhook-key";

/// Posts the payload as JSON to a gateway which does the actual delivery
pub struct WebhookNotificationSender {
    client: Client,
    url: String,
    key: String,
}

impl WebhookNotificationSender {
    pub fn new(url: String, key: String) -> Self {
        Self {
            client: Client::new(),
            url,
            key,
        }
    }
}

#[async_trait::async_trait]
impl INotificationSender for WebhookNotificationSender {
    async fn send(&self, payload: &NotificationPayload) -> anyhow::Result<()> {
        match self
            .client
            .post(&self.url)
            .header(WEBHOOK_KEY_HEADER, &self.key)
            .json(payload)
            .send()
            .await
        {
            Ok(res) => res.error_for_status().map(|_| ()).map_err(|e| {
                error!(
                    "[Unexpected Response] Notification gateway {} rejected {} notification. Error message: {:?}",
                    self.url,
                    payload.channel(),
                    e
                );
                anyhow::Error::new(e)
            }),
            Err(e) => {
                error!(
                    "[Network Error] Notification gateway {} error. Error message: {:?}",
                    self.url, e
                );
                Err(anyhow::Error::new(e))
            }
        }
    }
}
