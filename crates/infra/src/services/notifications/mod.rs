mod inmemory;
mod log;
mod webhook;

pub use self::log::LogNotificationSender;
use crate::Config;
use alarm_notifier_domain::{Channel, NotificationPayload};
pub use inmemory::InMemoryNotificationSender;
use std::sync::Arc;
pub use webhook::WebhookNotificationSender;

/// Delivers a notification over a single channel
#[async_trait::async_trait]
pub trait INotificationSender: Send + Sync {
    async fn send(&self, payload: &NotificationPayload) -> anyhow::Result<()>;
}

/// One sender per `Channel`
#[derive(Clone)]
pub struct Notifiers {
    pub sms: Arc<dyn INotificationSender>,
    pub email: Arc<dyn INotificationSender>,
}

impl Notifiers {
    /// Webhook senders for every channel with a configured gateway, log
    /// senders for the rest
    pub fn from_config(config: &Config) -> Self {
        Self {
            sms: Self::sender_for(&config.sms_webhook_url, config),
            email: Self::sender_for(&config.email_webhook_url, config),
        }
    }

    fn sender_for(url: &Option<String>, config: &Config) -> Arc<dyn INotificationSender> {
        match url {
            Some(url) => Arc::new(WebhookNotificationSender::new(
                url.clone(),
                config.webhook_key.clone(),
            )),
            None => Arc::new(LogNotificationSender {}),
        }
    }

    pub fn for_channel(&self, channel: Channel) -> &Arc<dyn INotificationSender> {
        match channel {
            Channel::Sms => &self.sms,
            Channel::Email => &self.email,
        }
    }
}
