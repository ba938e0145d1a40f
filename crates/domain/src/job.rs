use crate::{shared::entity::ID, trigger::TriggerRule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub const EMAIL_SUBJECT: &str = "Alarm notification";

/// Transport a notification is delivered over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Sms,
    Email,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Sms, Channel::Email];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sms => "sms",
            Self::Email => "email",
        }
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a scheduled job. Derived from the alarm and the channel so
/// that scheduling the same alarm twice replaces instead of duplicating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn for_alarm(channel: Channel, alarm_id: &ID) -> Self {
        Self(format!("alarm:{}:{}", channel, alarm_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of everything needed to deliver one notification, taken when the
/// job is scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", rename_all = "lowercase")]
pub enum NotificationPayload {
    #[serde(rename_all = "camelCase")]
    Sms {
        alarm_id: ID,
        phone_number: String,
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    Email {
        alarm_id: ID,
        email: String,
        subject: String,
        message: String,
    },
}

impl NotificationPayload {
    pub fn channel(&self) -> Channel {
        match self {
            Self::Sms { .. } => Channel::Sms,
            Self::Email { .. } => Channel::Email,
        }
    }

    pub fn alarm_id(&self) -> &ID {
        match self {
            Self::Sms { alarm_id, .. } | Self::Email { alarm_id, .. } => alarm_id,
        }
    }
}

/// An entry of the job registry
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledJob {
    pub id: JobId,
    pub rule: TriggerRule,
    pub payload: NotificationPayload,
    /// The upcoming occurrence. Advanced every time the job fires.
    pub next_fire_at: DateTime<Utc>,
    /// Incremented every time the job is replaced
    pub version: i64,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn derives_job_id_from_channel_and_alarm() {
        let alarm_id = ID::new();
        assert_eq!(
            JobId::for_alarm(Channel::Sms, &alarm_id).as_str(),
            format!("alarm:sms:{}", alarm_id)
        );
        assert_eq!(
            JobId::for_alarm(Channel::Email, &alarm_id),
            JobId::for_alarm(Channel::Email, &alarm_id)
        );
        assert_ne!(
            JobId::for_alarm(Channel::Sms, &alarm_id),
            JobId::for_alarm(Channel::Email, &alarm_id)
        );
    }

    #[test]
    fn tags_payload_with_channel() {
        let payload = NotificationPayload::Sms {
            alarm_id: ID::new(),
            phone_number: "+4799999999".into(),
            message: "Wake up".into(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["channel"], "sms");
        assert_eq!(json["phoneNumber"], "+4799999999");
        assert_eq!(payload.channel(), Channel::Sms);
    }
}
