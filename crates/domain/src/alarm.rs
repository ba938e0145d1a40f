use crate::{
    job::{Channel, JobId, NotificationPayload, EMAIL_SUBJECT},
    shared::{
        entity::{Entity, ID},
        weekdays::Weekdays,
    },
    trigger::{TriggerError, TriggerRule},
    user::ContactInfo,
};
use chrono::NaiveTime;
use chrono_tz::Tz;

/// A recurring notification owned by a `User`: on every weekday in
/// `weekdays`, at `time` in `timezone`, send `message` over every enabled
/// channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Alarm {
    pub id: ID,
    pub user_id: ID,
    pub message: String,
    pub time: NaiveTime,
    pub weekdays: Weekdays,
    pub active: bool,
    pub send_sms: bool,
    pub send_email: bool,
    pub timezone: Tz,
    pub created: i64,
    pub updated: i64,
}

impl Alarm {
    pub fn trigger_rule(&self) -> Result<TriggerRule, TriggerError> {
        TriggerRule::with_tz(self.weekdays, self.time, self.timezone)
    }

    pub fn is_channel_enabled(&self, channel: Channel) -> bool {
        match channel {
            Channel::Sms => self.send_sms,
            Channel::Email => self.send_email,
        }
    }

    /// Channels that should have a live job. Empty for an inactive `Alarm`.
    pub fn channels_to_schedule(&self) -> Vec<Channel> {
        if !self.active {
            return Vec::new();
        }
        Channel::ALL
            .iter()
            .copied()
            .filter(|c| self.is_channel_enabled(*c))
            .collect()
    }

    pub fn job_id(&self, channel: Channel) -> JobId {
        JobId::for_alarm(channel, &self.id)
    }

    /// The payload sent over `channel`, or `None` when the owner has no
    /// contact address for it.
    pub fn notification_payload(
        &self,
        channel: Channel,
        contact: &ContactInfo,
    ) -> Option<NotificationPayload> {
        match channel {
            Channel::Sms => contact
                .phone_number
                .as_ref()
                .map(|phone_number| NotificationPayload::Sms {
                    alarm_id: self.id,
                    phone_number: phone_number.clone(),
                    message: self.message.clone(),
                }),
            Channel::Email => contact
                .email
                .as_ref()
                .map(|email| NotificationPayload::Email {
                    alarm_id: self.id,
                    email: email.clone(),
                    subject: EMAIL_SUBJECT.to_string(),
                    message: self.message.clone(),
                }),
        }
    }
}

impl Entity for Alarm {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// Ids of the jobs currently scheduled for an `Alarm`. A `Some` id refers to a
/// live entry of the job registry.
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmJob {
    pub alarm_id: ID,
    pub sms_job_id: Option<JobId>,
    pub email_job_id: Option<JobId>,
}

impl AlarmJob {
    pub fn empty(alarm_id: ID) -> Self {
        Self {
            alarm_id,
            sms_job_id: None,
            email_job_id: None,
        }
    }

    pub fn job_id(&self, channel: Channel) -> Option<&JobId> {
        match channel {
            Channel::Sms => self.sms_job_id.as_ref(),
            Channel::Email => self.email_job_id.as_ref(),
        }
    }

    pub fn set_job_id(&mut self, channel: Channel, job_id: Option<JobId>) {
        match channel {
            Channel::Sms => self.sms_job_id = job_id,
            Channel::Email => self.email_job_id = job_id,
        }
    }

    pub fn job_ids(&self) -> Vec<&JobId> {
        self.sms_job_id
            .iter()
            .chain(self.email_job_id.iter())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sms_job_id.is_none() && self.email_job_id.is_none()
    }
}

impl Entity for AlarmJob {
    fn id(&self) -> &ID {
        &self.alarm_id
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn alarm() -> Alarm {
        Alarm {
            id: ID::new(),
            user_id: ID::new(),
            message: "Take your vitamins".into(),
            time: NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
            weekdays: Weekdays::from_days(vec![0, 2]).unwrap(),
            active: true,
            send_sms: true,
            send_email: false,
            timezone: chrono_tz::America::New_York,
            created: 0,
            updated: 0,
        }
    }

    #[test]
    fn schedules_only_enabled_channels_of_active_alarms() {
        let mut alarm = alarm();
        assert_eq!(alarm.channels_to_schedule(), vec![Channel::Sms]);
        alarm.send_email = true;
        assert_eq!(
            alarm.channels_to_schedule(),
            vec![Channel::Sms, Channel::Email]
        );
        alarm.active = false;
        assert!(alarm.channels_to_schedule().is_empty());
    }

    #[test]
    fn builds_payload_from_contact_info() {
        let alarm = alarm();
        let contact = ContactInfo {
            phone_number: Some("+15550100".into()),
            email: None,
        };
        assert_eq!(
            alarm.notification_payload(Channel::Sms, &contact),
            Some(NotificationPayload::Sms {
                alarm_id: alarm.id,
                phone_number: "+15550100".into(),
                message: alarm.message.clone(),
            })
        );
        assert!(alarm.notification_payload(Channel::Email, &contact).is_none());
    }

    #[test]
    fn tracks_job_ids_per_channel() {
        let alarm = alarm();
        let mut alarm_job = AlarmJob::empty(alarm.id);
        assert!(alarm_job.is_empty());
        alarm_job.set_job_id(Channel::Email, Some(alarm.job_id(Channel::Email)));
        assert_eq!(alarm_job.job_ids(), vec![&alarm.job_id(Channel::Email)]);
        assert!(alarm_job.job_id(Channel::Sms).is_none());
    }
}
