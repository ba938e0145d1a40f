use alarm_notifier_domain::{Alarm, AlarmJob, NaiveTime, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmDTO {
    pub id: ID,
    pub user_id: ID,
    pub message: String,
    pub time: NaiveTime,
    pub days_of_week: Vec<u8>,
    pub is_active: bool,
    pub send_sms: bool,
    pub send_email: bool,
    pub timezone: String,
    pub created: i64,
    pub updated: i64,
    pub sms_job_id: Option<String>,
    pub email_job_id: Option<String>,
}

impl AlarmDTO {
    pub fn new(alarm: Alarm, alarm_job: Option<AlarmJob>) -> Self {
        let (sms_job_id, email_job_id) = match alarm_job {
            Some(alarm_job) => (
                alarm_job.sms_job_id.map(|id| id.to_string()),
                alarm_job.email_job_id.map(|id| id.to_string()),
            ),
            None => (None, None),
        };
        Self {
            id: alarm.id,
            user_id: alarm.user_id,
            message: alarm.message,
            time: alarm.time,
            days_of_week: alarm.weekdays.days(),
            is_active: alarm.active,
            send_sms: alarm.send_sms,
            send_email: alarm.send_email,
            timezone: alarm.timezone.name().to_string(),
            created: alarm.created,
            updated: alarm.updated,
            sms_job_id,
            email_job_id,
        }
    }
}
