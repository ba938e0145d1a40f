use alarm_notifier_domain::ScheduledJob;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusDTO {
    pub job_id: String,
    pub scheduled: bool,
    pub next_fire_at: Option<DateTime<Utc>>,
    pub version: Option<i64>,
}

impl JobStatusDTO {
    pub fn new(job_id: String, job: Option<ScheduledJob>) -> Self {
        Self {
            job_id,
            scheduled: job.is_some(),
            next_fire_at: job.as_ref().map(|j| j.next_fire_at),
            version: job.map(|j| j.version),
        }
    }
}
