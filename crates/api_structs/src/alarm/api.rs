use crate::dtos::AlarmDTO;
use alarm_notifier_domain::{Alarm, AlarmJob, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmResponse {
    pub alarm: AlarmDTO,
}

impl AlarmResponse {
    pub fn new(alarm: Alarm, alarm_job: Option<AlarmJob>) -> Self {
        Self {
            alarm: AlarmDTO::new(alarm, alarm_job),
        }
    }
}

pub mod create_alarm {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub user_id: ID,
        pub message: String,
        /// Local time of day as `HH:MM` or `HH:MM:SS`
        pub time: String,
        /// `0` is Monday and `6` is Sunday
        pub days_of_week: Vec<i64>,
        #[serde(default)]
        pub is_active: Option<bool>,
        #[serde(default)]
        pub send_sms: Option<bool>,
        #[serde(default)]
        pub send_email: Option<bool>,
        /// Defaults to the timezone of the user
        #[serde(default)]
        pub timezone: Option<String>,
    }

    pub type APIResponse = AlarmResponse;
}

pub mod get_alarm {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub alarm_id: ID,
    }

    pub type APIResponse = AlarmResponse;
}

pub mod update_alarm {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub is_active: bool,
    }

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub alarm_id: ID,
    }

    pub type APIResponse = AlarmResponse;
}

pub mod delete_alarm {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub alarm_id: ID,
    }

    pub type APIResponse = AlarmResponse;
}

pub mod get_user_alarms {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub user_id: ID,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub alarms: Vec<AlarmDTO>,
    }

    impl APIResponse {
        pub fn new(alarms: Vec<(Alarm, Option<AlarmJob>)>) -> Self {
            Self {
                alarms: alarms
                    .into_iter()
                    .map(|(alarm, alarm_job)| AlarmDTO::new(alarm, alarm_job))
                    .collect(),
            }
        }
    }
}
