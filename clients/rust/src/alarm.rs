use crate::{APIResponse, BaseClient};
use alarm_notifier_api_structs::*;
use alarm_notifier_domain::ID;
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct AlarmClient {
    base: Arc<BaseClient>,
}

pub struct CreateAlarmInput {
    pub user_id: ID,
    pub message: String,
    /// `HH:MM` or `HH:MM:SS`
    pub time: String,
    /// `0` is Monday and `6` is Sunday
    pub days_of_week: Vec<i64>,
    pub is_active: Option<bool>,
    pub send_sms: Option<bool>,
    pub send_email: Option<bool>,
    pub timezone: Option<String>,
}

impl AlarmClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn create(&self, input: CreateAlarmInput) -> APIResponse<create_alarm::APIResponse> {
        let body = create_alarm::RequestBody {
            user_id: input.user_id,
            message: input.message,
            time: input.time,
            days_of_week: input.days_of_week,
            is_active: input.is_active,
            send_sms: input.send_sms,
            send_email: input.send_email,
            timezone: input.timezone,
        };
        self.base
            .post(body, "alarm".into(), StatusCode::CREATED)
            .await
    }

    pub async fn get(&self, alarm_id: ID) -> APIResponse<get_alarm::APIResponse> {
        self.base
            .get(format!("alarm/{}", alarm_id), StatusCode::OK)
            .await
    }

    pub async fn get_by_user(&self, user_id: ID) -> APIResponse<get_user_alarms::APIResponse> {
        self.base
            .get(format!("user/{}/alarms", user_id), StatusCode::OK)
            .await
    }

    pub async fn set_active(
        &self,
        alarm_id: ID,
        is_active: bool,
    ) -> APIResponse<update_alarm::APIResponse> {
        let body = update_alarm::RequestBody { is_active };
        self.base
            .put(body, format!("alarm/{}", alarm_id), StatusCode::OK)
            .await
    }

    pub async fn delete(&self, alarm_id: ID) -> APIResponse<delete_alarm::APIResponse> {
        self.base
            .delete(format!("alarm/{}", alarm_id), StatusCode::OK)
            .await
    }
}
