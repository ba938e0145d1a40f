use crate::{APIResponse, BaseClient};
use alarm_notifier_api_structs::get_job;
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct JobClient {
    base: Arc<BaseClient>,
}

impl JobClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn get(&self, job_id: &str) -> APIResponse<get_job::APIResponse> {
        self.base
            .get(format!("job/{}", job_id), StatusCode::OK)
            .await
    }
}
