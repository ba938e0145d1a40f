use super::sync_alarm_jobs::{AlarmJobSynchronizer, SyncError};
use crate::error::AlarmNotifierError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use alarm_notifier_api_structs::update_alarm::*;
use alarm_notifier_domain::{Alarm, AlarmJob, ID};
use alarm_notifier_infra::AlarmContext;

pub async fn update_alarm_controller(
    body: web::Json<RequestBody>,
    path_params: web::Path<PathParams>,
    ctx: web::Data<AlarmContext>,
) -> Result<HttpResponse, AlarmNotifierError> {
    let usecase = UpdateAlarmUseCase {
        alarm_id: path_params.alarm_id,
        active: body.is_active,
    };

    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Ok().json(APIResponse::new(res.alarm, Some(res.alarm_job))))
        .map_err(AlarmNotifierError::from)
}

/// Only the active flag of an alarm can be changed
#[derive(Debug)]
pub struct UpdateAlarmUseCase {
    pub alarm_id: ID,
    pub active: bool,
}

#[derive(Debug)]
pub struct UseCaseRes {
    pub alarm: Alarm,
    pub alarm_job: AlarmJob,
}

#[derive(Debug)]
pub enum UseCaseError {
    AlarmNotFound(ID),
    SyncFailed(SyncError),
}

impl From<UseCaseError> for AlarmNotifierError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::AlarmNotFound(id) => {
                Self::NotFound(format!("An alarm with id: {}, was not found.", id))
            }
            UseCaseError::SyncFailed(SyncError::InvalidTrigger(e)) => {
                Self::BadClientData(e.to_string())
            }
            UseCaseError::SyncFailed(_) => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateAlarmUseCase {
    type Response = UseCaseRes;
    type Error = UseCaseError;

    const NAME: &'static str = "UpdateAlarm";

    async fn execute(&mut self, ctx: &AlarmContext) -> Result<Self::Response, Self::Error> {
        match AlarmJobSynchronizer::new(ctx)
            .on_update(&self.alarm_id, self.active)
            .await
        {
            Ok((alarm, alarm_job)) => Ok(UseCaseRes { alarm, alarm_job }),
            Err(SyncError::AlarmNotFound(id)) => Err(UseCaseError::AlarmNotFound(id)),
            Err(e) => Err(UseCaseError::SyncFailed(e)),
        }
    }
}
