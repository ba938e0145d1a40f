use super::sync_alarm_jobs::{AlarmJobSynchronizer, SyncError};
use crate::error::AlarmNotifierError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use alarm_notifier_api_structs::delete_alarm::*;
use alarm_notifier_domain::{Alarm, ID};
use alarm_notifier_infra::AlarmContext;

pub async fn delete_alarm_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<AlarmContext>,
) -> Result<HttpResponse, AlarmNotifierError> {
    let usecase = DeleteAlarmUseCase {
        alarm_id: path_params.alarm_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|alarm| HttpResponse::Ok().json(APIResponse::new(alarm, None)))
        .map_err(AlarmNotifierError::from)
}

#[derive(Debug)]
pub struct DeleteAlarmUseCase {
    pub alarm_id: ID,
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
            UseCaseError::SyncFailed(_) => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteAlarmUseCase {
    type Response = Alarm;
    type Error = UseCaseError;

    const NAME: &'static str = "DeleteAlarm";

    async fn execute(&mut self, ctx: &AlarmContext) -> Result<Self::Response, Self::Error> {
        AlarmJobSynchronizer::new(ctx)
            .on_delete(&self.alarm_id)
            .await
            .map_err(|e| match e {
                SyncError::AlarmNotFound(id) => UseCaseError::AlarmNotFound(id),
                e => UseCaseError::SyncFailed(e),
            })
    }
}
