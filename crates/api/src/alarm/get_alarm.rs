use crate::error::AlarmNotifierError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use alarm_notifier_api_structs::get_alarm::*;
use alarm_notifier_domain::{Alarm, AlarmJob, ID};
use alarm_notifier_infra::AlarmContext;

pub async fn get_alarm_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<AlarmContext>,
) -> Result<HttpResponse, AlarmNotifierError> {
    let usecase = GetAlarmUseCase {
        alarm_id: path_params.alarm_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Ok().json(APIResponse::new(res.alarm, res.alarm_job)))
        .map_err(AlarmNotifierError::from)
}

#[derive(Debug)]
struct GetAlarmUseCase {
    alarm_id: ID,
}

#[derive(Debug)]
struct UseCaseRes {
    pub alarm: Alarm,
    pub alarm_job: Option<AlarmJob>,
}

#[derive(Debug)]
enum UseCaseError {
    AlarmNotFound(ID),
}

impl From<UseCaseError> for AlarmNotifierError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::AlarmNotFound(id) => {
                Self::NotFound(format!("An alarm with id: {}, was not found.", id))
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetAlarmUseCase {
    type Response = UseCaseRes;
    type Error = UseCaseError;

    const NAME: &'static str = "GetAlarm";

    async fn execute(&mut self, ctx: &AlarmContext) -> Result<Self::Response, Self::Error> {
        let alarm = match ctx.repos.alarms.find(&self.alarm_id).await {
            Some(alarm) => alarm,
            None => return Err(UseCaseError::AlarmNotFound(self.alarm_id)),
        };
        let alarm_job = ctx.repos.alarm_jobs.find(&alarm.id).await;

        Ok(UseCaseRes { alarm, alarm_job })
    }
}
