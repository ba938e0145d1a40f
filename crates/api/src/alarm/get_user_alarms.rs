use crate::error::AlarmNotifierError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use alarm_notifier_api_structs::get_user_alarms::*;
use alarm_notifier_domain::{Alarm, AlarmJob, ID};
use alarm_notifier_infra::AlarmContext;

pub async fn get_user_alarms_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<AlarmContext>,
) -> Result<HttpResponse, AlarmNotifierError> {
    let usecase = GetUserAlarmsUseCase {
        user_id: path_params.user_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|alarms| HttpResponse::Ok().json(APIResponse::new(alarms)))
        .map_err(AlarmNotifierError::from)
}

#[derive(Debug)]
struct GetUserAlarmsUseCase {
    user_id: ID,
}

#[derive(Debug)]
enum UseCaseError {
    UserNotFound(ID),
}

impl From<UseCaseError> for AlarmNotifierError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::UserNotFound(id) => {
                Self::NotFound(format!("A user with id: {}, was not found.", id))
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetUserAlarmsUseCase {
    type Response = Vec<(Alarm, Option<AlarmJob>)>;
    type Error = UseCaseError;

    const NAME: &'static str = "GetUserAlarms";

    async fn execute(&mut self, ctx: &AlarmContext) -> Result<Self::Response, Self::Error> {
        if ctx.repos.users.find(&self.user_id).await.is_none() {
            return Err(UseCaseError::UserNotFound(self.user_id));
        }

        let mut alarms = Vec::new();
        for alarm in ctx.repos.alarms.find_by_user(&self.user_id).await {
            let alarm_job = ctx.repos.alarm_jobs.find(&alarm.id).await;
            alarms.push((alarm, alarm_job));
        }

        Ok(alarms)
    }
}
