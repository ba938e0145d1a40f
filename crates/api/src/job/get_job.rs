use crate::error::AlarmNotifierError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use alarm_notifier_api_structs::get_job::*;
use alarm_notifier_domain::{JobId, ScheduledJob};
use alarm_notifier_infra::AlarmContext;

/// Reports whether a job is live in the registry. An unknown job id is not an
/// error, it is simply reported as not scheduled.
pub async fn get_job_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<AlarmContext>,
) -> Result<HttpResponse, AlarmNotifierError> {
    let usecase = GetJobUseCase {
        job_id: JobId::from(path_params.into_inner().job_id),
    };

    execute(usecase, &ctx)
        .await
        .map(|usecase_res| {
            HttpResponse::Ok().json(APIResponse::new(
                usecase_res.job_id.as_str().to_string(),
                usecase_res.job,
            ))
        })
        .map_err(AlarmNotifierError::from)
}

#[derive(Debug)]
struct GetJobUseCase {
    job_id: JobId,
}

#[derive(Debug)]
struct UseCaseRes {
    job_id: JobId,
    job: Option<ScheduledJob>,
}

#[derive(Debug)]
enum UseCaseError {}

impl From<UseCaseError> for AlarmNotifierError {
    fn from(e: UseCaseError) -> Self {
        match e {}
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetJobUseCase {
    type Response = UseCaseRes;
    type Error = UseCaseError;

    const NAME: &'static str = "GetJob";

    async fn execute(&mut self, ctx: &AlarmContext) -> Result<Self::Response, Self::Error> {
        let job = ctx.registry.get(&self.job_id).await;
        Ok(UseCaseRes {
            job_id: self.job_id.clone(),
            job,
        })
    }
}
