use crate::alarm::sync_alarm_jobs::{AlarmJobSynchronizer, SyncError};
use crate::error::AlarmNotifierError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use alarm_notifier_api_structs::delete_user::*;
use alarm_notifier_domain::{User, ID};
use alarm_notifier_infra::AlarmContext;

pub async fn delete_user_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<AlarmContext>,
) -> Result<HttpResponse, AlarmNotifierError> {
    let usecase = DeleteUserUseCase {
        user_id: path_params.user_id,
    };
    execute(usecase, &ctx)
        .await
        .map(|usecase_res| HttpResponse::Ok().json(APIResponse::new(usecase_res.user)))
        .map_err(AlarmNotifierError::from)
}

/// Deletes the user together with every alarm it owns. Alarms go first so
/// that no job is left firing for a user that no longer exists.
#[derive(Debug)]
pub struct DeleteUserUseCase {
    pub user_id: ID,
}

#[derive(Debug)]
pub struct UseCaseRes {
    pub user: User,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
    UserNotFound(ID),
    AlarmRemovalFailed(SyncError),
}

impl From<UseCaseError> for AlarmNotifierError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError | UseCaseError::AlarmRemovalFailed(_) => {
                Self::InternalError
            }
            UseCaseError::UserNotFound(id) => {
                Self::NotFound(format!("A user with id: {}, was not found.", id))
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteUserUseCase {
    type Response = UseCaseRes;
    type Error = UseCaseError;

    const NAME: &'static str = "DeleteUser";

    async fn execute(&mut self, ctx: &AlarmContext) -> Result<Self::Response, Self::Error> {
        if ctx.repos.users.find(&self.user_id).await.is_none() {
            return Err(UseCaseError::UserNotFound(self.user_id));
        }

        let synchronizer = AlarmJobSynchronizer::new(ctx);
        for alarm in ctx.repos.alarms.find_by_user(&self.user_id).await {
            match synchronizer.on_delete(&alarm.id).await {
                // Removed concurrently
                Ok(_) | Err(SyncError::AlarmNotFound(_)) => {}
                Err(e) => return Err(UseCaseError::AlarmRemovalFailed(e)),
            }
        }

        match ctx.repos.users.delete(&self.user_id).await {
            Some(user) => Ok(UseCaseRes { user }),
            None => Err(UseCaseError::StorageError),
        }
    }
}
