use crate::alarm::sync_alarm_jobs::AlarmJobSynchronizer;
use crate::error::AlarmNotifierError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use alarm_notifier_api_structs::update_user::*;
use alarm_notifier_domain::{User, ID};
use alarm_notifier_infra::AlarmContext;
use tracing::info;

pub async fn update_user_controller(
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<AlarmContext>,
) -> Result<HttpResponse, AlarmNotifierError> {
    let body = body.0;
    let usecase = UpdateUserUseCase {
        user_id: path_params.user_id,
        email: body.email,
        phone_number: body.phone_number,
    };

    execute(usecase, &ctx)
        .await
        .map(|usecase_res| HttpResponse::Ok().json(APIResponse::new(usecase_res.user)))
        .map_err(AlarmNotifierError::from)
}

#[derive(Debug)]
pub struct UpdateUserUseCase {
    pub user_id: ID,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug)]
pub struct UseCaseRes {
    pub user: User,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
    NothingToUpdate,
    UserNotFound(ID),
    /// The user was saved, but the jobs of these alarms still carry the
    /// previous contact info
    AlarmResyncFailed(Vec<ID>),
}

impl From<UseCaseError> for AlarmNotifierError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError | UseCaseError::AlarmResyncFailed(_) => {
                Self::InternalError
            }
            UseCaseError::NothingToUpdate => {
                Self::BadClientData("At least one of email or phoneNumber must be given".into())
            }
            UseCaseError::UserNotFound(id) => {
                Self::NotFound(format!("A user with id: {}, was not found.", id))
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateUserUseCase {
    type Response = UseCaseRes;
    type Error = UseCaseError;

    const NAME: &'static str = "UpdateUser";

    async fn execute(&mut self, ctx: &AlarmContext) -> Result<Self::Response, Self::Error> {
        if self.email.is_none() && self.phone_number.is_none() {
            return Err(UseCaseError::NothingToUpdate);
        }

        let mut user = match ctx.repos.users.find(&self.user_id).await {
            Some(user) => user,
            None => return Err(UseCaseError::UserNotFound(self.user_id)),
        };
        let previous_contact = user.contact_info();

        if let Some(email) = &self.email {
            user.email = Some(email.clone());
        }
        if let Some(phone_number) = &self.phone_number {
            user.phone_number = Some(phone_number.clone());
        }

        ctx.repos
            .users
            .save(&user)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        if user.contact_info() != previous_contact {
            let resync = AlarmJobSynchronizer::new(ctx)
                .on_contact_changed(&user)
                .await;
            if !resync.failed.is_empty() {
                let failed = resync.failed.into_iter().map(|(id, _)| id).collect();
                return Err(UseCaseError::AlarmResyncFailed(failed));
            }
            info!("Resynced {} alarms of user {}", resync.synced, user.id);
        }

        Ok(UseCaseRes { user })
    }
}
