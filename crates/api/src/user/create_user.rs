use crate::error::AlarmNotifierError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use alarm_notifier_api_structs::create_user::*;
use alarm_notifier_domain::User;
use alarm_notifier_infra::AlarmContext;

const MAX_USERNAME_LENGTH: usize = 50;

pub async fn create_user_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<AlarmContext>,
) -> Result<HttpResponse, AlarmNotifierError> {
    let body = body.0;
    let usecase = CreateUserUseCase {
        username: body.username,
        email: body.email,
        phone_number: body.phone_number,
        timezone: body.timezone,
    };

    execute(usecase, &ctx)
        .await
        .map(|usecase_res| HttpResponse::Created().json(APIResponse::new(usecase_res.user)))
        .map_err(AlarmNotifierError::from)
}

#[derive(Debug)]
pub struct CreateUserUseCase {
    pub username: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug)]
pub struct UseCaseRes {
    pub user: User,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
    InvalidUsername,
    MissingContactInfo,
    InvalidTimezone(String),
    UserAlreadyExists(String),
}

impl From<UseCaseError> for AlarmNotifierError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError => Self::InternalError,
            UseCaseError::InvalidUsername => Self::BadClientData(format!(
                "Username must be between 1 and {} characters long",
                MAX_USERNAME_LENGTH
            )),
            UseCaseError::MissingContactInfo => {
                Self::BadClientData("At least one of email or phoneNumber must be given".into())
            }
            UseCaseError::InvalidTimezone(tz) => {
                Self::BadClientData(format!("Invalid timezone: {}", tz))
            }
            UseCaseError::UserAlreadyExists(username) => Self::Conflict(format!(
                "A user with username: {} already exist. Usernames need to be unique.",
                username
            )),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateUserUseCase {
    type Response = UseCaseRes;
    type Error = UseCaseError;

    const NAME: &'static str = "CreateUser";

    async fn execute(&mut self, ctx: &AlarmContext) -> Result<Self::Response, Self::Error> {
        let username = self.username.trim();
        if username.is_empty() || username.chars().count() > MAX_USERNAME_LENGTH {
            return Err(UseCaseError::InvalidUsername);
        }
        if self.email.is_none() && self.phone_number.is_none() {
            return Err(UseCaseError::MissingContactInfo);
        }

        let mut user = User::new(username.to_string());
        user.email = self.email.clone();
        user.phone_number = self.phone_number.clone();
        user.timezone = ctx.config.default_timezone;
        if let Some(tz) = &self.timezone {
            if !user.set_timezone(tz) {
                return Err(UseCaseError::InvalidTimezone(tz.clone()));
            }
        }

        if ctx.repos.users.find_by_username(&user.username).await.is_some() {
            return Err(UseCaseError::UserAlreadyExists(user.username));
        }

        let res = ctx.repos.users.insert(&user).await;
        match res {
            Ok(_) => Ok(UseCaseRes { user }),
            Err(_) => Err(UseCaseError::StorageError),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usecase(username: &str) -> CreateUserUseCase {
        CreateUserUseCase {
            username: username.into(),
            email: Some("carol@example.com".into()),
            phone_number: None,
            timezone: Some("Asia/Tokyo".into()),
        }
    }

    #[actix_web::test]
    async fn creates_user() {
        let ctx = AlarmContext::create_inmemory();
        let res = usecase("carol").execute(&ctx).await.unwrap();
        assert_eq!(res.user.timezone, chrono_tz::Asia::Tokyo);
        assert_eq!(ctx.repos.users.find(&res.user.id).await, Some(res.user));
    }

    #[actix_web::test]
    async fn rejects_duplicate_username() {
        let ctx = AlarmContext::create_inmemory();
        usecase("carol").execute(&ctx).await.unwrap();
        assert!(matches!(
            usecase("carol").execute(&ctx).await,
            Err(UseCaseError::UserAlreadyExists(_))
        ));
    }

    #[actix_web::test]
    async fn rejects_invalid_input() {
        let ctx = AlarmContext::create_inmemory();
        assert!(matches!(
            usecase("  ").execute(&ctx).await,
            Err(UseCaseError::InvalidUsername)
        ));

        let mut uc = usecase("carol");
        uc.email = None;
        assert!(matches!(
            uc.execute(&ctx).await,
            Err(UseCaseError::MissingContactInfo)
        ));

        let mut uc = usecase("carol");
        uc.timezone = Some("Moon/Base".into());
        assert!(matches!(
            uc.execute(&ctx).await,
            Err(UseCaseError::InvalidTimezone(_))
        ));
    }
}
