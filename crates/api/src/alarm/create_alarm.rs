use super::sync_alarm_jobs::{AlarmJobSynchronizer, SyncError};
use crate::error::AlarmNotifierError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use alarm_notifier_api_structs::create_alarm::*;
use alarm_notifier_domain::{Alarm, AlarmJob, NaiveTime, Tz, Weekdays, ID};
use alarm_notifier_infra::AlarmContext;

pub async fn create_alarm_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<AlarmContext>,
) -> Result<HttpResponse, AlarmNotifierError> {
    let body = body.0;
    let usecase = CreateAlarmUseCase {
        user_id: body.user_id,
        message: body.message,
        time: body.time,
        days_of_week: body.days_of_week,
        active: body.is_active.unwrap_or(true),
        send_sms: body.send_sms.unwrap_or(false),
        send_email: body.send_email.unwrap_or(false),
        timezone: body.timezone,
    };

    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Created().json(APIResponse::new(res.alarm, Some(res.alarm_job))))
        .map_err(AlarmNotifierError::from)
}

#[derive(Debug)]
pub struct CreateAlarmUseCase {
    pub user_id: ID,
    pub message: String,
    pub time: String,
    pub days_of_week: Vec<i64>,
    pub active: bool,
    pub send_sms: bool,
    pub send_email: bool,
    pub timezone: Option<String>,
}

#[derive(Debug)]
pub struct UseCaseRes {
    pub alarm: Alarm,
    pub alarm_job: AlarmJob,
}

#[derive(Debug)]
pub enum UseCaseError {
    UserNotFound(ID),
    InvalidMessage,
    InvalidTime(String),
    InvalidWeekdays(String),
    InvalidTimezone(String),
    NoChannelEnabled,
    MissingPhoneNumber,
    MissingEmail,
    SyncFailed(SyncError),
}

impl From<UseCaseError> for AlarmNotifierError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::UserNotFound(id) => {
                Self::NotFound(format!("A user with id: {}, was not found.", id))
            }
            UseCaseError::InvalidMessage => Self::BadClientData("Message cannot be empty".into()),
            UseCaseError::InvalidTime(time) => Self::BadClientData(format!(
                "Invalid time: {}, expected a time of day as HH:MM or HH:MM:SS",
                time
            )),
            UseCaseError::InvalidWeekdays(msg) => Self::BadClientData(msg),
            UseCaseError::InvalidTimezone(tz) => {
                Self::BadClientData(format!("Invalid timezone: {}", tz))
            }
            UseCaseError::NoChannelEnabled => Self::BadClientData(
                "An active alarm must have at least one of sendSms or sendEmail enabled".into(),
            ),
            UseCaseError::MissingPhoneNumber => {
                Self::BadClientData("The user has no phone number to send sms to".into())
            }
            UseCaseError::MissingEmail => {
                Self::BadClientData("The user has no email to send emails to".into())
            }
            UseCaseError::SyncFailed(SyncError::InvalidTrigger(e)) => {
                Self::BadClientData(e.to_string())
            }
            UseCaseError::SyncFailed(_) => Self::InternalError,
        }
    }
}

/// Accepts both `HH:MM` and `HH:MM:SS`
pub fn parse_time_of_day(time: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
        .ok()
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateAlarmUseCase {
    type Response = UseCaseRes;
    type Error = UseCaseError;

    const NAME: &'static str = "CreateAlarm";

    async fn execute(&mut self, ctx: &AlarmContext) -> Result<Self::Response, Self::Error> {
        let user = match ctx.repos.users.find(&self.user_id).await {
            Some(user) => user,
            None => return Err(UseCaseError::UserNotFound(self.user_id)),
        };

        if self.message.trim().is_empty() {
            return Err(UseCaseError::InvalidMessage);
        }
        let time = parse_time_of_day(&self.time)
            .ok_or_else(|| UseCaseError::InvalidTime(self.time.clone()))?;
        let weekdays = Weekdays::from_days(self.days_of_week.iter().copied())
            .map_err(|e| UseCaseError::InvalidWeekdays(e.to_string()))?;
        let timezone = match &self.timezone {
            Some(tz) => tz
                .parse::<Tz>()
                .map_err(|_| UseCaseError::InvalidTimezone(tz.clone()))?,
            None => user.timezone,
        };

        if self.active && !self.send_sms && !self.send_email {
            return Err(UseCaseError::NoChannelEnabled);
        }
        if self.send_sms && user.phone_number.is_none() {
            return Err(UseCaseError::MissingPhoneNumber);
        }
        if self.send_email && user.email.is_none() {
            return Err(UseCaseError::MissingEmail);
        }

        let now = ctx.sys.get_timestamp_millis();
        let alarm = Alarm {
            id: Default::default(),
            user_id: user.id,
            message: self.message.clone(),
            time,
            weekdays,
            active: self.active,
            send_sms: self.send_sms,
            send_email: self.send_email,
            timezone,
            created: now,
            updated: now,
        };

        let alarm_job = AlarmJobSynchronizer::new(ctx)
            .on_create(&alarm, &user.contact_info())
            .await
            .map_err(UseCaseError::SyncFailed)?;

        Ok(UseCaseRes { alarm, alarm_job })
    }
}
