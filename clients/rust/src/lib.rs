mod alarm;
mod base;
mod job;
mod status;
mod user;

use alarm::AlarmClient;
pub use alarm::CreateAlarmInput;
pub(crate) use base::BaseClient;
pub use base::{APIError, APIResponse};
use job::JobClient;
use status::StatusClient;
use std::sync::Arc;
use user::UserClient;
pub use user::{CreateUserInput, UpdateUserInput};

pub use alarm_notifier_api_structs::dtos::*;
pub use alarm_notifier_domain::ID;

// Domain
pub use alarm_notifier_api_structs::dtos::AlarmDTO as Alarm;
pub use alarm_notifier_api_structs::dtos::JobStatusDTO as JobStatus;
pub use alarm_notifier_api_structs::dtos::UserDTO as User;

/// Alarm Notifier Server SDK
///
/// The SDK contains methods for interacting with the Alarm Notifier server
/// API.
#[derive(Clone)]
pub struct AlarmNotifierSDK {
    pub alarm: AlarmClient,
    pub job: JobClient,
    pub status: StatusClient,
    pub user: UserClient,
}

impl AlarmNotifierSDK {
    pub fn new<T: Into<String>>(address: T) -> Self {
        let base = Arc::new(BaseClient::new(address.into()));
        let alarm = AlarmClient::new(base.clone());
        let job = JobClient::new(base.clone());
        let status = StatusClient::new(base.clone());
        let user = UserClient::new(base);

        Self {
            alarm,
            job,
            status,
            user,
        }
    }
}
