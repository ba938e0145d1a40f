mod alarm;
mod job;
mod shared;
mod trigger;
mod user;

pub use alarm::{Alarm, AlarmJob};
pub use job::{Channel, JobId, NotificationPayload, ScheduledJob, EMAIL_SUBJECT};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use shared::weekdays::{InvalidWeekdaysError, Weekdays};
pub use trigger::{TriggerError, TriggerRule};
pub use user::{ContactInfo, User};

pub use chrono::{NaiveTime, Weekday};
pub use chrono_tz::Tz;
