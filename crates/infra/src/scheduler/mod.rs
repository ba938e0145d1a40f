mod alarm_locks;
mod error;
mod registry;
mod runtime;

pub use alarm_locks::AlarmLocks;
pub use error::JobError;
pub use registry::JobRegistry;
pub use runtime::SchedulerRuntime;
