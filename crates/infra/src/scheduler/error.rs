use alarm_notifier_domain::JobId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobError {
    #[error("The trigger of job {0} has no upcoming occurrence")]
    InvalidTrigger(JobId),
    #[error("Job store error: {0}")]
    Storage(#[source] anyhow::Error),
    #[error("Dispatch of job {job_id} failed: {reason}")]
    DispatchFailed { job_id: JobId, reason: String },
    #[error("Dispatch of job {0} timed out")]
    DispatchTimedOut(JobId),
}
