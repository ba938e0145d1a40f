use alarm_notifier_infra::{AlarmContext, JobError};
use tracing::{error, info};

/// Brings the job registry back from storage and starts firing jobs
pub async fn start_job_scheduler(ctx: &AlarmContext) -> Result<(), JobError> {
    if let Err(e) = ctx.runtime.start().await {
        error!("Unable to start the job scheduler: {:?}", e);
        return Err(e);
    }
    info!("Job scheduler started with {} jobs", ctx.registry.len().await);
    Ok(())
}

pub async fn stop_job_scheduler(ctx: &AlarmContext) {
    ctx.runtime.stop().await;
    info!("Job scheduler stopped");
}
