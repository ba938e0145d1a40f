mod inmemory;
mod postgres;

pub use inmemory::InMemoryAlarmJobRepo;
use alarm_notifier_domain::{AlarmJob, ID};
pub use postgres::PostgresAlarmJobRepo;

#[async_trait::async_trait]
pub trait IAlarmJobRepo: Send + Sync {
    async fn insert(&self, alarm_job: &AlarmJob) -> anyhow::Result<()>;
    async fn save(&self, alarm_job: &AlarmJob) -> anyhow::Result<()>;
    async fn find(&self, alarm_id: &ID) -> Option<AlarmJob>;
    async fn delete(&self, alarm_id: &ID) -> anyhow::Result<Option<AlarmJob>>;
}

#[cfg(test)]
mod tests {
    use crate::AlarmContext;
    use alarm_notifier_domain::{AlarmJob, Channel, JobId, ID};

    #[tokio::test]
    async fn test_alarm_job_queries() {
        let ctx = AlarmContext::create_inmemory();
        let alarm_id = ID::new();

        let mut alarm_job = AlarmJob::empty(alarm_id);
        alarm_job.set_job_id(Channel::Sms, Some(JobId::for_alarm(Channel::Sms, &alarm_id)));
        ctx.repos
            .alarm_jobs
            .insert(&alarm_job)
            .await
            .expect("To insert alarm job");
        assert_eq!(ctx.repos.alarm_jobs.find(&alarm_id).await, Some(alarm_job.clone()));

        alarm_job.set_job_id(Channel::Sms, None);
        ctx.repos
            .alarm_jobs
            .save(&alarm_job)
            .await
            .expect("To save alarm job");
        let found = ctx.repos.alarm_jobs.find(&alarm_id).await.unwrap();
        assert!(found.is_empty());

        let deleted = ctx.repos.alarm_jobs.delete(&alarm_id).await.unwrap();
        assert_eq!(deleted, Some(alarm_job));
        assert_eq!(ctx.repos.alarm_jobs.delete(&alarm_id).await.unwrap(), None);
    }
}
