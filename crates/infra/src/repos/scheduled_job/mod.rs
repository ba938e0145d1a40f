mod inmemory;
mod postgres;

pub use inmemory::InMemoryScheduledJobRepo;
use alarm_notifier_domain::{JobId, ScheduledJob};
use chrono::{DateTime, Utc};
pub use postgres::PostgresScheduledJobRepo;

/// Durable store of the job registry. Every entry survives a restart.
#[async_trait::async_trait]
pub trait IScheduledJobRepo: Send + Sync {
    /// Inserts the job or replaces the one with the same id
    async fn upsert(&self, job: &ScheduledJob) -> anyhow::Result<()>;
    /// Returns whether a job was removed
    async fn delete(&self, job_id: &JobId) -> anyhow::Result<bool>;
    async fn find_all(&self) -> anyhow::Result<Vec<ScheduledJob>>;
    async fn set_next_fire_at(
        &self,
        job_id: &JobId,
        next_fire_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use crate::AlarmContext;
    use alarm_notifier_domain::{
        Channel, JobId, NaiveTime, NotificationPayload, ScheduledJob, TriggerRule, Weekdays, ID,
    };
    use chrono::{Duration, TimeZone, Utc};

    fn job() -> ScheduledJob {
        let alarm_id = ID::new();
        ScheduledJob {
            id: JobId::for_alarm(Channel::Email, &alarm_id),
            rule: TriggerRule::new(
                Weekdays::from_days(vec![5]).unwrap(),
                NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                "Europe/Oslo",
            )
            .unwrap(),
            payload: NotificationPayload::Email {
                alarm_id,
                email: "alice@example.com".into(),
                subject: "Alarm notification".into(),
                message: "Brunch".into(),
            },
            next_fire_at: Utc.with_ymd_and_hms(2024, 1, 6, 9, 0, 0).unwrap(),
            version: 1,
        }
    }

    #[tokio::test]
    async fn test_scheduled_job_queries() {
        let ctx = AlarmContext::create_inmemory();
        let repo = &ctx.repos.scheduled_jobs;

        let mut job = job();
        repo.upsert(&job).await.unwrap();
        job.version = 2;
        repo.upsert(&job).await.unwrap();
        assert_eq!(repo.find_all().await.unwrap(), vec![job.clone()]);

        let next = job.next_fire_at + Duration::days(7);
        repo.set_next_fire_at(&job.id, next).await.unwrap();
        assert_eq!(repo.find_all().await.unwrap()[0].next_fire_at, next);

        assert!(repo.delete(&job.id).await.unwrap());
        assert!(!repo.delete(&job.id).await.unwrap());
        assert!(repo.find_all().await.unwrap().is_empty());
    }
}
