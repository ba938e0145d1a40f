use super::IScheduledJobRepo;
use alarm_notifier_domain::{JobId, ScheduledJob};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

pub struct InMemoryScheduledJobRepo {
    jobs: Mutex<HashMap<JobId, ScheduledJob>>,
}

impl InMemoryScheduledJobRepo {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl IScheduledJobRepo for InMemoryScheduledJobRepo {
    async fn upsert(&self, job: &ScheduledJob) -> anyhow::Result<()> {
        let mut jobs = self.jobs.lock().unwrap();
        jobs.insert(job.id.clone(), job.clone());
        Ok(())
    }

    async fn delete(&self, job_id: &JobId) -> anyhow::Result<bool> {
        let mut jobs = self.jobs.lock().unwrap();
        Ok(jobs.remove(job_id).is_some())
    }

    async fn find_all(&self) -> anyhow::Result<Vec<ScheduledJob>> {
        let jobs = self.jobs.lock().unwrap();
        let mut jobs = jobs.values().cloned().collect::<Vec<_>>();
        jobs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(jobs)
    }

    async fn set_next_fire_at(
        &self,
        job_id: &JobId,
        next_fire_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let mut jobs = self.jobs.lock().unwrap();
        match jobs.get_mut(job_id) {
            Some(job) => {
                job.next_fire_at = next_fire_at;
                Ok(())
            }
            None => anyhow::bail!("Job {} does not exist", job_id),
        }
    }
}
