use super::IAlarmJobRepo;
use crate::repos::shared::inmemory_repo::*;
use alarm_notifier_domain::{AlarmJob, ID};

pub struct InMemoryAlarmJobRepo {
    alarm_jobs: std::sync::Mutex<Vec<AlarmJob>>,
}

impl InMemoryAlarmJobRepo {
    pub fn new() -> Self {
        Self {
            alarm_jobs: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IAlarmJobRepo for InMemoryAlarmJobRepo {
    async fn insert(&self, alarm_job: &AlarmJob) -> anyhow::Result<()> {
        if find(&alarm_job.alarm_id, &self.alarm_jobs).is_some() {
            anyhow::bail!("Alarm {} already has an alarm job", alarm_job.alarm_id);
        }
        insert(alarm_job, &self.alarm_jobs);
        Ok(())
    }

    async fn save(&self, alarm_job: &AlarmJob) -> anyhow::Result<()> {
        if !save(alarm_job, &self.alarm_jobs) {
            anyhow::bail!("Alarm {} has no alarm job", alarm_job.alarm_id);
        }
        Ok(())
    }

    async fn find(&self, alarm_id: &ID) -> Option<AlarmJob> {
        find(alarm_id, &self.alarm_jobs)
    }

    async fn delete(&self, alarm_id: &ID) -> anyhow::Result<Option<AlarmJob>> {
        Ok(delete(alarm_id, &self.alarm_jobs))
    }
}
