use super::JobError;
use crate::repos::IScheduledJobRepo;
use crate::system::ISys;
use alarm_notifier_domain::{JobId, NotificationPayload, ScheduledJob, TriggerRule};
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tracing::{error, info, warn};

#[derive(Default)]
struct RegistryState {
    jobs: HashMap<JobId, ScheduledJob>,
    /// Time ordered view of `jobs`
    queue: BTreeSet<(DateTime<Utc>, JobId)>,
}

impl RegistryState {
    fn earliest(&self) -> Option<DateTime<Utc>> {
        self.queue.iter().next().map(|(at, _)| *at)
    }

    fn insert(&mut self, job: ScheduledJob) {
        if let Some(prev) = self.jobs.get(&job.id) {
            self.queue.remove(&(prev.next_fire_at, prev.id.clone()));
        }
        self.queue.insert((job.next_fire_at, job.id.clone()));
        self.jobs.insert(job.id.clone(), job);
    }

    fn remove(&mut self, job_id: &JobId) -> Option<ScheduledJob> {
        let job = self.jobs.remove(job_id)?;
        self.queue.remove(&(job.next_fire_at, job.id.clone()));
        Some(job)
    }
}

/// The table of live jobs. Every mutation is written to the backing store
/// before it becomes visible, and mutations are applied one at a time, so
/// concurrent callers always observe whole entries.
pub struct JobRegistry {
    repo: Arc<dyn IScheduledJobRepo>,
    sys: Arc<dyn ISys>,
    state: Mutex<RegistryState>,
    changed: Notify,
}

impl JobRegistry {
    pub fn new(repo: Arc<dyn IScheduledJobRepo>, sys: Arc<dyn ISys>) -> Self {
        Self {
            repo,
            sys,
            state: Mutex::new(RegistryState::default()),
            changed: Notify::new(),
        }
    }

    /// Inserts the job, or replaces the entry with the same id. A replaced
    /// entry keeps its id and gets the next version.
    pub async fn put(
        &self,
        job_id: JobId,
        rule: TriggerRule,
        payload: NotificationPayload,
    ) -> Result<ScheduledJob, JobError> {
        let next_fire_at = rule
            .next_fire_after(self.sys.now())
            .ok_or_else(|| JobError::InvalidTrigger(job_id.clone()))?;

        let mut state = self.state.lock().await;
        let version = state.jobs.get(&job_id).map(|j| j.version + 1).unwrap_or(1);
        let job = ScheduledJob {
            id: job_id,
            rule,
            payload,
            next_fire_at,
            version,
        };
        self.repo.upsert(&job).await.map_err(JobError::Storage)?;

        let earliest = state.earliest();
        state.insert(job.clone());
        if state.earliest() != earliest {
            self.changed.notify_one();
        }
        info!(
            "Scheduled job {} (version {}) to fire at {}",
            job.id, job.version, job.next_fire_at
        );

        Ok(job)
    }

    /// Removes the job. Removing a job that is not scheduled is not an error,
    /// it only logs a warning and returns `false`.
    pub async fn remove(&self, job_id: &JobId) -> Result<bool, JobError> {
        let mut state = self.state.lock().await;
        if !state.jobs.contains_key(job_id) {
            warn!("Tried to remove job {} which is not scheduled", job_id);
            return Ok(false);
        }
        self.repo.delete(job_id).await.map_err(JobError::Storage)?;

        let earliest = state.earliest();
        state.remove(job_id);
        if state.earliest() != earliest {
            self.changed.notify_one();
        }
        info!("Removed job {}", job_id);

        Ok(true)
    }

    pub async fn exists(&self, job_id: &JobId) -> bool {
        self.state.lock().await.jobs.contains_key(job_id)
    }

    pub async fn get(&self, job_id: &JobId) -> Option<ScheduledJob> {
        self.state.lock().await.jobs.get(job_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.jobs.len()
    }

    /// The earliest pending fire time of all jobs
    pub async fn next_fire_at(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.earliest()
    }

    /// Replaces the in-memory view with the contents of the backing store.
    /// Occurrences that passed while the process was down are skipped.
    pub async fn load(&self) -> Result<usize, JobError> {
        let jobs = self.repo.find_all().await.map_err(JobError::Storage)?;
        let now = self.sys.now();

        let mut state = self.state.lock().await;
        *state = RegistryState::default();
        for mut job in jobs {
            if job.next_fire_at <= now {
                let next_fire_at = match job.rule.next_fire_after(now) {
                    Some(next) => next,
                    None => {
                        error!("Stored job {} has no upcoming occurrence", job.id);
                        continue;
                    }
                };
                info!(
                    "Job {} missed its occurrence at {}, next is at {}",
                    job.id, job.next_fire_at, next_fire_at
                );
                job.next_fire_at = next_fire_at;
                if let Err(e) = self.repo.set_next_fire_at(&job.id, next_fire_at).await {
                    warn!("Unable to store next fire time of job {}: {:?}", job.id, e);
                }
            }
            state.insert(job);
        }
        self.changed.notify_one();

        Ok(state.jobs.len())
    }

    /// Takes every job due at `now` and advances it to its next occurrence.
    /// The returned snapshots carry the instant they were due at.
    pub async fn take_due(&self, now: DateTime<Utc>) -> Vec<ScheduledJob> {
        let mut state = self.state.lock().await;
        let mut due = Vec::new();

        while let Some((at, job_id)) = state.queue.iter().next().cloned() {
            if at > now {
                break;
            }
            let job = match state.remove(&job_id) {
                Some(job) => job,
                None => continue,
            };

            // Late firings skip the occurrences that were missed meanwhile
            let after = if job.next_fire_at > now {
                job.next_fire_at
            } else {
                now
            };
            match job.rule.next_fire_after(after) {
                Some(next_fire_at) => {
                    let mut advanced = job.clone();
                    advanced.next_fire_at = next_fire_at;
                    if let Err(e) = self.repo.set_next_fire_at(&job.id, next_fire_at).await {
                        warn!("Unable to store next fire time of job {}: {:?}", job.id, e);
                    }
                    state.insert(advanced);
                }
                None => error!("Job {} has no upcoming occurrence, dropping it", job.id),
            }
            due.push(job);
        }

        due
    }

    /// Resolves when a mutation changed the earliest pending fire time
    pub async fn changed(&self) {
        self.changed.notified().await
    }

    /// Wakes whoever waits on `changed`
    pub fn notify_changed(&self) {
        self.changed.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::InMemoryScheduledJobRepo;
    use crate::system::StaticTimeSys;
    use alarm_notifier_domain::{Channel, NaiveTime, Weekdays, ID};
    use chrono::{Duration, TimeZone};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn registry_at(
        now: DateTime<Utc>,
        repo: Arc<InMemoryScheduledJobRepo>,
    ) -> JobRegistry {
        JobRegistry::new(repo, Arc::new(StaticTimeSys(now.timestamp_millis())))
    }

    fn sms_job(days: Vec<i64>, hour: u32) -> (JobId, TriggerRule, NotificationPayload) {
        let alarm_id = ID::new();
        let rule = TriggerRule::new(
            Weekdays::from_days(days).unwrap(),
            NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            "UTC",
        )
        .unwrap();
        let payload = NotificationPayload::Sms {
            alarm_id,
            phone_number: "+4712345678".into(),
            message: "Ping".into(),
        };
        (JobId::for_alarm(Channel::Sms, &alarm_id), rule, payload)
    }

    #[tokio::test]
    async fn put_twice_keeps_a_single_entry() {
        let repo = Arc::new(InMemoryScheduledJobRepo::new());
        // Monday
        let registry = registry_at(utc(2024, 1, 1, 12, 0), repo.clone());
        let (job_id, rule, payload) = sms_job(vec![2], 8);

        let first = registry
            .put(job_id.clone(), rule.clone(), payload.clone())
            .await
            .unwrap();
        let second = registry.put(job_id.clone(), rule, payload).await.unwrap();

        assert_eq!(first.version, 1);
        assert_eq!(second.version, 2);
        assert_eq!(second.next_fire_at, utc(2024, 1, 3, 8, 0));
        assert_eq!(registry.len().await, 1);
        assert!(registry.exists(&job_id).await);
        assert_eq!(repo.find_all().await.unwrap(), vec![second]);
    }

    #[tokio::test]
    async fn removing_an_absent_job_is_not_an_error() {
        let repo = Arc::new(InMemoryScheduledJobRepo::new());
        let registry = registry_at(utc(2024, 1, 1, 12, 0), repo.clone());
        let (job_id, rule, payload) = sms_job(vec![2], 8);

        assert!(!registry.remove(&job_id).await.unwrap());

        registry.put(job_id.clone(), rule, payload).await.unwrap();
        assert!(registry.remove(&job_id).await.unwrap());
        assert!(!registry.exists(&job_id).await);
        assert!(repo.find_all().await.unwrap().is_empty());
        assert_eq!(registry.next_fire_at().await, None);
    }

    #[tokio::test]
    async fn tracks_the_earliest_fire_time() {
        let repo = Arc::new(InMemoryScheduledJobRepo::new());
        let registry = registry_at(utc(2024, 1, 1, 12, 0), repo);
        let (late_id, late_rule, late_payload) = sms_job(vec![4], 8);
        let (early_id, early_rule, early_payload) = sms_job(vec![1], 8);

        registry.put(late_id, late_rule, late_payload).await.unwrap();
        assert_eq!(registry.next_fire_at().await, Some(utc(2024, 1, 5, 8, 0)));

        registry
            .put(early_id.clone(), early_rule, early_payload)
            .await
            .unwrap();
        assert_eq!(registry.next_fire_at().await, Some(utc(2024, 1, 2, 8, 0)));

        registry.remove(&early_id).await.unwrap();
        assert_eq!(registry.next_fire_at().await, Some(utc(2024, 1, 5, 8, 0)));
    }

    #[tokio::test]
    async fn take_due_advances_fired_jobs() {
        let repo = Arc::new(InMemoryScheduledJobRepo::new());
        let registry = registry_at(utc(2024, 1, 1, 12, 0), repo.clone());
        let (job_id, rule, payload) = sms_job(vec![1, 3], 8);
        let (other_id, other_rule, other_payload) = sms_job(vec![5], 8);
        registry.put(job_id.clone(), rule, payload).await.unwrap();
        registry
            .put(other_id.clone(), other_rule, other_payload)
            .await
            .unwrap();

        assert!(registry.take_due(utc(2024, 1, 2, 7, 59)).await.is_empty());

        let due = registry.take_due(utc(2024, 1, 2, 8, 0)).await;
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, job_id);
        assert_eq!(due[0].next_fire_at, utc(2024, 1, 2, 8, 0));

        let advanced = registry.get(&job_id).await.unwrap();
        assert_eq!(advanced.next_fire_at, utc(2024, 1, 4, 8, 0));
        assert_eq!(advanced.version, 1);
        let stored = repo
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .find(|j| j.id == job_id)
            .unwrap();
        assert_eq!(stored.next_fire_at, utc(2024, 1, 4, 8, 0));

        // Firing does not remove the entry
        assert!(registry.exists(&job_id).await);
        assert!(registry.exists(&other_id).await);
    }

    #[tokio::test]
    async fn late_take_due_fires_once_and_skips_missed_occurrences() {
        let repo = Arc::new(InMemoryScheduledJobRepo::new());
        let registry = registry_at(utc(2024, 1, 1, 12, 0), repo);
        let (job_id, rule, payload) = sms_job(vec![0, 1, 2, 3, 4, 5, 6], 8);
        registry.put(job_id.clone(), rule, payload).await.unwrap();

        let due = registry.take_due(utc(2024, 1, 5, 9, 0)).await;
        assert_eq!(due.len(), 1);
        assert_eq!(
            registry.get(&job_id).await.unwrap().next_fire_at,
            utc(2024, 1, 6, 8, 0)
        );
    }

    #[tokio::test]
    async fn load_restores_jobs_and_recomputes_past_fire_times() {
        let repo = Arc::new(InMemoryScheduledJobRepo::new());
        let before = registry_at(utc(2024, 1, 1, 12, 0), repo.clone());
        let (job_id, rule, payload) = sms_job(vec![1], 8);
        let job = before.put(job_id.clone(), rule, payload).await.unwrap();
        assert_eq!(job.next_fire_at, utc(2024, 1, 2, 8, 0));

        // Process was down over the occurrence
        let after = registry_at(utc(2024, 1, 3, 12, 0), repo.clone());
        assert_eq!(after.load().await.unwrap(), 1);

        let restored = after.get(&job_id).await.unwrap();
        assert_eq!(restored.next_fire_at, utc(2024, 1, 9, 8, 0));
        assert_eq!(restored.payload, job.payload);
        assert_eq!(restored.next_fire_at - job.next_fire_at, Duration::days(7));
        assert_eq!(
            repo.find_all().await.unwrap()[0].next_fire_at,
            utc(2024, 1, 9, 8, 0)
        );
    }
}
