use alarm_notifier_domain::{
    Alarm, AlarmJob, Channel, ContactInfo, JobId, ScheduledJob, TriggerError, User, ID,
};
use alarm_notifier_infra::{AlarmContext, JobError};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Alarm with id: {0} was not found")]
    AlarmNotFound(ID),
    #[error("Invalid trigger: {0}")]
    InvalidTrigger(#[from] TriggerError),
    #[error("Scheduling failed: {0}")]
    SchedulingFailed(#[from] JobError),
    #[error("Persistence failed: {0}")]
    PersistenceFailed(#[source] anyhow::Error),
    #[error("Inconsistent state: {0}")]
    InconsistentState(String),
}

/// Outcome of resyncing the alarms of a user after a contact change
#[derive(Debug, Default)]
pub struct ContactResync {
    pub synced: usize,
    pub failed: Vec<(ID, SyncError)>,
}

/// Keeps the `Alarm` and `AlarmJob` rows and the job registry consistent.
///
/// Every composite operation holds the lock of the alarm it works on, and
/// undoes the steps it already made when a later one fails, so that a
/// persisted job id always refers to a live registry entry and an alarm is
/// either fully scheduled or not stored at all.
pub struct AlarmJobSynchronizer<'a> {
    ctx: &'a AlarmContext,
}

impl<'a> AlarmJobSynchronizer<'a> {
    pub fn new(ctx: &'a AlarmContext) -> Self {
        Self { ctx }
    }

    pub async fn is_scheduled(&self, job_id: &JobId) -> bool {
        self.ctx.registry.exists(job_id).await
    }

    /// Puts a job for every channel the alarm should be notified over and
    /// returns the resulting ids. Jobs created by this call are removed
    /// again if a later put fails.
    pub async fn schedule_for_alarm(
        &self,
        alarm: &Alarm,
        contact: &ContactInfo,
    ) -> Result<AlarmJob, SyncError> {
        let mut alarm_job = AlarmJob::empty(alarm.id);
        let channels = alarm.channels_to_schedule();
        if channels.is_empty() {
            return Ok(alarm_job);
        }
        let rule = alarm.trigger_rule()?;

        let mut created = Vec::new();
        for channel in channels {
            let payload = match alarm.notification_payload(channel, contact) {
                Some(payload) => payload,
                None => {
                    warn!(
                        "Alarm {} has {} enabled, but its owner has no address for it",
                        alarm.id, channel
                    );
                    continue;
                }
            };
            let job_id = alarm.job_id(channel);
            let existed = self.ctx.registry.exists(&job_id).await;
            if let Err(e) = self
                .ctx
                .registry
                .put(job_id.clone(), rule.clone(), payload)
                .await
            {
                self.remove_quietly(&created).await;
                return Err(SyncError::SchedulingFailed(e));
            }
            if !existed {
                created.push(job_id.clone());
            }
            alarm_job.set_job_id(channel, Some(job_id));
        }

        Ok(alarm_job)
    }

    /// Removes every job of the alarm from the registry and returns the
    /// removed entries. Both the ids recorded in the `AlarmJob` row and the
    /// ids derived from the alarm id are looked at, so jobs the row lost
    /// track of are cleaned up too.
    pub async fn unschedule_for_alarm(
        &self,
        alarm_id: &ID,
    ) -> Result<Vec<ScheduledJob>, SyncError> {
        let recorded = self
            .ctx
            .repos
            .alarm_jobs
            .find(alarm_id)
            .await
            .map(|alarm_job| alarm_job.job_ids().into_iter().cloned().collect::<Vec<_>>())
            .unwrap_or_default();

        let mut job_ids = recorded.clone();
        for channel in Channel::ALL {
            let job_id = JobId::for_alarm(channel, alarm_id);
            if !job_ids.contains(&job_id) {
                job_ids.push(job_id);
            }
        }

        let mut removed = Vec::new();
        for job_id in job_ids {
            let is_recorded = recorded.contains(&job_id);
            let job = match self.ctx.registry.get(&job_id).await {
                Some(job) => job,
                None => {
                    if is_recorded {
                        warn!(
                            "{}",
                            SyncError::InconsistentState(format!(
                                "Job {} of alarm {} is recorded, but not scheduled",
                                job_id, alarm_id
                            ))
                        );
                    }
                    continue;
                }
            };
            if !is_recorded {
                warn!(
                    "{}",
                    SyncError::InconsistentState(format!(
                        "Job {} of alarm {} is scheduled, but not recorded",
                        job_id, alarm_id
                    ))
                );
            }

            match self.ctx.registry.remove(&job_id).await {
                Ok(true) => removed.push(job),
                Ok(false) => {}
                Err(e) => {
                    self.restore(removed).await;
                    return Err(SyncError::SchedulingFailed(e));
                }
            }
        }

        Ok(removed)
    }

    /// Stores a new alarm together with its jobs
    pub async fn on_create(
        &self,
        alarm: &Alarm,
        contact: &ContactInfo,
    ) -> Result<AlarmJob, SyncError> {
        let _guard = self.ctx.alarm_locks.lock(&alarm.id).await;

        self.ctx
            .repos
            .alarms
            .insert(alarm)
            .await
            .map_err(SyncError::PersistenceFailed)?;

        let alarm_job = match self.schedule_for_alarm(alarm, contact).await {
            Ok(alarm_job) => alarm_job,
            Err(e) => {
                self.delete_alarm_row(&alarm.id).await;
                return Err(e);
            }
        };

        if let Err(e) = self.ctx.repos.alarm_jobs.insert(&alarm_job).await {
            let job_ids = alarm_job.job_ids().into_iter().cloned().collect::<Vec<_>>();
            self.remove_quietly(&job_ids).await;
            self.delete_alarm_row(&alarm.id).await;
            return Err(SyncError::PersistenceFailed(e));
        }

        info!(
            "Created alarm {} with sms job: {:?} and email job: {:?}",
            alarm.id, alarm_job.sms_job_id, alarm_job.email_job_id
        );
        Ok(alarm_job)
    }

    /// Activates or deactivates the alarm. Does nothing when the alarm is
    /// already in the requested state.
    pub async fn on_update(
        &self,
        alarm_id: &ID,
        active: bool,
    ) -> Result<(Alarm, AlarmJob), SyncError> {
        let _guard = self.ctx.alarm_locks.lock(alarm_id).await;

        let mut alarm = self
            .ctx
            .repos
            .alarms
            .find(alarm_id)
            .await
            .ok_or(SyncError::AlarmNotFound(*alarm_id))?;
        let previous_job = self.ctx.repos.alarm_jobs.find(alarm_id).await;
        if previous_job.is_none() {
            warn!(
                "{}",
                SyncError::InconsistentState(format!("Alarm {} has no alarm job", alarm_id))
            );
        }

        if alarm.active == active {
            let alarm_job = previous_job.unwrap_or_else(|| AlarmJob::empty(*alarm_id));
            return Ok((alarm, alarm_job));
        }

        alarm.active = active;
        alarm.updated = self.ctx.sys.get_timestamp_millis();

        let (alarm_job, created, removed) = if active {
            let owner = self
                .ctx
                .repos
                .users
                .find(&alarm.user_id)
                .await
                .ok_or_else(|| {
                    SyncError::PersistenceFailed(anyhow::anyhow!(
                        "Owner {} of alarm {} was not found",
                        alarm.user_id,
                        alarm.id
                    ))
                })?;
            let alarm_job = self
                .schedule_for_alarm(&alarm, &owner.contact_info())
                .await?;
            let created = alarm_job.job_ids().into_iter().cloned().collect::<Vec<_>>();
            (alarm_job, created, Vec::new())
        } else {
            let removed = self.unschedule_for_alarm(alarm_id).await?;
            (AlarmJob::empty(*alarm_id), Vec::new(), removed)
        };

        let persisted = match &previous_job {
            Some(_) => self.ctx.repos.alarm_jobs.save(&alarm_job).await,
            None => self.ctx.repos.alarm_jobs.insert(&alarm_job).await,
        };
        if let Err(e) = persisted {
            self.remove_quietly(&created).await;
            self.restore(removed).await;
            return Err(SyncError::PersistenceFailed(e));
        }

        if let Err(e) = self.ctx.repos.alarms.save(&alarm).await {
            self.remove_quietly(&created).await;
            self.restore(removed).await;
            let reverted = match &previous_job {
                Some(previous_job) => self.ctx.repos.alarm_jobs.save(previous_job).await,
                None => self.ctx.repos.alarm_jobs.delete(alarm_id).await.map(|_| ()),
            };
            if let Err(e) = reverted {
                error!("Unable to revert alarm job of alarm {}: {:?}", alarm_id, e);
            }
            return Err(SyncError::PersistenceFailed(e));
        }

        info!("Alarm {} is now {}", alarm_id, if active { "active" } else { "inactive" });
        Ok((alarm, alarm_job))
    }

    /// Unschedules the jobs of the alarm, then deletes its rows
    pub async fn on_delete(&self, alarm_id: &ID) -> Result<Alarm, SyncError> {
        let _guard = self.ctx.alarm_locks.lock(alarm_id).await;

        if self.ctx.repos.alarms.find(alarm_id).await.is_none() {
            return Err(SyncError::AlarmNotFound(*alarm_id));
        }

        let removed = self.unschedule_for_alarm(alarm_id).await?;

        let previous_job = match self.ctx.repos.alarm_jobs.delete(alarm_id).await {
            Ok(previous_job) => previous_job,
            Err(e) => {
                self.restore(removed).await;
                return Err(SyncError::PersistenceFailed(e));
            }
        };

        match self.ctx.repos.alarms.delete(alarm_id).await {
            Some(alarm) => {
                info!("Deleted alarm {}", alarm_id);
                Ok(alarm)
            }
            None => {
                self.restore(removed).await;
                if let Some(previous_job) = previous_job {
                    if let Err(e) = self.ctx.repos.alarm_jobs.insert(&previous_job).await {
                        error!("Unable to revert alarm job of alarm {}: {:?}", alarm_id, e);
                    }
                }
                Err(SyncError::PersistenceFailed(anyhow::anyhow!(
                    "Unable to delete alarm {}",
                    alarm_id
                )))
            }
        }
    }

    /// Replaces the jobs of every active alarm of the user so that they
    /// carry the user's current contact info. An alarm that fails to sync
    /// keeps its previous jobs and does not stop the remaining alarms.
    pub async fn on_contact_changed(&self, user: &User) -> ContactResync {
        let contact = user.contact_info();
        let mut resync = ContactResync::default();

        for alarm in self.ctx.repos.alarms.find_by_user(&user.id).await {
            let _guard = self.ctx.alarm_locks.lock(&alarm.id).await;

            // Might have changed while waiting for the lock
            let alarm = match self.ctx.repos.alarms.find(&alarm.id).await {
                Some(alarm) if alarm.active => alarm,
                _ => continue,
            };

            match self.resync_alarm(&alarm, &contact).await {
                Ok(()) => resync.synced += 1,
                Err(e) => {
                    error!("Unable to resync jobs of alarm {}: {:?}", alarm.id, e);
                    resync.failed.push((alarm.id, e));
                }
            }
        }

        resync
    }

    /// Re-puts the jobs of a single alarm with `contact`. Any failure puts
    /// the registry back to the entries it held before.
    async fn resync_alarm(&self, alarm: &Alarm, contact: &ContactInfo) -> Result<(), SyncError> {
        let previous_job = self.ctx.repos.alarm_jobs.find(&alarm.id).await;
        let mut snapshot = Vec::new();
        for channel in Channel::ALL {
            if let Some(job) = self.ctx.registry.get(&alarm.job_id(channel)).await {
                snapshot.push(job);
            }
        }

        let res = self.replace_jobs(alarm, contact, previous_job.as_ref()).await;
        if res.is_err() {
            let created = Channel::ALL
                .iter()
                .map(|channel| alarm.job_id(*channel))
                .filter(|job_id| !snapshot.iter().any(|job| job.id == *job_id))
                .collect::<Vec<_>>();
            self.remove_quietly(&created).await;
            self.restore(snapshot).await;
        }
        res
    }

    async fn replace_jobs(
        &self,
        alarm: &Alarm,
        contact: &ContactInfo,
        previous_job: Option<&AlarmJob>,
    ) -> Result<(), SyncError> {
        let alarm_job = self.schedule_for_alarm(alarm, contact).await?;
        if let Some(previous_job) = previous_job {
            let current = alarm_job.job_ids();
            for stale in previous_job
                .job_ids()
                .into_iter()
                .filter(|job_id| !current.contains(job_id))
            {
                self.ctx.registry.remove(stale).await?;
            }
        }

        let persisted = match previous_job {
            Some(previous_job) if *previous_job == alarm_job => Ok(()),
            Some(_) => self.ctx.repos.alarm_jobs.save(&alarm_job).await,
            None => self.ctx.repos.alarm_jobs.insert(&alarm_job).await,
        };
        persisted.map_err(SyncError::PersistenceFailed)
    }

    async fn remove_quietly(&self, job_ids: &[JobId]) {
        for job_id in job_ids {
            if let Err(e) = self.ctx.registry.remove(job_id).await {
                error!("Unable to roll back job {}: {:?}", job_id, e);
            }
        }
    }

    async fn restore(&self, jobs: Vec<ScheduledJob>) {
        for job in jobs {
            let job_id = job.id.clone();
            if let Err(e) = self.ctx.registry.put(job.id, job.rule, job.payload).await {
                error!("Unable to restore job {}: {:?}", job_id, e);
            }
        }
    }

    async fn delete_alarm_row(&self, alarm_id: &ID) {
        if self.ctx.repos.alarms.delete(alarm_id).await.is_none() {
            error!("Unable to roll back creation of alarm {}", alarm_id);
        }
    }
}
