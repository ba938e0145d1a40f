use super::{JobError, JobRegistry};
use crate::services::{INotificationSender, Notifiers};
use crate::system::ISys;
use alarm_notifier_domain::ScheduledJob;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Upper bound on a single sleep of the timer loop
const MAX_WAIT: Duration = Duration::from_secs(60 * 60);

/// The single timer loop that fires registered jobs. Every firing hands the
/// dispatch to its own task, so a slow gateway never holds back other jobs
/// or the rescheduling of the fired one.
pub struct SchedulerRuntime {
    registry: Arc<JobRegistry>,
    notifiers: Notifiers,
    sys: Arc<dyn ISys>,
    dispatch_timeout: Duration,
    shutdown: Arc<AtomicBool>,
    shutdown_notify: Arc<Notify>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SchedulerRuntime {
    pub fn new(
        registry: Arc<JobRegistry>,
        notifiers: Notifiers,
        sys: Arc<dyn ISys>,
        dispatch_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            notifiers,
            sys,
            dispatch_timeout,
            shutdown: Arc::new(AtomicBool::new(false)),
            shutdown_notify: Arc::new(Notify::new()),
            handle: Mutex::new(None),
        }
    }

    /// Reloads the registry from its backing store and spawns the timer
    /// loop. Starting a running runtime does nothing.
    pub async fn start(&self) -> Result<(), JobError> {
        let mut handle = self.handle.lock().await;
        if handle.is_some() {
            return Ok(());
        }

        let loaded = self.registry.load().await?;
        info!("Loaded {} scheduled jobs", loaded);

        self.shutdown.store(false, Ordering::SeqCst);
        let timer_loop = TimerLoop {
            registry: self.registry.clone(),
            notifiers: self.notifiers.clone(),
            sys: self.sys.clone(),
            dispatch_timeout: self.dispatch_timeout,
            shutdown: self.shutdown.clone(),
            shutdown_notify: self.shutdown_notify.clone(),
        };
        *handle = Some(tokio::spawn(timer_loop.run()));

        Ok(())
    }

    /// Signals the timer loop to stop and waits for it. Dispatches that are
    /// already in flight are left to finish on their own.
    pub async fn stop(&self) {
        let handle = self.handle.lock().await.take();
        if let Some(handle) = handle {
            self.shutdown.store(true, Ordering::SeqCst);
            self.shutdown_notify.notify_one();
            if let Err(e) = handle.await {
                error!("Scheduler timer loop ended abnormally: {:?}", e);
            }
        }
    }

    pub async fn is_running(&self) -> bool {
        self.handle.lock().await.is_some()
    }

    /// Makes the timer loop look at the registry again, e.g. after the
    /// system clock jumped.
    pub fn wake(&self) {
        self.registry.notify_changed();
    }
}

struct TimerLoop {
    registry: Arc<JobRegistry>,
    notifiers: Notifiers,
    sys: Arc<dyn ISys>,
    dispatch_timeout: Duration,
    shutdown: Arc<AtomicBool>,
    shutdown_notify: Arc<Notify>,
}

impl TimerLoop {
    async fn run(self) {
        info!("Scheduler timer loop started");

        while !self.shutdown.load(Ordering::SeqCst) {
            for job in self.registry.take_due(self.sys.now()).await {
                let sender = self.notifiers.for_channel(job.payload.channel()).clone();
                let timeout = self.dispatch_timeout;
                tokio::spawn(async move {
                    if let Err(e) = dispatch(sender, &job, timeout).await {
                        error!("{}", e);
                    }
                });
            }

            let wait = match self.registry.next_fire_at().await {
                Some(next) => (next - self.sys.now())
                    .to_std()
                    .unwrap_or(Duration::ZERO)
                    .min(MAX_WAIT),
                None => MAX_WAIT,
            };

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = self.registry.changed() => {}
                _ = self.shutdown_notify.notified() => {}
            }
        }

        info!("Scheduler timer loop stopped");
    }
}

async fn dispatch(
    sender: Arc<dyn INotificationSender>,
    job: &ScheduledJob,
    timeout: Duration,
) -> Result<(), JobError> {
    match tokio::time::timeout(timeout, sender.send(&job.payload)).await {
        Ok(Ok(())) => {
            info!("Fired job {} due at {}", job.id, job.next_fire_at);
            Ok(())
        }
        Ok(Err(e)) => Err(JobError::DispatchFailed {
            job_id: job.id.clone(),
            reason: e.to_string(),
        }),
        Err(_) => Err(JobError::DispatchTimedOut(job.id.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::InMemoryScheduledJobRepo;
    use crate::services::InMemoryNotificationSender;
    use crate::system::ShiftedTimeSys;
    use alarm_notifier_domain::{
        Channel, JobId, NaiveTime, NotificationPayload, TriggerRule, Weekdays, ID,
    };
    use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};

    struct Setup {
        registry: Arc<JobRegistry>,
        runtime: SchedulerRuntime,
        sys: Arc<ShiftedTimeSys>,
        sender: Arc<InMemoryNotificationSender>,
    }

    fn setup(now: DateTime<Utc>, dispatch_timeout: Duration) -> Setup {
        let sys = Arc::new(ShiftedTimeSys::starting_at(now));
        let registry = Arc::new(JobRegistry::new(
            Arc::new(InMemoryScheduledJobRepo::new()),
            sys.clone(),
        ));
        let sender = Arc::new(InMemoryNotificationSender::new());
        let notifiers = Notifiers {
            sms: sender.clone(),
            email: sender.clone(),
        };
        let runtime =
            SchedulerRuntime::new(registry.clone(), notifiers, sys.clone(), dispatch_timeout);
        Setup {
            registry,
            runtime,
            sys,
            sender,
        }
    }

    fn wednesday_at_eight() -> (JobId, TriggerRule, NotificationPayload) {
        let alarm_id = ID::new();
        let rule = TriggerRule::new(
            Weekdays::from_days(vec![2]).unwrap(),
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            "Europe/Oslo",
        )
        .unwrap();
        let payload = NotificationPayload::Sms {
            alarm_id,
            phone_number: "+4712345678".into(),
            message: "Standup".into(),
        };
        (JobId::for_alarm(Channel::Sms, &alarm_id), rule, payload)
    }

    // Wednesday 2024-01-03 08:00 in Oslo
    fn occurrence() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 3, 7, 0, 0).unwrap()
    }

    async fn wait_for_sends(sender: &InMemoryNotificationSender, count: usize) {
        for _ in 0..100 {
            if sender.sent().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("Expected {} sends, got {}", count, sender.sent().len());
    }

    #[tokio::test]
    async fn fires_due_job_and_reschedules_it() {
        let s = setup(
            occurrence() - ChronoDuration::milliseconds(300),
            Duration::from_secs(1),
        );
        let (job_id, rule, payload) = wednesday_at_eight();
        s.registry
            .put(job_id.clone(), rule, payload.clone())
            .await
            .unwrap();

        s.runtime.start().await.unwrap();
        wait_for_sends(&s.sender, 1).await;
        s.runtime.stop().await;

        assert_eq!(s.sender.sent(), vec![payload]);
        assert_eq!(
            s.registry.get(&job_id).await.unwrap().next_fire_at,
            occurrence() + ChronoDuration::days(7)
        );
    }

    #[tokio::test]
    async fn wakes_up_for_job_put_while_sleeping() {
        let s = setup(
            occurrence() - ChronoDuration::milliseconds(300),
            Duration::from_secs(1),
        );
        s.runtime.start().await.unwrap();
        // Let the loop go to sleep on an empty registry
        tokio::time::sleep(Duration::from_millis(50)).await;

        let (job_id, rule, payload) = wednesday_at_eight();
        s.registry.put(job_id, rule, payload).await.unwrap();

        wait_for_sends(&s.sender, 1).await;
        s.runtime.stop().await;
    }

    #[tokio::test]
    async fn failed_dispatch_does_not_prevent_next_occurrence() {
        let s = setup(
            occurrence() - ChronoDuration::milliseconds(300),
            Duration::from_secs(1),
        );
        let (job_id, rule, payload) = wednesday_at_eight();
        s.registry.put(job_id.clone(), rule, payload).await.unwrap();
        s.sender.set_failing(true);

        s.runtime.start().await.unwrap();
        wait_for_sends(&s.sender, 1).await;

        let next = s.registry.get(&job_id).await.unwrap().next_fire_at;
        assert_eq!(next, occurrence() + ChronoDuration::days(7));

        s.sender.set_failing(false);
        s.sys.set(next - ChronoDuration::milliseconds(300));
        s.runtime.wake();
        wait_for_sends(&s.sender, 2).await;
        s.runtime.stop().await;

        assert_eq!(
            s.registry.get(&job_id).await.unwrap().next_fire_at,
            occurrence() + ChronoDuration::days(14)
        );
    }

    #[tokio::test]
    async fn stop_ends_the_timer_loop() {
        let s = setup(occurrence(), Duration::from_secs(1));
        s.runtime.start().await.unwrap();
        assert!(s.runtime.is_running().await);
        s.runtime.stop().await;
        assert!(!s.runtime.is_running().await);
    }

    struct HangingSender {}

    #[async_trait::async_trait]
    impl INotificationSender for HangingSender {
        async fn send(&self, _payload: &NotificationPayload) -> anyhow::Result<()> {
            tokio::time::sleep(Duration::from_secs(60 * 60)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn dispatch_is_bounded_by_timeout() {
        let (job_id, rule, payload) = wednesday_at_eight();
        let job = ScheduledJob {
            id: job_id.clone(),
            rule,
            payload,
            next_fire_at: occurrence(),
            version: 1,
        };
        let res = dispatch(Arc::new(HangingSender {}), &job, Duration::from_millis(20)).await;
        assert!(matches!(res, Err(JobError::DispatchTimedOut(id)) if id == job_id));
    }
}
