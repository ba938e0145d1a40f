mod alarm;
mod alarm_job;
mod scheduled_job;
mod shared;
mod user;

pub use alarm::{IAlarmRepo, InMemoryAlarmRepo, PostgresAlarmRepo};
pub use alarm_job::{IAlarmJobRepo, InMemoryAlarmJobRepo, PostgresAlarmJobRepo};
pub use scheduled_job::{IScheduledJobRepo, InMemoryScheduledJobRepo, PostgresScheduledJobRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
pub use user::{IUserRepo, InMemoryUserRepo, PostgresUserRepo};

#[derive(Clone)]
pub struct Repos {
    pub users: Arc<dyn IUserRepo>,
    pub alarms: Arc<dyn IAlarmRepo>,
    pub alarm_jobs: Arc<dyn IAlarmJobRepo>,
    pub scheduled_jobs: Arc<dyn IScheduledJobRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");
        Ok(Self {
            users: Arc::new(PostgresUserRepo::new(pool.clone())),
            alarms: Arc::new(PostgresAlarmRepo::new(pool.clone())),
            alarm_jobs: Arc::new(PostgresAlarmJobRepo::new(pool.clone())),
            scheduled_jobs: Arc::new(PostgresScheduledJobRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepo::new()),
            alarms: Arc::new(InMemoryAlarmRepo::new()),
            alarm_jobs: Arc::new(InMemoryAlarmJobRepo::new()),
            scheduled_jobs: Arc::new(InMemoryScheduledJobRepo::new()),
        }
    }
}
