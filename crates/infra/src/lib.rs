mod config;
mod repos;
mod scheduler;
mod services;
mod system;

pub use config::Config;
pub use repos::*;
pub use scheduler::{AlarmLocks, JobError, JobRegistry, SchedulerRuntime};
pub use services::*;
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
pub use system::{ISys, RealSys, ShiftedTimeSys, StaticTimeSys};
use tracing::{info, warn};

#[derive(Clone)]
pub struct AlarmContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub notifiers: Notifiers,
    pub registry: Arc<JobRegistry>,
    pub runtime: Arc<SchedulerRuntime>,
    pub alarm_locks: Arc<AlarmLocks>,
}

impl AlarmContext {
    /// Wires the job registry and the scheduler runtime on top of the given
    /// collaborators. The registry and the runtime read time from `sys`.
    pub fn new(repos: Repos, config: Config, sys: Arc<dyn ISys>, notifiers: Notifiers) -> Self {
        let registry = Arc::new(JobRegistry::new(
            repos.scheduled_jobs.clone(),
            sys.clone(),
        ));
        let runtime = Arc::new(SchedulerRuntime::new(
            registry.clone(),
            notifiers.clone(),
            sys.clone(),
            Duration::from_millis(config.notification_timeout_millis),
        ));
        Self {
            repos,
            config,
            sys,
            notifiers,
            registry,
            runtime,
            alarm_locks: Arc::new(AlarmLocks::new()),
        }
    }

    pub fn create_inmemory() -> Self {
        let config = Config::new();
        let notifiers = Notifiers::from_config(&config);
        Self::new(
            Repos::create_inmemory(),
            config,
            Arc::new(RealSys {}),
            notifiers,
        )
    }

    async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        let repos = Repos::create_postgres(connection_string).await?;
        let config = Config::new();
        let notifiers = Notifiers::from_config(&config);
        Ok(Self::new(repos, config, Arc::new(RealSys {}), notifiers))
    }
}

/// Will setup the infrastructure context given the environment.
/// Uses Postgres when `DATABASE_URL` is set and in-memory storage otherwise.
pub async fn setup_context() -> anyhow::Result<AlarmContext> {
    match get_psql_connection_string() {
        Some(connection_string) => AlarmContext::create_postgres(&connection_string).await,
        None => {
            warn!("DATABASE_URL is not set, state will not survive a restart.");
            Ok(AlarmContext::create_inmemory())
        }
    }
}

fn get_psql_connection_string() -> Option<String> {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING).ok()
}

/// Runs the embedded migrations. Does nothing without `DATABASE_URL`.
pub async fn run_migration() -> Result<(), MigrateError> {
    let connection_string = match get_psql_connection_string() {
        Some(connection_string) => connection_string,
        None => return Ok(()),
    };
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&connection_string)
        .await?;

    info!("Running migrations");
    sqlx::migrate!().run(&pool).await
}
