use super::IScheduledJobRepo;
use alarm_notifier_domain::{JobId, NotificationPayload, ScheduledJob, TriggerRule};
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool};
use tracing::error;

pub struct PostgresScheduledJobRepo {
    pool: PgPool,
}

impl PostgresScheduledJobRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ScheduledJobRaw {
    job_id: String,
    rule: Json<TriggerRule>,
    payload: Json<NotificationPayload>,
    next_fire_at: DateTime<Utc>,
    version: i64,
}

impl Into<ScheduledJob> for ScheduledJobRaw {
    fn into(self) -> ScheduledJob {
        ScheduledJob {
            id: JobId::from(self.job_id),
            rule: self.rule.0,
            payload: self.payload.0,
            next_fire_at: self.next_fire_at,
            version: self.version,
        }
    }
}

#[async_trait::async_trait]
impl IScheduledJobRepo for PostgresScheduledJobRepo {
    async fn upsert(&self, job: &ScheduledJob) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO scheduled_jobs(job_id, rule, payload, next_fire_at, version)
            VALUES($1, $2, $3, $4, $5)
            ON CONFLICT(job_id) DO UPDATE SET
            rule = EXCLUDED.rule,
            payload = EXCLUDED.payload,
            next_fire_at = EXCLUDED.next_fire_at,
            version = EXCLUDED.version
            "#,
        )
        .bind(job.id.as_str())
        .bind(Json(&job.rule))
        .bind(Json(&job.payload))
        .bind(job.next_fire_at)
        .bind(job.version)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to upsert job: {}. DB returned error: {:?}", job.id, e);
            e
        })?;

        Ok(())
    }

    async fn delete(&self, job_id: &JobId) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            DELETE FROM scheduled_jobs
            WHERE job_id = $1
            "#,
        )
        .bind(job_id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() > 0)
    }

    async fn find_all(&self) -> anyhow::Result<Vec<ScheduledJob>> {
        let jobs: Vec<ScheduledJobRaw> = sqlx::query_as(
            r#"
            SELECT * FROM scheduled_jobs
            ORDER BY job_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(jobs.into_iter().map(|j| j.into()).collect())
    }

    async fn set_next_fire_at(
        &self,
        job_id: &JobId,
        next_fire_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE scheduled_jobs
            SET next_fire_at = $2
            WHERE job_id = $1
            "#,
        )
        .bind(job_id.as_str())
        .bind(next_fire_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
