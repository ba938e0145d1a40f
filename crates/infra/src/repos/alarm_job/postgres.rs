use super::IAlarmJobRepo;
use alarm_notifier_domain::{AlarmJob, JobId, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresAlarmJobRepo {
    pool: PgPool,
}

impl PostgresAlarmJobRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AlarmJobRaw {
    alarm_uid: Uuid,
    sms_job_id: Option<String>,
    email_job_id: Option<String>,
}

impl Into<AlarmJob> for AlarmJobRaw {
    fn into(self) -> AlarmJob {
        AlarmJob {
            alarm_id: self.alarm_uid.into(),
            sms_job_id: self.sms_job_id.map(JobId::from),
            email_job_id: self.email_job_id.map(JobId::from),
        }
    }
}

#[async_trait::async_trait]
impl IAlarmJobRepo for PostgresAlarmJobRepo {
    async fn insert(&self, alarm_job: &AlarmJob) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO alarm_jobs(alarm_uid, sms_job_id, email_job_id)
            VALUES($1, $2, $3)
            "#,
        )
        .bind(alarm_job.alarm_id.inner_ref())
        .bind(alarm_job.sms_job_id.as_ref().map(|id| id.as_str()))
        .bind(alarm_job.email_job_id.as_ref().map(|id| id.as_str()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save(&self, alarm_job: &AlarmJob) -> anyhow::Result<()> {
        let res = sqlx::query(
            r#"
            UPDATE alarm_jobs
            SET sms_job_id = $2,
            email_job_id = $3
            WHERE alarm_uid = $1
            "#,
        )
        .bind(alarm_job.alarm_id.inner_ref())
        .bind(alarm_job.sms_job_id.as_ref().map(|id| id.as_str()))
        .bind(alarm_job.email_job_id.as_ref().map(|id| id.as_str()))
        .execute(&self.pool)
        .await?;

        if res.rows_affected() == 0 {
            anyhow::bail!("Alarm {} has no alarm job", alarm_job.alarm_id);
        }
        Ok(())
    }

    async fn find(&self, alarm_id: &ID) -> Option<AlarmJob> {
        match sqlx::query_as::<_, AlarmJobRaw>(
            r#"
            SELECT * FROM alarm_jobs AS aj
            WHERE aj.alarm_uid = $1
            "#,
        )
        .bind(alarm_id.inner_ref())
        .fetch_one(&self.pool)
        .await
        {
            Ok(alarm_job) => Some(alarm_job.into()),
            Err(_) => None,
        }
    }

    async fn delete(&self, alarm_id: &ID) -> anyhow::Result<Option<AlarmJob>> {
        let alarm_job = sqlx::query_as::<_, AlarmJobRaw>(
            r#"
            DELETE FROM alarm_jobs AS aj
            WHERE aj.alarm_uid = $1
            RETURNING *
            "#,
        )
        .bind(alarm_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(alarm_job.map(|aj| aj.into()))
    }
}
