use super::IAlarmRepo;
use alarm_notifier_domain::{Alarm, NaiveTime, Tz, Weekdays, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::{error, warn};

pub struct PostgresAlarmRepo {
    pool: PgPool,
}

impl PostgresAlarmRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AlarmRaw {
    alarm_uid: Uuid,
    user_uid: Uuid,
    message: String,
    time: NaiveTime,
    weekdays: Vec<i32>,
    active: bool,
    send_sms: bool,
    send_email: bool,
    timezone: String,
    created: i64,
    updated: i64,
}

impl Into<Alarm> for AlarmRaw {
    fn into(self) -> Alarm {
        let weekdays = Weekdays::from_days(self.weekdays.iter().copied()).unwrap_or_else(|e| {
            warn!("Alarm {} has invalid weekdays: {}", self.alarm_uid, e);
            Weekdays::empty()
        });
        let timezone = self.timezone.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "Alarm {} has unknown timezone: {}, falling back to UTC",
                self.alarm_uid, self.timezone
            );
            Tz::UTC
        });
        Alarm {
            id: self.alarm_uid.into(),
            user_id: self.user_uid.into(),
            message: self.message,
            time: self.time,
            weekdays,
            active: self.active,
            send_sms: self.send_sms,
            send_email: self.send_email,
            timezone,
            created: self.created,
            updated: self.updated,
        }
    }
}

fn weekdays_column(weekdays: &Weekdays) -> Vec<i32> {
    weekdays.days().into_iter().map(i32::from).collect()
}

#[async_trait::async_trait]
impl IAlarmRepo for PostgresAlarmRepo {
    async fn insert(&self, alarm: &Alarm) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO alarms(alarm_uid, user_uid, message, time, weekdays, active, send_sms, send_email, timezone, created, updated)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(alarm.id.inner_ref())
        .bind(alarm.user_id.inner_ref())
        .bind(&alarm.message)
        .bind(alarm.time)
        .bind(weekdays_column(&alarm.weekdays))
        .bind(alarm.active)
        .bind(alarm.send_sms)
        .bind(alarm.send_email)
        .bind(alarm.timezone.name())
        .bind(alarm.created)
        .bind(alarm.updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save(&self, alarm: &Alarm) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE alarms
            SET message = $2,
            time = $3,
            weekdays = $4,
            active = $5,
            send_sms = $6,
            send_email = $7,
            timezone = $8,
            updated = $9
            WHERE alarm_uid = $1
            "#,
        )
        .bind(alarm.id.inner_ref())
        .bind(&alarm.message)
        .bind(alarm.time)
        .bind(weekdays_column(&alarm.weekdays))
        .bind(alarm.active)
        .bind(alarm.send_sms)
        .bind(alarm.send_email)
        .bind(alarm.timezone.name())
        .bind(alarm.updated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, alarm_id: &ID) -> Option<Alarm> {
        match sqlx::query_as::<_, AlarmRaw>(
            r#"
            DELETE FROM alarms AS a
            WHERE a.alarm_uid = $1
            RETURNING *
            "#,
        )
        .bind(alarm_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        {
            Ok(alarm) => alarm.map(|a| a.into()),
            Err(e) => {
                error!("Unable to delete alarm: {}. DB returned error: {:?}", alarm_id, e);
                None
            }
        }
    }

    async fn find(&self, alarm_id: &ID) -> Option<Alarm> {
        match sqlx::query_as::<_, AlarmRaw>(
            r#"
            SELECT * FROM alarms AS a
            WHERE a.alarm_uid = $1
            "#,
        )
        .bind(alarm_id.inner_ref())
        .fetch_one(&self.pool)
        .await
        {
            Ok(alarm) => Some(alarm.into()),
            Err(_) => None,
        }
    }

    async fn find_by_user(&self, user_id: &ID) -> Vec<Alarm> {
        let alarms: Vec<AlarmRaw> = sqlx::query_as(
            r#"
            SELECT * FROM alarms AS a
            WHERE a.user_uid = $1
            ORDER BY a.created
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default();

        alarms.into_iter().map(|a| a.into()).collect()
    }
}
