mod inmemory;
mod postgres;

pub use inmemory::InMemoryAlarmRepo;
use alarm_notifier_domain::{Alarm, ID};
pub use postgres::PostgresAlarmRepo;

#[async_trait::async_trait]
pub trait IAlarmRepo: Send + Sync {
    async fn insert(&self, alarm: &Alarm) -> anyhow::Result<()>;
    async fn save(&self, alarm: &Alarm) -> anyhow::Result<()>;
    async fn delete(&self, alarm_id: &ID) -> Option<Alarm>;
    async fn find(&self, alarm_id: &ID) -> Option<Alarm>;
    async fn find_by_user(&self, user_id: &ID) -> Vec<Alarm>;
}
