use super::IAlarmRepo;
use crate::repos::shared::inmemory_repo::*;
use alarm_notifier_domain::{Alarm, ID};

pub struct InMemoryAlarmRepo {
    alarms: std::sync::Mutex<Vec<Alarm>>,
}

impl InMemoryAlarmRepo {
    pub fn new() -> Self {
        Self {
            alarms: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IAlarmRepo for InMemoryAlarmRepo {
    async fn insert(&self, alarm: &Alarm) -> anyhow::Result<()> {
        insert(alarm, &self.alarms);
        Ok(())
    }

    async fn save(&self, alarm: &Alarm) -> anyhow::Result<()> {
        if !save(alarm, &self.alarms) {
            anyhow::bail!("Alarm {} does not exist", alarm.id);
        }
        Ok(())
    }

    async fn delete(&self, alarm_id: &ID) -> Option<Alarm> {
        delete(alarm_id, &self.alarms)
    }

    async fn find(&self, alarm_id: &ID) -> Option<Alarm> {
        find(alarm_id, &self.alarms)
    }

    async fn find_by_user(&self, user_id: &ID) -> Vec<Alarm> {
        find_by(&self.alarms, |a| a.user_id == *user_id)
    }
}
