use alarm_notifier_domain::ID;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

/// Serializes composite operations on the same alarm. Operations on
/// different alarms never wait for each other.
#[derive(Default)]
pub struct AlarmLocks {
    locks: Mutex<HashMap<ID, Arc<tokio::sync::Mutex<()>>>>,
}

impl AlarmLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other holder of the lock for `alarm_id` is left. The
    /// lock is released when the guard is dropped.
    pub async fn lock(&self, alarm_id: &ID) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap();
            // Entries only referenced by the map are not held by anyone
            locks.retain(|id, lock| id == alarm_id || Arc::strong_count(lock) > 1);
            locks
                .entry(*alarm_id)
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    pub fn len(&self) -> usize {
        self.locks.lock().unwrap().len()
    }
}
