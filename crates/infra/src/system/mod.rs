use chrono::{DateTime, TimeZone, Utc};

// Mocking out time so that it is possible to run tests that depend on time.
pub trait ISys: Send + Sync {
    /// The current timestamp in millis
    fn get_timestamp_millis(&self) -> i64;

    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.get_timestamp_millis())
            .single()
            .unwrap_or_else(Utc::now)
    }
}

/// System that gets the real time and is used when not testing
pub struct RealSys {}
impl ISys for RealSys {
    fn get_timestamp_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// System frozen at a given timestamp
pub struct StaticTimeSys(pub i64);
impl ISys for StaticTimeSys {
    fn get_timestamp_millis(&self) -> i64 {
        self.0
    }
}

/// Real time moved by an adjustable offset. Lets tests bring an upcoming
/// occurrence within reach while time keeps running.
pub struct ShiftedTimeSys {
    offset_millis: std::sync::atomic::AtomicI64,
}

impl ShiftedTimeSys {
    /// A clock where the current real time reads as `now`
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        let sys = Self {
            offset_millis: std::sync::atomic::AtomicI64::new(0),
        };
        sys.set(now);
        sys
    }

    pub fn set(&self, now: DateTime<Utc>) {
        let offset = now.timestamp_millis() - Utc::now().timestamp_millis();
        self.offset_millis
            .store(offset, std::sync::atomic::Ordering::SeqCst);
    }
}

impl ISys for ShiftedTimeSys {
    fn get_timestamp_millis(&self) -> i64 {
        Utc::now().timestamp_millis() + self.offset_millis.load(std::sync::atomic::Ordering::SeqCst)
    }
}
