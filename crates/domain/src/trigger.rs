use crate::shared::weekdays::Weekdays;
use chrono::{prelude::*, Duration, LocalResult};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TriggerError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
    #[error("A trigger needs at least one weekday")]
    EmptyWeekdaySet,
}

/// Recurrence of the form "on these weekdays, at this wall-clock time, in this
/// timezone".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerRule {
    weekdays: Weekdays,
    time: NaiveTime,
    timezone: Tz,
}

impl TriggerRule {
    pub fn new(weekdays: Weekdays, time: NaiveTime, timezone: &str) -> Result<Self, TriggerError> {
        let timezone = timezone
            .parse::<Tz>()
            .map_err(|_| TriggerError::InvalidTimezone(timezone.to_string()))?;
        Self::with_tz(weekdays, time, timezone)
    }

    pub fn with_tz(weekdays: Weekdays, time: NaiveTime, timezone: Tz) -> Result<Self, TriggerError> {
        if weekdays.is_empty() {
            return Err(TriggerError::EmptyWeekdaySet);
        }
        Ok(Self {
            weekdays,
            time,
            timezone,
        })
    }

    pub fn weekdays(&self) -> Weekdays {
        self.weekdays
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// The first instant strictly after `now` whose local wall-clock time in
    /// the rule's timezone equals the rule's time on one of its weekdays.
    ///
    /// An instant equal to `now` never qualifies, so a job that just fired
    /// advances to its next day. Local times skipped by a DST gap fire
    /// shifted forward by the length of the gap, and local times repeated
    /// by a DST overlap fire once, at the earlier instant.
    ///
    /// Always `Some` for a rule built through `new` or `with_tz`, as every
    /// weekday recurs within the next eight local days.
    pub fn next_fire_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = now.with_timezone(&self.timezone).date_naive();

        (0..=7)
            .map(|offset| today + Duration::days(offset))
            .filter(|date| self.weekdays.contains(date.weekday()))
            .map(|date| self.resolve_local(date.and_time(self.time)))
            .find(|candidate| *candidate > now)
    }

    fn resolve_local(&self, local: NaiveDateTime) -> DateTime<Utc> {
        match self.timezone.from_local_datetime(&local) {
            LocalResult::Single(dt) => dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
            LocalResult::None => {
                // Interpret with the offset in effect before the gap
                let before_gap = self
                    .timezone
                    .offset_from_utc_datetime(&(local - Duration::days(1)))
                    .fix();
                let utc = local - Duration::seconds(before_gap.local_minus_utc() as i64);
                Utc.from_utc_datetime(&utc)
            }
        }
    }
}
