use chrono::Weekday;
use serde::{de::Visitor, Deserialize, Serialize};
use thiserror::Error;

/// A set of days of the week, where `0` is Monday and `6` is Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Weekdays(u8);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidWeekdaysError {
    #[error("Days of week must contain at least one element")]
    Empty,
    #[error("Invalid day of the week: {0}, expected a value in 0..=6")]
    OutOfRange(i64),
}

impl Weekdays {
    pub fn empty() -> Self {
        Self(0)
    }

    /// Builds a set from day numbers. Duplicates are ignored, but the set
    /// must not end up empty and every day must be in `0..=6`.
    pub fn from_days<I, T>(days: I) -> Result<Self, InvalidWeekdaysError>
    where
        I: IntoIterator<Item = T>,
        T: Into<i64>,
    {
        let mut mask = 0u8;
        for day in days {
            let day = day.into();
            if !(0..=6).contains(&day) {
                return Err(InvalidWeekdaysError::OutOfRange(day));
            }
            mask |= 1 << day;
        }
        if mask == 0 {
            return Err(InvalidWeekdaysError::Empty);
        }
        Ok(Self(mask))
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, weekday: Weekday) -> bool {
        self.0 & (1 << weekday.num_days_from_monday()) != 0
    }

    pub fn insert(&mut self, weekday: Weekday) {
        self.0 |= 1 << weekday.num_days_from_monday();
    }

    /// The day numbers in ascending order
    pub fn days(&self) -> Vec<u8> {
        (0..7).filter(|d| self.0 & (1 << d) != 0).collect()
    }
}

impl Serialize for Weekdays {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.days().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Weekdays {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct WeekdaysVisitor;

        impl<'de> Visitor<'de> for WeekdaysVisitor {
            type Value = Weekdays;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("A non empty list of weekdays in the range 0..=6")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Weekdays, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut days: Vec<i64> = Vec::new();
                while let Some(day) = seq.next_element::<i64>()? {
                    days.push(day);
                }
                Weekdays::from_days(days).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_seq(WeekdaysVisitor)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builds_weekdays_from_day_numbers() {
        let days = Weekdays::from_days(vec![0, 2, 2]).unwrap();
        assert!(days.contains(Weekday::Mon));
        assert!(days.contains(Weekday::Wed));
        assert!(!days.contains(Weekday::Tue));
        assert_eq!(days.days(), vec![0, 2]);
    }

    #[test]
    fn rejects_invalid_day_numbers() {
        assert_eq!(
            Weekdays::from_days(Vec::<i64>::new()),
            Err(InvalidWeekdaysError::Empty)
        );
        assert_eq!(
            Weekdays::from_days(vec![1, 7]),
            Err(InvalidWeekdaysError::OutOfRange(7))
        );
        assert_eq!(
            Weekdays::from_days(vec![-1]),
            Err(InvalidWeekdaysError::OutOfRange(-1))
        );
    }

    #[test]
    fn deserializes_weekdays() {
        let days: Weekdays = serde_json::from_str("[6, 0]").unwrap();
        assert_eq!(days.days(), vec![0, 6]);
        assert!(serde_json::from_str::<Weekdays>("[]").is_err());
        assert!(serde_json::from_str::<Weekdays>("[8]").is_err());
    }
}
