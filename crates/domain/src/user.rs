use crate::shared::entity::{Entity, ID};
use chrono_tz::{Tz, UTC};

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: ID,
    pub username: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    /// Timezone given to `Alarm`s created without an explicit one
    pub timezone: Tz,
}

/// Where notifications for a `User` are delivered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactInfo {
    pub phone_number: Option<String>,
    pub email: Option<String>,
}

impl User {
    pub fn new(username: String) -> Self {
        Self {
            id: Default::default(),
            username,
            email: None,
            phone_number: None,
            timezone: UTC,
        }
    }

    pub fn contact_info(&self) -> ContactInfo {
        ContactInfo {
            phone_number: self.phone_number.clone(),
            email: self.email.clone(),
        }
    }

    pub fn set_timezone(&mut self, timezone: &str) -> bool {
        match timezone.parse::<Tz>() {
            Ok(tz) => {
                self.timezone = tz;
                true
            }
            Err(_) => false,
        }
    }
}

impl Entity for User {
    fn id(&self) -> &ID {
        &self.id
    }
}
