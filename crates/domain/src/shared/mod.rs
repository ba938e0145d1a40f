pub mod entity;
pub mod weekdays;
