mod alarm;
mod job;
mod status;
mod user;

pub mod dtos {
    pub use crate::alarm::dtos::*;
    pub use crate::job::dtos::*;
    pub use crate::user::dtos::*;
}

pub use crate::alarm::api::*;
pub use crate::job::api::*;
pub use crate::status::api::*;
pub use crate::user::api::*;
