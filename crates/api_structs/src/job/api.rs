use serde::Deserialize;

pub mod get_job {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub job_id: String,
    }

    pub type APIResponse = crate::dtos::JobStatusDTO;
}
