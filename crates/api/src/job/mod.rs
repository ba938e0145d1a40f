mod get_job;

use actix_web::web;
use get_job::get_job_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/job/{job_id}", web::get().to(get_job_controller));
}
