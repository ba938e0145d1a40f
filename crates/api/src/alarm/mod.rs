mod create_alarm;
mod delete_alarm;
mod get_alarm;
mod get_user_alarms;
mod update_alarm;
pub mod sync_alarm_jobs;

use actix_web::web;
use create_alarm::create_alarm_controller;
use delete_alarm::delete_alarm_controller;
use get_alarm::get_alarm_controller;
use get_user_alarms::get_user_alarms_controller;
use update_alarm::update_alarm_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/alarm", web::post().to(create_alarm_controller));
    cfg.route("/alarm/{alarm_id}", web::get().to(get_alarm_controller));
    cfg.route("/alarm/{alarm_id}", web::put().to(update_alarm_controller));
    cfg.route("/alarm/{alarm_id}", web::delete().to(delete_alarm_controller));
    cfg.route(
        "/user/{user_id}/alarms",
        web::get().to(get_user_alarms_controller),
    );
}
