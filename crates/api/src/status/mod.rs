use actix_web::{web, HttpResponse};
use alarm_notifier_api_structs::get_service_health::*;
use alarm_notifier_infra::AlarmContext;

async fn status(ctx: web::Data<AlarmContext>) -> HttpResponse {
    let message = if ctx.runtime.is_running().await {
        "Alarm notifier is up and the scheduler is running"
    } else {
        "Alarm notifier is up but the scheduler is stopped"
    };
    HttpResponse::Ok().json(APIResponse {
        message: message.into(),
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(status));
}
